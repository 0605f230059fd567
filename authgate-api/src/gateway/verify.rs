/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 */

//! JWT signature and standard-claim verification against a JWKS.

use std::sync::Arc;

use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, Validation};

use super::jwks::JwksCache;
use super::{Claims, GatewayError, TokenVerifier};

/// Verifies provider-issued ID tokens: signature (via JWKS), `exp`,
/// `aud` == `audience`, `iss` == `issuer`.
pub struct JwksVerifier {
    jwks: Arc<JwksCache>,
    audience: String,
    issuer: String,
}

impl JwksVerifier {
    pub fn new(jwks: Arc<JwksCache>, audience: impl Into<String>, issuer: impl Into<String>) -> Self {
        Self {
            jwks,
            audience: audience.into(),
            issuer: issuer.into(),
        }
    }
}

#[async_trait]
impl TokenVerifier for JwksVerifier {
    async fn verify_token(&self, token: &str) -> Result<Claims, GatewayError> {
        let header = decode_header(token)
            .map_err(|e| GatewayError::InvalidToken(format!("Invalid JWT header: {e}")))?;

        let kid = header
            .kid
            .as_deref()
            .ok_or_else(|| GatewayError::InvalidToken("JWT header missing kid".to_string()))?;

        let (alg, key) = self.jwks.get_key(kid).await?;
        if header.alg != alg {
            return Err(GatewayError::InvalidToken(format!(
                "JWT alg {:?} does not match key {kid}",
                header.alg
            )));
        }

        let mut validation = Validation::new(alg);
        validation.set_audience(&[&self.audience]);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "sub", "aud", "iss"]);

        decode::<Claims>(token, &key, &validation)
            .map(|data| data.claims)
            .map_err(|e| GatewayError::InvalidToken(format!("JWT validation failed: {e}")))
    }
}
