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

//! Bearer-token gateway: extracts the token, verifies it with the identity
//! provider's keys, and applies the email-domain policy.

pub mod jwks;
pub mod principal;
pub mod verify;

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{header, HeaderMap};
use serde_json::{Map, Value};
use thiserror::Error;

pub use jwks::JwksCache;
pub use principal::VerifiedPrincipal;
pub use verify::JwksVerifier;

/// Claims of a verified token, keyed by claim name.
pub type Claims = Map<String, Value>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("missing or malformed Authorization header")]
    MissingAuthorization,

    #[error("token verification failed: {0}")]
    InvalidToken(String),

    #[error("email {email:?} is outside the required domain @{required_domain}")]
    DomainMismatch {
        email: Option<String>,
        required_domain: String,
    },

    /// The provider's signing keys could not be fetched.
    #[error("verification keys unavailable: {0}")]
    Unavailable(String),
}

/// Server-side token verification (signature, expiry, issuer, audience).
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify_token(&self, token: &str) -> Result<Claims, GatewayError>;
}

/// Restricts accepted principals to one email domain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainPolicy {
    required_domain: Option<String>,
}

impl DomainPolicy {
    pub fn unrestricted() -> Self {
        Self::default()
    }

    /// Accept only emails ending with `@domain`. A leading `@` is ignored.
    pub fn require(domain: impl AsRef<str>) -> Self {
        let domain = domain.as_ref().trim().trim_start_matches('@');
        Self {
            required_domain: Some(domain.to_string()),
        }
    }

    /// `None`, or a domain that is blank once `@` is stripped, is unrestricted.
    pub fn from_config(required_domain: Option<&str>) -> Self {
        match required_domain.map(|d| d.trim().trim_start_matches('@')) {
            Some(domain) if !domain.is_empty() => Self::require(domain),
            _ => Self::unrestricted(),
        }
    }

    pub fn required_domain(&self) -> Option<&str> {
        self.required_domain.as_deref()
    }

    /// Case-insensitive suffix match on the whole email, `@` included.
    pub fn permits(&self, email: Option<&str>) -> bool {
        let Some(domain) = &self.required_domain else {
            return true;
        };
        let suffix = format!("@{}", domain.to_lowercase());
        email.is_some_and(|email| email.to_lowercase().ends_with(&suffix))
    }
}

/// Fail with [`GatewayError::DomainMismatch`] when `policy` rejects the principal.
pub fn enforce_domain_policy(
    principal: &VerifiedPrincipal,
    policy: &DomainPolicy,
) -> Result<(), GatewayError> {
    match policy.required_domain() {
        Some(domain) if !policy.permits(principal.email()) => Err(GatewayError::DomainMismatch {
            email: principal.email().map(str::to_string),
            required_domain: domain.to_string(),
        }),
        _ => Ok(()),
    }
}

/// The raw token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, GatewayError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(GatewayError::MissingAuthorization)?
        .to_str()
        .map_err(|_| GatewayError::MissingAuthorization)?;

    let token = value
        .strip_prefix("Bearer ")
        .ok_or(GatewayError::MissingAuthorization)?;

    if token.is_empty() || token.contains(char::is_whitespace) {
        return Err(GatewayError::MissingAuthorization);
    }

    Ok(token)
}

/// Verifies requests for the protected route group. Built once per process
/// and shared read-only across requests.
#[derive(Clone)]
pub struct TokenGateway {
    verifier: Arc<dyn TokenVerifier>,
    policy: DomainPolicy,
}

impl TokenGateway {
    pub fn new(verifier: Arc<dyn TokenVerifier>, policy: DomainPolicy) -> Self {
        Self { verifier, policy }
    }

    pub fn policy(&self) -> &DomainPolicy {
        &self.policy
    }

    /// Extract the bearer token and verify it, without the domain policy.
    pub async fn extract_token(&self, headers: &HeaderMap) -> Result<VerifiedPrincipal, GatewayError> {
        let token = bearer_token(headers)?;
        let claims = self.verifier.verify_token(token).await?;
        VerifiedPrincipal::from_claims(claims)
    }

    /// [`Self::extract_token`] followed by [`enforce_domain_policy`].
    pub async fn verify(&self, headers: &HeaderMap) -> Result<VerifiedPrincipal, GatewayError> {
        let principal = self.extract_token(headers).await?;
        enforce_domain_policy(&principal, &self.policy)?;
        Ok(principal)
    }
}

impl std::fmt::Debug for TokenGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenGateway")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
