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

//! Shared application state passed to every Axum handler via `State`.

use std::sync::Arc;

use crate::config::Config;
use crate::gateway::{DomainPolicy, JwksCache, JwksVerifier, TokenGateway, TokenVerifier};

/// Application state shared across all request handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Verifies requests to the protected route group.
    pub gateway: Arc<TokenGateway>,
}

impl AppState {
    pub fn new(gateway: TokenGateway) -> Self {
        Self {
            gateway: Arc::new(gateway),
        }
    }

    /// Gateway backed by the provider's JWKS endpoint.
    pub fn from_config(config: &Config) -> Self {
        let jwks = JwksCache::new(config.jwks_url.clone());
        let verifier: Arc<dyn TokenVerifier> = Arc::new(JwksVerifier::new(
            jwks,
            config.audience.clone(),
            config.issuer.clone(),
        ));
        let policy = DomainPolicy::from_config(config.required_domain.as_deref());
        Self::new(TokenGateway::new(verifier, policy))
    }
}
