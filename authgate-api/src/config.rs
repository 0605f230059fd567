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

//! Application configuration loaded from environment variables.

use std::env;

/// Google secure-token signing keys, used for Firebase-issued ID tokens.
pub const DEFAULT_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

/// Configuration for the token gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Address to bind the HTTP server (e.g. "0.0.0.0:8080").
    pub listen_addr: String,
    /// Expected `aud` claim: the project / client id tokens are issued for.
    pub audience: String,
    /// Expected `iss` claim.
    pub issuer: String,
    /// Where the provider publishes its public signing keys.
    pub jwks_url: String,
    /// Only emails under this domain are accepted. `None` accepts everyone.
    pub required_domain: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Required
    /// - `AUTH_AUDIENCE`
    ///
    /// # Optional
    /// - `LISTEN_ADDR` (default: `"0.0.0.0:8080"`)
    /// - `AUTH_ISSUER` (default: `"https://securetoken.google.com/<AUTH_AUDIENCE>"`)
    /// - `AUTH_JWKS_URL` (default: [`DEFAULT_JWKS_URL`])
    /// - `AUTH_REQUIRED_DOMAIN`
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`Config::from_env`], reading values through `lookup`.
    /// Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let audience =
            var("AUTH_AUDIENCE").ok_or("AUTH_AUDIENCE environment variable is required")?;
        let issuer = var("AUTH_ISSUER")
            .unwrap_or_else(|| format!("https://securetoken.google.com/{audience}"));

        Ok(Self {
            listen_addr: var("LISTEN_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_string()),
            issuer,
            audience,
            jwks_url: var("AUTH_JWKS_URL").unwrap_or_else(|| DEFAULT_JWKS_URL.to_string()),
            required_domain: var("AUTH_REQUIRED_DOMAIN"),
        })
    }
}
