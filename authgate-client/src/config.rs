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

//! Session configuration, passed explicitly to [`SessionManager::new`](crate::SessionManager::new).

use std::collections::HashMap;
use std::env;

/// Read-only Google profile email scope requested when none is configured.
pub const DEFAULT_SCOPE: &str = "https://www.googleapis.com/auth/userinfo.email";

/// Configuration for the frontend session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// OAuth scopes requested during interactive sign-in, in order.
    pub scopes: Vec<String>,
    /// Extra provider parameters. `display=popup` is always added on top.
    pub custom_parameters: HashMap<String, String>,
    /// When set, only accounts under this email domain are expected; the
    /// provider receives it as a domain hint.
    pub required_domain: Option<String>,
    /// Auth emulator URL (e.g. `"http://localhost:9099"`). Applied at most
    /// once per process.
    pub emulator_host: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            scopes: vec![DEFAULT_SCOPE.to_string()],
            custom_parameters: HashMap::new(),
            required_domain: None,
            emulator_host: None,
        }
    }
}

impl SessionConfig {
    /// Load configuration from environment variables.
    ///
    /// # Optional
    /// - `AUTH_SCOPES`: comma separated scope list (default: [`DEFAULT_SCOPE`])
    /// - `AUTH_CUSTOM_PARAMETERS`: JSON object of string values
    /// - `AUTH_REQUIRED_DOMAIN`
    /// - `AUTH_EMULATOR_HOST`
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`SessionConfig::from_env`], reading values through `lookup`.
    /// Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let scopes = var("AUTH_SCOPES")
            .map(|raw| parse_scopes(&raw))
            .filter(|scopes| !scopes.is_empty())
            .unwrap_or_else(|| vec![DEFAULT_SCOPE.to_string()]);

        let custom_parameters = match var("AUTH_CUSTOM_PARAMETERS") {
            Some(raw) => serde_json::from_str::<HashMap<String, String>>(&raw).map_err(|e| {
                format!("AUTH_CUSTOM_PARAMETERS must be a JSON object of strings: {e}")
            })?,
            None => HashMap::new(),
        };

        Ok(Self {
            scopes,
            custom_parameters,
            required_domain: var("AUTH_REQUIRED_DOMAIN"),
            emulator_host: var("AUTH_EMULATOR_HOST"),
        })
    }

    pub fn with_required_domain(mut self, domain: impl Into<String>) -> Self {
        self.required_domain = Some(domain.into());
        self
    }
}

fn parse_scopes(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
