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

//! API error types.
//!
//! Every failed API response is returned as `APIResponse<APIError>` with `success: false`.

use serde::{Deserialize, Serialize};

/// Structured error returned in the `result` field of a failed [`super::APIResponse`].
///
/// The `code` field is a machine-readable identifier (e.g. `"DOMAIN_MISMATCH"`).
/// The `message` field is a human-readable description suitable for display.
/// The `engineering_error` field carries debug-level detail that is useful
/// during development but should be stripped or redacted in production.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct APIError {
    /// Machine-readable error code (e.g. `"MISSING_AUTHORIZATION"`).
    pub code: String,

    /// Human-readable error message.
    pub message: String,

    /// Optional engineering-level detail for debugging.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engineering_error: Option<String>,
}

impl APIError {
    pub const MISSING_AUTHORIZATION: &'static str = "MISSING_AUTHORIZATION";
    pub const INVALID_TOKEN: &'static str = "INVALID_TOKEN";
    pub const DOMAIN_MISMATCH: &'static str = "DOMAIN_MISMATCH";
    pub const AUTH_UNAVAILABLE: &'static str = "AUTH_UNAVAILABLE";
    pub const NOT_FOUND: &'static str = "NOT_FOUND";
    pub const INTERNAL_ERROR: &'static str = "INTERNAL_ERROR";

    pub fn missing_authorization() -> Self {
        Self {
            code: Self::MISSING_AUTHORIZATION.to_string(),
            message: "Missing or malformed Authorization header. Expected 'Bearer <token>'."
                .to_string(),
            engineering_error: None,
        }
    }

    pub fn invalid_token(detail: &str) -> Self {
        Self {
            code: Self::INVALID_TOKEN.to_string(),
            message: "Authentication token could not be verified.".to_string(),
            engineering_error: Some(detail.to_string()),
        }
    }

    pub fn domain_mismatch(required_domain: &str) -> Self {
        Self {
            code: Self::DOMAIN_MISMATCH.to_string(),
            message: format!("Only accounts under '@{required_domain}' may access this resource"),
            engineering_error: None,
        }
    }

    pub fn auth_unavailable(detail: &str) -> Self {
        Self {
            code: Self::AUTH_UNAVAILABLE.to_string(),
            message: "Authentication service temporarily unavailable".to_string(),
            engineering_error: Some(detail.to_string()),
        }
    }

    pub fn not_found(path: &str) -> Self {
        Self {
            code: Self::NOT_FOUND.to_string(),
            message: format!("No route for '{path}'"),
            engineering_error: None,
        }
    }

    pub fn internal_error(detail: &str) -> Self {
        Self {
            code: Self::INTERNAL_ERROR.to_string(),
            message: "Internal server error".to_string(),
            engineering_error: Some(detail.to_string()),
        }
    }
}

impl std::fmt::Display for APIError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for APIError {}
