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

//! The identity a request was verified as.

use axum::{extract::FromRequestParts, http::request::Parts};
use serde_json::Value;

use super::{Claims, GatewayError};
use crate::error::AppError;

/// A principal whose token passed verification. Only the gateway builds
/// these; handlers on protected routes extract it from the request.
///
/// ```ignore
/// async fn my_handler(principal: VerifiedPrincipal) { ... }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedPrincipal {
    subject_id: String,
    email: Option<String>,
    claims: Claims,
}

impl VerifiedPrincipal {
    /// Requires a non-empty `sub` claim. `email` is optional.
    pub(crate) fn from_claims(claims: Claims) -> Result<Self, GatewayError> {
        let subject_id = match claims.get("sub") {
            Some(Value::String(sub)) if !sub.is_empty() => sub.clone(),
            _ => {
                return Err(GatewayError::InvalidToken(
                    "token has no subject".to_string(),
                ))
            }
        };
        let email = claims
            .get("email")
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(Self {
            subject_id,
            email,
            claims,
        })
    }

    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    pub fn into_claims(self) -> Claims {
        self.claims
    }
}

impl<S: Send + Sync> FromRequestParts<S> for VerifiedPrincipal {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Present only behind the gateway's pre-handler.
        parts
            .extensions
            .get::<VerifiedPrincipal>()
            .cloned()
            .ok_or_else(AppError::missing_authorization)
    }
}
