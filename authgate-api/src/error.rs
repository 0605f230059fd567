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

//! Application error type that implements Axum's `IntoResponse`.
//!
//! Every error is returned as `APIResponse<APIError>` with `success: false`,
//! paired with the appropriate HTTP status code.

use authgate_types::{APIError, APIResponse};
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::gateway::GatewayError;

/// Application-level error that pairs an HTTP status code with an [`APIError`].
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub body: APIError,
}

impl AppError {
    pub fn new(status: StatusCode, body: APIError) -> Self {
        Self { status, body }
    }

    pub fn missing_authorization() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, APIError::missing_authorization())
    }

    pub fn invalid_token(detail: &str) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, APIError::invalid_token(detail))
    }

    pub fn domain_mismatch(required_domain: &str) -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            APIError::domain_mismatch(required_domain),
        )
    }

    pub fn auth_unavailable(detail: &str) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            APIError::auth_unavailable(detail),
        )
    }

    pub fn not_found(path: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, APIError::not_found(path))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status;
        let mut resp = (status, Json(APIResponse::error(self.body))).into_response();
        if status == StatusCode::UNAUTHORIZED {
            resp.headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        resp
    }
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::MissingAuthorization => Self::missing_authorization(),
            GatewayError::InvalidToken(detail) => Self::invalid_token(&detail),
            GatewayError::DomainMismatch {
                required_domain, ..
            } => Self::domain_mismatch(&required_domain),
            GatewayError::Unavailable(detail) => {
                tracing::error!("Verification keys unavailable: {detail}");
                Self::auth_unavailable(&detail)
            }
        }
    }
}
