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

//! Error types for the session manager and the authenticated request helper.

use thiserror::Error;

use crate::provider::{codes, ProviderError};

/// Shown when the email is already linked to an account using another provider.
pub const CREDENTIAL_CONFLICT_MESSAGE: &str = "An account already exists with the same email \
     address but different sign-in credentials. Sign in using a provider associated with this \
     email address.";

/// Shown when the provider fails without a message of its own.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

/// Classified outcome of a failed sign-in or sign-out.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignInError {
    /// The user dismissed the interactive prompt. Not reported to the user.
    #[error("sign-in cancelled by the user")]
    UserCancelled,

    #[error("{}", CREDENTIAL_CONFLICT_MESSAGE)]
    CredentialConflict,

    #[error("{0}")]
    ProviderFailure(String),
}

impl SignInError {
    pub fn classify(err: &ProviderError) -> Self {
        match err.code.as_str() {
            codes::POPUP_CLOSED_BY_USER => Self::UserCancelled,
            codes::ACCOUNT_EXISTS_WITH_DIFFERENT_CREDENTIAL => Self::CredentialConflict,
            _ => Self::provider_failure(err),
        }
    }

    /// Any provider error, classified as a plain failure (sign-out has no
    /// special codes).
    pub fn provider_failure(err: &ProviderError) -> Self {
        Self::ProviderFailure(
            err.message
                .clone()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string()),
        )
    }

    /// The message to store in the session's `last_error`, if any.
    pub fn user_message(&self) -> Option<String> {
        match self {
            Self::UserCancelled => None,
            other => Some(other.to_string()),
        }
    }
}

/// Misuse of the session API.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Session data was read without a live [`SessionManager`](crate::SessionManager).
    #[error("session accessed outside of an active SessionManager scope")]
    ContextMisuse,
}

/// Errors returned by [`AuthenticatedClient`](crate::AuthenticatedClient).
#[derive(Debug, Error)]
pub enum FetchError {
    /// The identity handle could not produce a token. Never retried.
    #[error("failed to obtain identity token: {0}")]
    Token(#[from] ProviderError),

    /// The token contains bytes that cannot be sent in a header.
    #[error("identity token is not a valid header value")]
    InvalidToken,

    /// The server rejected the credentials (HTTP 401).
    #[error("Not authenticated. Please sign in.")]
    NotAuthenticated,

    /// The server denied access (HTTP 403).
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// Any other non-success status.
    #[error("Server error ({status}): {body}")]
    ServerError { status: u16, body: String },

    /// A network or transport error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}
