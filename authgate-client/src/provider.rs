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

//! The identity provider's client SDK, as seen by the session manager.
//!
//! Only four capabilities are required: interactive sign-in, auth state
//! subscription, sign-out, and token retrieval on the signed-in identity.
//! Initialising the SDK is the host application's job.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::SessionConfig;

/// Provider error codes the session manager reacts to.
pub mod codes {
    /// The user closed the sign-in popup before completing it.
    pub const POPUP_CLOSED_BY_USER: &str = "auth/popup-closed-by-user";
    /// The email is already bound to an account that uses another provider.
    pub const ACCOUNT_EXISTS_WITH_DIFFERENT_CREDENTIAL: &str =
        "auth/account-exists-with-different-credential";
}

/// Error reported by the identity provider SDK.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{code}: {}", .message.as_deref().unwrap_or("no message"))]
pub struct ProviderError {
    pub code: String,
    pub message: Option<String>,
}

impl ProviderError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: Some(message.into()),
        }
    }

    pub fn without_message(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: None,
        }
    }
}

/// The signed-in principal as exposed by the provider SDK.
#[async_trait(?Send)]
pub trait IdentityHandle: fmt::Debug {
    /// Provider-assigned user id.
    fn uid(&self) -> &str;

    fn email(&self) -> Option<&str>;

    /// Current signed ID token. The SDK may transparently refresh an expired
    /// token here, so this can suspend on a network round-trip.
    async fn id_token(&self) -> Result<String, ProviderError>;
}

/// Shared handle to the signed-in principal.
pub type Identity = Rc<dyn IdentityHandle>;

/// Callback fired by the provider whenever the auth state changes,
/// including once on startup.
pub type AuthStateListener = Rc<dyn Fn(Option<Identity>)>;

/// Handle returned by [`IdentityProvider::on_auth_state_changed`].
///
/// Dropping it (or calling [`Unsubscribe::unsubscribe`]) detaches the listener.
pub struct Unsubscribe(Option<Box<dyn FnOnce()>>);

impl Unsubscribe {
    pub fn new(f: impl FnOnce() + 'static) -> Self {
        Self(Some(Box::new(f)))
    }

    pub fn unsubscribe(mut self) {
        if let Some(f) = self.0.take() {
            f();
        }
    }
}

impl Drop for Unsubscribe {
    fn drop(&mut self) {
        if let Some(f) = self.0.take() {
            f();
        }
    }
}

impl fmt::Debug for Unsubscribe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Unsubscribe")
            .field(&self.0.is_some())
            .finish()
    }
}

/// Parameters for an interactive sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInRequest {
    pub scopes: Vec<String>,
    pub custom_parameters: HashMap<String, String>,
}

impl SignInRequest {
    /// Parameter carrying the domain restriction to the provider.
    pub const DOMAIN_HINT_PARAM: &'static str = "hd";

    /// Build the request for `config`: configured custom parameters, then the
    /// fixed `display=popup`, then the domain hint when a domain is required.
    pub fn from_config(config: &SessionConfig) -> Self {
        let mut custom_parameters = config.custom_parameters.clone();
        custom_parameters.insert("display".to_string(), "popup".to_string());
        if let Some(domain) = &config.required_domain {
            custom_parameters.insert(Self::DOMAIN_HINT_PARAM.to_string(), domain.clone());
        }

        Self {
            scopes: config.scopes.clone(),
            custom_parameters,
        }
    }
}

/// Client-side identity provider SDK.
#[async_trait(?Send)]
pub trait IdentityProvider {
    /// Subscribe to auth state changes. The listener fires asynchronously,
    /// at least once after subscription with the current state.
    fn on_auth_state_changed(&self, listener: AuthStateListener) -> Unsubscribe;

    /// Run the interactive popup credential exchange. On success the new
    /// identity is delivered through the auth state listener, not here.
    async fn sign_in_with_popup(&self, request: &SignInRequest) -> Result<(), ProviderError>;

    async fn sign_out(&self) -> Result<(), ProviderError>;

    /// Route SDK traffic to a local auth emulator.
    fn connect_emulator(&self, _target: &str) {}
}
