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

//! In-memory identity provider used by the session tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use async_trait::async_trait;
use authgate_client::{
    AuthStateListener, Identity, IdentityHandle, IdentityProvider, ProviderError, SignInRequest,
    Unsubscribe,
};
use tokio::sync::Notify;

#[derive(Debug)]
pub struct FakeUser {
    uid: String,
    email: Option<String>,
}

impl FakeUser {
    pub fn with_email(email: &str) -> Identity {
        Rc::new(Self {
            uid: format!("uid-{email}"),
            email: Some(email.to_string()),
        })
    }
}

#[async_trait(?Send)]
impl IdentityHandle for FakeUser {
    fn uid(&self) -> &str {
        &self.uid
    }

    fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    async fn id_token(&self) -> Result<String, ProviderError> {
        Ok(format!("token-for-{}", self.uid))
    }
}

/// Scriptable provider. A successful sign-in fires the auth state listener
/// with the scripted identity before resolving, as real SDKs do.
#[derive(Default)]
pub struct FakeProvider {
    listener: RefCell<Option<AuthStateListener>>,
    pub unsubscribed: Rc<Cell<bool>>,
    sign_in_outcome: RefCell<Option<Result<Identity, ProviderError>>>,
    sign_out_outcome: RefCell<Option<ProviderError>>,
    sign_in_gate: RefCell<Option<Rc<Notify>>>,
    pub requests: RefCell<Vec<SignInRequest>>,
    pub emulator_targets: RefCell<Vec<String>>,
}

impl FakeProvider {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Fire the auth state callback, as the SDK does on startup and changes.
    pub fn emit(&self, identity: Option<Identity>) {
        let listener = self.listener.borrow().clone();
        if let Some(listener) = listener {
            listener(identity);
        }
    }

    pub fn sign_in_succeeds_as(&self, identity: Identity) {
        *self.sign_in_outcome.borrow_mut() = Some(Ok(identity));
    }

    pub fn sign_in_fails_with(&self, err: ProviderError) {
        *self.sign_in_outcome.borrow_mut() = Some(Err(err));
    }

    pub fn sign_out_fails_with(&self, err: ProviderError) {
        *self.sign_out_outcome.borrow_mut() = Some(err);
    }

    /// Make `sign_in_with_popup` wait until `gate` is notified.
    pub fn hold_sign_in(&self, gate: Rc<Notify>) {
        *self.sign_in_gate.borrow_mut() = Some(gate);
    }

    pub fn is_subscribed(&self) -> bool {
        self.listener.borrow().is_some() && !self.unsubscribed.get()
    }
}

#[async_trait(?Send)]
impl IdentityProvider for FakeProvider {
    fn on_auth_state_changed(&self, listener: AuthStateListener) -> Unsubscribe {
        *self.listener.borrow_mut() = Some(listener);
        let flag = self.unsubscribed.clone();
        Unsubscribe::new(move || flag.set(true))
    }

    async fn sign_in_with_popup(&self, request: &SignInRequest) -> Result<(), ProviderError> {
        self.requests.borrow_mut().push(request.clone());

        let gate = self.sign_in_gate.borrow().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let outcome = self.sign_in_outcome.borrow().clone();
        match outcome {
            Some(Ok(identity)) => {
                self.emit(Some(identity));
                Ok(())
            }
            Some(Err(err)) => Err(err),
            None => Ok(()),
        }
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        let failure = self.sign_out_outcome.borrow().clone();
        match failure {
            Some(err) => Err(err),
            None => {
                self.emit(None);
                Ok(())
            }
        }
    }

    fn connect_emulator(&self, target: &str) {
        self.emulator_targets.borrow_mut().push(target.to_string());
    }
}
