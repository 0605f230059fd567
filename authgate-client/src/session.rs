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

//! Authentication session state machine.
//!
//! ```text
//! Initializing --auth state callback--> Idle
//! Initializing | Idle --sign_in / sign_out--> Authenticating --done--> Idle
//! ```
//!
//! Only the auth state callback leaves `Initializing`: an operation that
//! finishes before the first callback returns the session to `Initializing`.
//!
//! A failed operation leaves `last_error` set, which [`Session::status`]
//! reports as [`SessionStatus::Error`]. The next operation or auth state
//! callback clears it.
//!
//! Concurrent `sign_in` calls are not serialized: both run, and whichever
//! provider callback lands last decides the identity.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::OnceLock;

use crate::config::SessionConfig;
use crate::error::{SessionError, SignInError};
use crate::fetch::{fetch_with_auth, AuthenticatedClient};
use crate::provider::{AuthStateListener, Identity, IdentityProvider, SignInRequest, Unsubscribe};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Waiting for the provider's first auth state callback.
    Initializing,
    Idle,
    /// A sign-in or sign-out is in flight.
    Authenticating,
    /// The last operation failed; see [`Session::last_error`].
    Error,
}

/// Snapshot of the authentication session.
#[derive(Debug, Clone)]
pub struct Session {
    identity: Option<Identity>,
    phase: SessionStatus,
    last_error: Option<String>,
    /// Whether the provider has delivered its first auth state callback.
    initialized: bool,
}

impl Session {
    fn new() -> Self {
        Self {
            identity: None,
            phase: SessionStatus::Initializing,
            last_error: None,
            initialized: false,
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn email(&self) -> Option<&str> {
        self.identity.as_ref().and_then(|identity| identity.email())
    }

    pub fn status(&self) -> SessionStatus {
        match (self.phase, &self.last_error) {
            (SessionStatus::Idle | SessionStatus::Initializing, Some(_)) => SessionStatus::Error,
            (phase, _) => phase,
        }
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.identity.is_some()
    }

    /// The phase an operation settles into once it completes.
    fn settled_phase(&self) -> SessionStatus {
        if self.initialized {
            SessionStatus::Idle
        } else {
            SessionStatus::Initializing
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(
            self.phase,
            SessionStatus::Initializing | SessionStatus::Authenticating
        )
    }
}

type ChangeListener = Rc<dyn Fn(&Session)>;

struct SessionInner {
    provider: Rc<dyn IdentityProvider>,
    config: SessionConfig,
    state: RefCell<Session>,
    listeners: RefCell<Vec<ChangeListener>>,
    active: Cell<bool>,
}

impl SessionInner {
    fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Apply `f` and notify change listeners. Once the owning manager is
    /// gone, in-flight operations still resolve but their results are dropped.
    fn update(&self, f: impl FnOnce(&mut Session)) {
        if !self.active.get() {
            return;
        }
        let snapshot = {
            let mut state = self.state.borrow_mut();
            f(&mut state);
            state.clone()
        };
        let listeners = self.listeners.borrow().clone();
        for listener in listeners {
            listener(&snapshot);
        }
    }

    fn on_auth_state(&self, identity: Option<Identity>) {
        log::debug!(
            "auth state changed: {}",
            identity
                .as_ref()
                .map(|i| i.uid().to_string())
                .unwrap_or_else(|| "signed out".to_string())
        );
        self.update(|session| {
            session.identity = identity;
            session.initialized = true;
            session.phase = SessionStatus::Idle;
            session.last_error = None;
        });
    }

    async fn sign_in(&self) {
        if self.state.borrow().phase == SessionStatus::Authenticating {
            log::warn!("sign_in called while another sign-in is in flight; last result wins");
        }
        self.update(|session| {
            session.phase = SessionStatus::Authenticating;
            session.last_error = None;
        });

        let request = SignInRequest::from_config(&self.config);
        let outcome = self.provider.sign_in_with_popup(&request).await;

        let last_error = match outcome {
            Ok(()) => None,
            Err(err) => {
                let classified = SignInError::classify(&err);
                match classified {
                    SignInError::UserCancelled => log::info!("sign-in popup dismissed"),
                    _ => log::warn!("sign-in failed: {err}"),
                }
                classified.user_message()
            }
        };

        self.update(|session| {
            session.phase = session.settled_phase();
            session.last_error = last_error;
        });
    }

    async fn sign_out(&self) {
        self.update(|session| {
            session.phase = SessionStatus::Authenticating;
            session.last_error = None;
        });

        let last_error = match self.provider.sign_out().await {
            Ok(()) => None,
            Err(err) => {
                log::warn!("sign-out failed: {err}");
                SignInError::provider_failure(&err).user_message()
            }
        };

        self.update(|session| {
            session.phase = session.settled_phase();
            session.last_error = last_error;
        });
    }
}

/// Owner of the application's single authentication session.
///
/// Subscribes to the provider on construction and unsubscribes on drop.
/// Hand [`SessionHandle`]s to the rest of the application; they stop working
/// once the manager is dropped.
pub struct SessionManager {
    inner: Rc<SessionInner>,
    subscription: Option<Unsubscribe>,
}

impl SessionManager {
    pub fn new(provider: Rc<dyn IdentityProvider>, config: SessionConfig) -> Self {
        if let Some(target) = &config.emulator_host {
            connect_emulator_once(provider.as_ref(), target);
        }

        let inner = Rc::new(SessionInner {
            provider,
            config,
            state: RefCell::new(Session::new()),
            listeners: RefCell::new(Vec::new()),
            active: Cell::new(true),
        });

        let weak = Rc::downgrade(&inner);
        let listener: AuthStateListener = Rc::new(move |identity| {
            if let Some(inner) = weak.upgrade() {
                inner.on_auth_state(identity);
            }
        });
        let subscription = inner.provider.on_auth_state_changed(listener);

        Self {
            inner,
            subscription: Some(subscription),
        }
    }

    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    pub fn session(&self) -> Session {
        self.inner.snapshot()
    }

    pub fn is_signed_in(&self) -> bool {
        self.inner.state.borrow().is_signed_in()
    }

    /// Run the interactive sign-in. Never fails; the outcome lands in
    /// [`Session::last_error`].
    pub async fn sign_in(&self) {
        self.inner.sign_in().await
    }

    pub async fn sign_out(&self) {
        self.inner.sign_out().await
    }

    /// Register a callback invoked with a fresh snapshot after every change.
    pub fn on_change(&self, listener: impl Fn(&Session) + 'static) {
        self.inner.listeners.borrow_mut().push(Rc::new(listener));
    }

    pub fn fetch_with_auth(&self) -> AuthenticatedClient {
        fetch_with_auth(self.inner.state.borrow().identity.clone())
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        self.inner.active.set(false);
        self.inner.listeners.borrow_mut().clear();
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }
}

impl fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionManager")
            .field("session", &*self.inner.state.borrow())
            .finish()
    }
}

/// Read/act access to a [`SessionManager`]'s session from anywhere in the app.
///
/// Every method fails with [`SessionError::ContextMisuse`] when the handle is
/// [`detached`](Self::detached) or its manager has been dropped.
#[derive(Clone, Default)]
pub struct SessionHandle {
    inner: Weak<SessionInner>,
}

impl SessionHandle {
    /// A handle not bound to any session.
    pub fn detached() -> Self {
        Self::default()
    }

    fn scope(&self) -> Result<Rc<SessionInner>, SessionError> {
        self.inner
            .upgrade()
            .filter(|inner| inner.active.get())
            .ok_or(SessionError::ContextMisuse)
    }

    pub fn session(&self) -> Result<Session, SessionError> {
        Ok(self.scope()?.snapshot())
    }

    pub fn is_signed_in(&self) -> Result<bool, SessionError> {
        Ok(self.scope()?.state.borrow().is_signed_in())
    }

    pub async fn sign_in(&self) -> Result<(), SessionError> {
        let inner = self.scope()?;
        inner.sign_in().await;
        Ok(())
    }

    pub async fn sign_out(&self) -> Result<(), SessionError> {
        let inner = self.scope()?;
        inner.sign_out().await;
        Ok(())
    }

    pub fn fetch_with_auth(&self) -> Result<AuthenticatedClient, SessionError> {
        let inner = self.scope()?;
        let identity = inner.state.borrow().identity.clone();
        Ok(fetch_with_auth(identity))
    }
}

impl fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionHandle")
            .field("attached", &self.scope().is_ok())
            .finish()
    }
}

static EMULATOR_TARGET: OnceLock<String> = OnceLock::new();

/// Point the provider at the auth emulator, once per process. Returns `true`
/// when this call performed the connection.
fn connect_emulator_once(provider: &dyn IdentityProvider, target: &str) -> bool {
    let mut connected = false;
    let active = EMULATOR_TARGET.get_or_init(|| {
        log::info!("connecting identity provider to emulator at {target}");
        provider.connect_emulator(target);
        connected = true;
        target.to_string()
    });
    if !connected && active != target {
        log::warn!("emulator already connected to {active}; ignoring {target}");
    }
    connected
}
