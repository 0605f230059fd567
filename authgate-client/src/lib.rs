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

//! Frontend half of authgate: the authentication session state machine and
//! an HTTP helper that attaches the signed-in user's bearer token.
//!
//! The identity provider SDK is supplied by the host application as an
//! [`IdentityProvider`] implementation. Everything here is single-threaded
//! (`Rc`/`RefCell`, `?Send` futures) because it runs on the browser event loop.
//!
//! # Example
//!
//! ```no_run
//! use std::rc::Rc;
//! use authgate_client::{IdentityProvider, SessionConfig, SessionManager};
//!
//! # async fn example(provider: Rc<dyn IdentityProvider>) {
//! let manager = SessionManager::new(provider, SessionConfig::default());
//! let session = manager.handle();
//!
//! session.sign_in().await.expect("scope is alive");
//! if let Some(err) = session.session().unwrap().last_error() {
//!     println!("sign-in failed: {err}");
//! }
//!
//! let client = session.fetch_with_auth().unwrap();
//! let response = client.get("http://localhost:8080/api/v1/me").await;
//! # }
//! ```

pub mod config;
pub mod error;
pub mod fetch;
pub mod provider;
pub mod session;

pub use authgate_types;
pub use config::SessionConfig;
pub use error::{FetchError, SessionError, SignInError};
pub use fetch::{fetch_with_auth, AuthenticatedClient};
pub use provider::{
    AuthStateListener, Identity, IdentityHandle, IdentityProvider, ProviderError, SignInRequest,
    Unsubscribe,
};
pub use session::{Session, SessionHandle, SessionManager, SessionStatus};
