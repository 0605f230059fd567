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

//! Session state machine tests against a scripted identity provider.

mod support;

use std::cell::RefCell;
use std::rc::Rc;

use authgate_client::error::{CREDENTIAL_CONFLICT_MESSAGE, GENERIC_FAILURE_MESSAGE};
use authgate_client::provider::codes;
use authgate_client::{
    ProviderError, SessionConfig, SessionError, SessionManager, SessionStatus,
};
use support::{FakeProvider, FakeUser};
use tokio::sync::Notify;

fn mount(provider: &Rc<FakeProvider>) -> SessionManager {
    SessionManager::new(provider.clone(), SessionConfig::default())
}

fn record_statuses(manager: &SessionManager) -> Rc<RefCell<Vec<SessionStatus>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    manager.on_change(move |session| sink.borrow_mut().push(session.status()));
    seen
}

#[test]
fn stays_initializing_until_first_callback() {
    let provider = FakeProvider::new();
    let manager = mount(&provider);

    assert!(provider.is_subscribed());
    assert_eq!(manager.session().status(), SessionStatus::Initializing);
    assert!(!manager.is_signed_in());

    provider.emit(None);
    let session = manager.session();
    assert_eq!(session.status(), SessionStatus::Idle);
    assert!(!session.is_loading());
    assert!(!session.is_signed_in());
}

#[test]
fn callback_restores_existing_identity() {
    let provider = FakeProvider::new();
    let manager = mount(&provider);

    provider.emit(Some(FakeUser::with_email("a@nearform.com")));
    assert!(manager.is_signed_in());
    assert_eq!(manager.session().email(), Some("a@nearform.com"));
}

#[tokio::test]
async fn sign_in_resolves_identity_through_callback() {
    let provider = FakeProvider::new();
    let manager = mount(&provider);
    provider.emit(None);
    provider.sign_in_succeeds_as(FakeUser::with_email("a@nearform.com"));
    let statuses = record_statuses(&manager);

    manager.sign_in().await;

    let session = manager.session();
    assert!(session.is_signed_in());
    assert_eq!(session.email(), Some("a@nearform.com"));
    assert_eq!(session.status(), SessionStatus::Idle);
    assert!(session.last_error().is_none());
    assert_eq!(
        *statuses.borrow(),
        vec![
            SessionStatus::Authenticating,
            SessionStatus::Idle,
            SessionStatus::Idle
        ]
    );

    let requests = provider.requests.borrow();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].custom_parameters["display"], "popup");
    assert!(!requests[0].custom_parameters.contains_key("hd"));
}

#[tokio::test]
async fn only_the_callback_leaves_initializing() {
    let provider = FakeProvider::new();
    let manager = mount(&provider);
    let statuses = record_statuses(&manager);

    // Resolves without the provider reporting any auth state.
    manager.sign_in().await;
    assert_eq!(manager.session().status(), SessionStatus::Initializing);

    provider.sign_in_fails_with(ProviderError::new("auth/internal-error", "boom"));
    manager.sign_in().await;
    assert_eq!(manager.session().status(), SessionStatus::Error);

    provider.emit(None);
    assert_eq!(manager.session().status(), SessionStatus::Idle);
    assert_eq!(
        *statuses.borrow(),
        vec![
            SessionStatus::Authenticating,
            SessionStatus::Initializing,
            SessionStatus::Authenticating,
            SessionStatus::Error,
            SessionStatus::Idle,
        ]
    );
}

#[tokio::test]
async fn required_domain_is_sent_as_hint() {
    let provider = FakeProvider::new();
    let config = SessionConfig::default().with_required_domain("nearform.com");
    let manager = SessionManager::new(provider.clone(), config);

    manager.sign_in().await;

    let requests = provider.requests.borrow();
    assert_eq!(requests[0].custom_parameters["hd"], "nearform.com");
}

#[tokio::test]
async fn dismissed_popup_is_not_an_error() {
    let provider = FakeProvider::new();
    let manager = mount(&provider);
    provider.emit(None);

    provider.sign_in_fails_with(ProviderError::new("auth/network-request-failed", "offline"));
    manager.sign_in().await;
    assert_eq!(manager.session().last_error(), Some("offline"));

    provider.sign_in_fails_with(ProviderError::new(
        codes::POPUP_CLOSED_BY_USER,
        "The popup has been closed by the user",
    ));
    manager.sign_in().await;

    let session = manager.session();
    assert!(session.last_error().is_none());
    assert_eq!(session.status(), SessionStatus::Idle);
    assert!(!session.is_signed_in());
}

#[tokio::test]
async fn credential_conflict_uses_fixed_message() {
    let provider = FakeProvider::new();
    let manager = mount(&provider);
    provider.emit(None);
    provider.sign_in_fails_with(ProviderError::new(
        codes::ACCOUNT_EXISTS_WITH_DIFFERENT_CREDENTIAL,
        "Firebase: Error (auth/account-exists-with-different-credential).",
    ));

    manager.sign_in().await;

    let session = manager.session();
    assert_eq!(session.last_error(), Some(CREDENTIAL_CONFLICT_MESSAGE));
    assert_eq!(session.status(), SessionStatus::Error);
    assert!(!session.is_loading());
}

#[tokio::test]
async fn other_failures_surface_provider_message_or_fallback() {
    let provider = FakeProvider::new();
    let manager = mount(&provider);
    provider.emit(None);

    provider.sign_in_fails_with(ProviderError::new("auth/internal-error", "quota exceeded"));
    manager.sign_in().await;
    assert_eq!(manager.session().last_error(), Some("quota exceeded"));

    provider.sign_in_fails_with(ProviderError::without_message("auth/internal-error"));
    manager.sign_in().await;
    assert_eq!(manager.session().last_error(), Some(GENERIC_FAILURE_MESSAGE));
}

#[tokio::test]
async fn callback_clears_previous_error() {
    let provider = FakeProvider::new();
    let manager = mount(&provider);
    provider.sign_in_fails_with(ProviderError::new("auth/internal-error", "boom"));
    manager.sign_in().await;
    assert_eq!(manager.session().status(), SessionStatus::Error);

    provider.emit(Some(FakeUser::with_email("b@nearform.com")));

    let session = manager.session();
    assert_eq!(session.status(), SessionStatus::Idle);
    assert!(session.last_error().is_none());
    assert!(session.is_signed_in());
}

#[tokio::test]
async fn sign_out_clears_identity() {
    let provider = FakeProvider::new();
    let manager = mount(&provider);
    provider.emit(Some(FakeUser::with_email("a@nearform.com")));
    let statuses = record_statuses(&manager);

    manager.sign_out().await;

    assert!(!manager.is_signed_in());
    assert_eq!(manager.session().status(), SessionStatus::Idle);
    assert_eq!(statuses.borrow()[0], SessionStatus::Authenticating);
}

#[tokio::test]
async fn failed_sign_out_keeps_identity_and_reports() {
    let provider = FakeProvider::new();
    let manager = mount(&provider);
    provider.emit(Some(FakeUser::with_email("a@nearform.com")));
    provider.sign_out_fails_with(ProviderError::new("auth/network-request-failed", "offline"));

    manager.sign_out().await;

    let session = manager.session();
    assert!(session.is_signed_in());
    assert_eq!(session.last_error(), Some("offline"));
    assert_eq!(session.status(), SessionStatus::Error);
}

#[tokio::test]
async fn handle_shares_the_managers_session() {
    let provider = FakeProvider::new();
    let manager = mount(&provider);
    let handle = manager.handle();
    provider.sign_in_succeeds_as(FakeUser::with_email("a@nearform.com"));

    assert_eq!(handle.is_signed_in(), Ok(false));
    handle.sign_in().await.unwrap();

    assert!(manager.is_signed_in());
    assert_eq!(handle.session().unwrap().email(), Some("a@nearform.com"));
    let client = handle.fetch_with_auth().unwrap();
    assert_eq!(
        client.identity().and_then(|i| i.email()),
        Some("a@nearform.com")
    );
}

#[tokio::test]
async fn dropping_manager_unsubscribes_and_invalidates_handles() {
    let provider = FakeProvider::new();
    let manager = mount(&provider);
    let handle = manager.handle();

    drop(manager);

    assert!(provider.unsubscribed.get());
    assert_eq!(handle.session().unwrap_err(), SessionError::ContextMisuse);
    assert_eq!(handle.sign_in().await, Err(SessionError::ContextMisuse));
    assert_eq!(handle.sign_out().await, Err(SessionError::ContextMisuse));
    assert!(provider.requests.borrow().is_empty());
}

#[tokio::test]
async fn in_flight_sign_in_resolves_after_teardown() {
    let provider = FakeProvider::new();
    let gate = Rc::new(Notify::new());
    provider.hold_sign_in(gate.clone());
    provider.sign_in_succeeds_as(FakeUser::with_email("a@nearform.com"));

    let manager = mount(&provider);
    let handle = manager.handle();
    let statuses = record_statuses(&manager);

    let sign_in = handle.sign_in();
    let teardown = async move {
        tokio::task::yield_now().await;
        assert_eq!(manager.session().status(), SessionStatus::Authenticating);
        drop(manager);
        gate.notify_one();
    };
    let (result, ()) = tokio::join!(sign_in, teardown);

    assert_eq!(result, Ok(()));
    assert_eq!(*statuses.borrow(), vec![SessionStatus::Authenticating]);
    assert_eq!(handle.session().unwrap_err(), SessionError::ContextMisuse);
}

#[tokio::test]
async fn concurrent_sign_ins_both_reach_the_provider() {
    let provider = FakeProvider::new();
    let gate = Rc::new(Notify::new());
    provider.hold_sign_in(gate.clone());
    provider.sign_in_succeeds_as(FakeUser::with_email("last@nearform.com"));
    let manager = mount(&provider);
    provider.emit(None);

    let release = async {
        tokio::task::yield_now().await;
        gate.notify_waiters();
    };
    tokio::join!(manager.sign_in(), manager.sign_in(), release);

    assert_eq!(provider.requests.borrow().len(), 2);
    let session = manager.session();
    assert_eq!(session.status(), SessionStatus::Idle);
    assert_eq!(session.email(), Some("last@nearform.com"));
}

#[test]
fn emulator_is_connected_once_per_process() {
    let config = SessionConfig {
        emulator_host: Some("http://localhost:9099".to_string()),
        ..SessionConfig::default()
    };

    let first = FakeProvider::new();
    let _first_manager = SessionManager::new(first.clone(), config.clone());
    let second = FakeProvider::new();
    let _second_manager = SessionManager::new(second.clone(), config);

    assert_eq!(
        *first.emulator_targets.borrow(),
        vec!["http://localhost:9099".to_string()]
    );
    assert!(second.emulator_targets.borrow().is_empty());
}
