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

//! Process-wide router construction.

use std::sync::OnceLock;

use axum::Router;

use crate::config::Config;
use crate::routes;
use crate::state::AppState;

static APP: OnceLock<Router> = OnceLock::new();

/// Build a fresh router for `config`.
pub fn build_app(config: &Config) -> Router {
    routes::router(AppState::from_config(config))
}

/// The process's router. The first call builds it from `config`; later calls
/// return the same instance and ignore their argument.
pub fn shared_app(config: &Config) -> &'static Router {
    APP.get_or_init(|| {
        tracing::info!(
            required_domain = config.required_domain.as_deref().unwrap_or("<none>"),
            "Building token gateway router"
        );
        build_app(config)
    })
}
