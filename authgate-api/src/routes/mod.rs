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

//! Axum router configuration: public and protected route groups.

pub mod health;
pub mod me;

use axum::{
    extract::{Request, State},
    http::Uri,
    middleware::{self, Next},
    response::Response,
    routing::{get, MethodRouter},
    Router,
};

use crate::error::AppError;
use crate::state::AppState;

/// Route table split into a public group and a protected group. Every
/// protected route runs the token gateway before its handler.
#[derive(Default)]
pub struct RouteGroups {
    public: Router<AppState>,
    protected: Router<AppState>,
    has_protected: bool,
}

impl RouteGroups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn public(mut self, path: &str, route: MethodRouter<AppState>) -> Self {
        self.public = self.public.route(path, route);
        self
    }

    pub fn protected(mut self, path: &str, route: MethodRouter<AppState>) -> Self {
        self.protected = self.protected.route(path, route);
        self.has_protected = true;
        self
    }

    /// Attach the gateway to the protected group and merge both groups.
    pub fn into_router(self, state: AppState) -> Router {
        let mut router = self.public;
        // route_layer panics on a router without routes.
        if self.has_protected {
            let protected = self.protected.route_layer(middleware::from_fn_with_state(
                state.clone(),
                require_verified_principal,
            ));
            router = router.merge(protected);
        }
        router.fallback(not_found).with_state(state)
    }
}

/// Pre-handler for protected routes: verifies the request and attaches the
/// principal to its extensions, or short-circuits with the gateway error.
pub async fn require_verified_principal(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let principal = match state.gateway.verify(req.headers()).await {
        Ok(principal) => principal,
        Err(err) => {
            tracing::warn!(path = %req.uri().path(), "Rejected request: {err}");
            return Err(err.into());
        }
    };
    tracing::debug!(subject = principal.subject_id(), "Verified request");
    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}

async fn not_found(uri: Uri) -> AppError {
    AppError::not_found(uri.path())
}

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    RouteGroups::new()
        .public("/health", get(health::health))
        .protected("/api/v1/me", get(me::me))
        .into_router(state)
}
