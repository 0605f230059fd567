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

//! Shared API types for authgate.
//!
//! This crate defines the wire contract between the token gateway and its
//! consumers (the session client, frontends, integration tests).
//! It is intentionally framework-agnostic: no axum, no reqwest.

pub mod error;
pub mod responses;

pub use error::APIError;
pub use responses::{APIResponse, HealthResponse, PrincipalResponse};
