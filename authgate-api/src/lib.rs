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

//! authgate token gateway.
//!
//! This crate provides the Axum router, the bearer-token gateway that guards
//! the protected route group, and configuration. The binary entry point
//! (`main.rs`) is a thin wrapper that calls into this library.

pub mod app;
pub mod config;
pub mod error;
pub mod gateway;
pub mod routes;
pub mod state;
