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

//! Liveness endpoint. Public.

use authgate_types::{APIResponse, HealthResponse};
use axum::Json;

pub async fn health() -> Json<APIResponse<HealthResponse>> {
    Json(APIResponse::ok(HealthResponse {
        status: "ok".to_string(),
    }))
}
