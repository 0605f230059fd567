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

//! Handler for the caller's own verified identity.

use authgate_types::{APIResponse, PrincipalResponse};
use axum::Json;

use crate::gateway::VerifiedPrincipal;

/// GET /api/v1/me
pub async fn me(principal: VerifiedPrincipal) -> Json<APIResponse<PrincipalResponse>> {
    Json(APIResponse::ok(PrincipalResponse {
        subject_id: principal.subject_id().to_string(),
        email: principal.email().map(str::to_string),
        claims: principal.into_claims(),
    }))
}
