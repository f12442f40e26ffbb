//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub diseases: usize,
    pub active_assessments: usize,
}

/// `GET /api/health`: liveness plus a few counters.
pub async fn check(State(ctx): State<ApiContext>) -> Result<Json<HealthResponse>, ApiError> {
    Ok(Json(HealthResponse {
        status: "ok",
        version: crate::config::APP_VERSION,
        diseases: ctx.core.taxonomy().diseases().len(),
        active_assessments: ctx.core.active_sessions()?,
    }))
}
