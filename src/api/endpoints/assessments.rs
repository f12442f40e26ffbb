//! Questionnaire endpoints.
//!
//! - `POST /api/assessments/start`: open a session, get the first question
//! - `POST /api/assessments/:id/answer`: answer the pending question
//! - `POST /api/assessments/:id/previous`: undo the last answer
//! - `POST /api/patients/:patient/assessments`: save a finished result
//! - `GET /api/patients/:patient/assessments`: saved results, newest first
//!
//! Sessions idle past the timeout read as unknown (404). A finished session
//! answers `INVALID_STATE` until it expires.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::endpoints::parse_session_id;
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::assessment::{AssessmentResult, AssessmentStep};
use crate::models::SavedAssessment;
use crate::risk_assessment;

#[derive(Serialize)]
pub struct StartResponse {
    pub session_id: Uuid,
    pub step: AssessmentStep,
}

#[derive(Deserialize)]
pub struct AnswerRequest {
    pub has_symptom: bool,
}

pub async fn start(State(ctx): State<ApiContext>) -> Result<Json<StartResponse>, ApiError> {
    let (session_id, step) = ctx.core.start_assessment()?;
    Ok(Json(StartResponse { session_id, step }))
}

pub async fn answer(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
    Json(req): Json<AnswerRequest>,
) -> Result<Json<AssessmentStep>, ApiError> {
    let id = parse_session_id(&id)?;
    Ok(Json(ctx.core.answer_assessment(&id, req.has_symptom)?))
}

pub async fn previous(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<AssessmentStep>, ApiError> {
    let id = parse_session_id(&id)?;
    Ok(Json(ctx.core.rewind_assessment(&id)?))
}

pub async fn save(
    State(ctx): State<ApiContext>,
    Path(patient): Path<String>,
    Json(result): Json<AssessmentResult>,
) -> Result<(StatusCode, Json<SavedAssessment>), ApiError> {
    let conn = ctx.core.open_db()?;
    let saved = risk_assessment::save_result(&conn, &ctx.core.taxonomy(), &patient, &result)?;
    Ok((StatusCode::CREATED, Json(saved)))
}

pub async fn list(
    State(ctx): State<ApiContext>,
    Path(patient): Path<String>,
) -> Result<Json<Vec<SavedAssessment>>, ApiError> {
    let conn = ctx.core.open_db()?;
    Ok(Json(risk_assessment::patient_assessments(&conn, &patient)?))
}
