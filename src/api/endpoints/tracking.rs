//! Symptom tracking endpoints.
//!
//! - `POST /api/patients/:patient/tracking/logs`: submit a daily log
//! - `PUT /api/patients/:patient/tracking/cure`: mark a symptom cured or not
//! - `GET /api/patients/:patient/tracking`: every tracked record
//! - `GET /api/patients/:patient/priority`: mode severity per disease

use axum::extract::{Path, State};
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::TrackingRecord;
use crate::severity::SeverityAggregate;
use crate::tracking::LogSubmission;

#[derive(Deserialize)]
pub struct LogRequest {
    pub disease: String,
    pub symptom: String,
    pub score: i64,
    /// Defaults to today.
    pub date: Option<NaiveDate>,
}

#[derive(Deserialize)]
pub struct CureRequest {
    pub disease: String,
    pub symptom: String,
    pub is_cured: bool,
}

pub async fn submit_log(
    State(ctx): State<ApiContext>,
    Path(patient): Path<String>,
    Json(req): Json<LogRequest>,
) -> Result<Json<TrackingRecord>, ApiError> {
    let submission = LogSubmission {
        disease: req.disease,
        symptom: req.symptom,
        score: req.score,
        date: req
            .date
            .unwrap_or_else(|| chrono::Local::now().date_naive()),
    };

    let conn = ctx.core.open_db()?;
    Ok(Json(ctx.tracker(&conn).submit_log(&patient, &submission)?))
}

pub async fn cure(
    State(ctx): State<ApiContext>,
    Path(patient): Path<String>,
    Json(req): Json<CureRequest>,
) -> Result<Json<TrackingRecord>, ApiError> {
    let conn = ctx.core.open_db()?;
    let record = ctx
        .tracker(&conn)
        .set_cured(&patient, &req.disease, &req.symptom, req.is_cured)?;
    Ok(Json(record))
}

pub async fn list(
    State(ctx): State<ApiContext>,
    Path(patient): Path<String>,
) -> Result<Json<Vec<TrackingRecord>>, ApiError> {
    let conn = ctx.core.open_db()?;
    Ok(Json(ctx.tracker(&conn).records(&patient)?))
}

pub async fn priority(
    State(ctx): State<ApiContext>,
    Path(patient): Path<String>,
) -> Result<Json<Vec<SeverityAggregate>>, ApiError> {
    let conn = ctx.core.open_db()?;
    Ok(Json(ctx.tracker(&conn).compute_priority(&patient)?))
}
