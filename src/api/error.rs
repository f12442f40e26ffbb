//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::assessment::AssessmentError;
use crate::core_state::CoreError;
use crate::report::ReportError;
use crate::risk_assessment::RiskAssessmentError;
use crate::tracking::TrackingError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Invalid state: {0}")]
    InvalidState(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Not resolved: {0}")]
    NotResolved(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, "NOT_FOUND", detail),
            ApiError::BadRequest(detail) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail),
            ApiError::InvalidState(detail) => (StatusCode::BAD_REQUEST, "INVALID_STATE", detail),
            ApiError::Conflict(detail) => (StatusCode::CONFLICT, "CONFLICT", detail),
            ApiError::NotResolved(detail) => (StatusCode::CONFLICT, "NOT_RESOLVED", detail),
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };
        (status, Json(body)).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::SessionNotFound(id) => ApiError::NotFound(format!("Assessment session {id}")),
            CoreError::Assessment(e) => e.into(),
            CoreError::LockPoisoned => ApiError::Internal("lock poisoned".into()),
            CoreError::Database(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<AssessmentError> for ApiError {
    fn from(err: AssessmentError) -> Self {
        ApiError::InvalidState(err.to_string())
    }
}

impl From<TrackingError> for ApiError {
    fn from(err: TrackingError) -> Self {
        match err {
            TrackingError::RecordNotFound { .. } => ApiError::NotFound(err.to_string()),
            TrackingError::Database(e) => ApiError::Internal(e.to_string()),
            TrackingError::UnknownSymptomOrDisease { .. }
            | TrackingError::ScoreOutOfRange(_)
            | TrackingError::EmptyPatientId => ApiError::BadRequest(err.to_string()),
        }
    }
}

impl From<RiskAssessmentError> for ApiError {
    fn from(err: RiskAssessmentError) -> Self {
        match err {
            RiskAssessmentError::DuplicateAssessment { .. } => ApiError::Conflict(err.to_string()),
            RiskAssessmentError::Database(e) => ApiError::Internal(e.to_string()),
            RiskAssessmentError::EmptyPatientId | RiskAssessmentError::UnknownDisease(_) => {
                ApiError::BadRequest(err.to_string())
            }
        }
    }
}

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::NotTracked(_) => ApiError::NotFound(err.to_string()),
            ReportError::NotResolved { .. } => ApiError::NotResolved(err.to_string()),
        }
    }
}

impl From<crate::db::DatabaseError> for ApiError {
    fn from(err: crate::db::DatabaseError) -> Self {
        ApiError::Internal(err.to_string())
    }
}
