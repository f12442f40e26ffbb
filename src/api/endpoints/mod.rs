//! API endpoint handlers.
//!
//! Handlers stay thin: parse the request, call the domain module, map errors.

pub mod assessments;
pub mod health;
pub mod reports;
pub mod taxonomy;
pub mod tracking;
pub mod triage;

use uuid::Uuid;

use crate::api::error::ApiError;

pub(crate) fn parse_session_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest("Invalid session ID format".into()))
}
