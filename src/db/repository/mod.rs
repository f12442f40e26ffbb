//! Repository layer: entity-scoped database operations.
//!
//! Tracking records sit behind the `TrackingStore` trait so the tracker can
//! run against any read-after-write consistent store. Saved assessments are
//! plain functions over a `Connection`.

mod assessment;
mod tracking;

use uuid::Uuid;

use super::DatabaseError;
use crate::models::{DailyLog, NewTrackingRecord, TrackingRecord};

/// Persistence operations for symptom tracking records.
pub trait TrackingStore {
    fn find_record(
        &self,
        patient_id: &str,
        disease_name: &str,
        symptom_name: &str,
    ) -> Result<Option<TrackingRecord>, DatabaseError>;
    /// Returns the existing record when the key is already tracked.
    fn create_record(&self, record: &NewTrackingRecord) -> Result<TrackingRecord, DatabaseError>;
    /// Appends one log entry. Existing entries are never rewritten.
    fn append_daily_log(
        &self,
        record: &TrackingRecord,
        log: &DailyLog,
    ) -> Result<TrackingRecord, DatabaseError>;
    fn set_cured(&self, record: &TrackingRecord, is_cured: bool)
        -> Result<TrackingRecord, DatabaseError>;
    fn list_records(&self, patient_id: &str) -> Result<Vec<TrackingRecord>, DatabaseError>;
    fn list_all_records(&self) -> Result<Vec<TrackingRecord>, DatabaseError>;
}

pub use assessment::*;
pub use tracking::*;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn parse_id(raw: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(raw).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))
}

fn parse_timestamp(raw: &str) -> Result<chrono::NaiveDateTime, DatabaseError> {
    chrono::NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .map_err(|e| DatabaseError::ConstraintViolation(format!("bad timestamp {raw}: {e}")))
}
