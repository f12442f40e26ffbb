use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::Severity;

/// One daily self-report for a tracked symptom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyLog {
    pub date: NaiveDate,
    pub score: u8,
    pub severity: Severity,
}

impl DailyLog {
    /// Builds a log entry, deriving severity from the score.
    pub fn scored(date: NaiveDate, score: u8) -> Self {
        Self {
            date,
            score,
            severity: Severity::from_score(score),
        }
    }
}

/// Tracking state for one (patient, disease, symptom) key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingRecord {
    pub id: Uuid,
    pub patient_id: String,
    pub disease_name: String,
    pub symptom_name: String,
    pub estimated_recovery_days: u32,
    pub is_cured: bool,
    /// Append order. Use `latest_log` for the most recent entry by date.
    pub daily_logs: Vec<DailyLog>,
    pub created_at: NaiveDateTime,
}

impl TrackingRecord {
    /// The entry with the latest date. Same-day entries resolve to the one appended last.
    pub fn latest_log(&self) -> Option<&DailyLog> {
        self.daily_logs.iter().max_by_key(|log| log.date)
    }
}

/// Fields required to create a tracking record.
#[derive(Debug, Clone)]
pub struct NewTrackingRecord {
    pub patient_id: String,
    pub disease_name: String,
    pub symptom_name: String,
    pub estimated_recovery_days: u32,
}
