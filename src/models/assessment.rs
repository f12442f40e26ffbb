use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A questionnaire outcome saved against a patient, with its follow-up plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedAssessment {
    pub id: Uuid,
    pub patient_id: String,
    pub predicted_disease: String,
    pub symptoms: Vec<String>,
    pub follow_up_steps: Vec<String>,
    pub recovery_days: u32,
    pub created_at: NaiveDateTime,
}
