//! Saved questionnaire outcomes. A finished assessment is stored against the
//! patient together with the follow-up plan for its predicted disease.

use rusqlite::Connection;
use thiserror::Error;

use crate::assessment::AssessmentResult;
use crate::db::{self, DatabaseError};
use crate::models::{normalize_patient_id, SavedAssessment};
use crate::taxonomy::DiseaseTaxonomy;

#[derive(Error, Debug)]
pub enum RiskAssessmentError {
    #[error("Patient identifier must not be empty")]
    EmptyPatientId,
    #[error("Unknown disease: {0}")]
    UnknownDisease(String),
    #[error("Assessment for '{disease}' already saved for this patient")]
    DuplicateAssessment { disease: String },
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Stores a finished assessment. Each patient holds a given disease once.
pub fn save_result(
    conn: &Connection,
    taxonomy: &DiseaseTaxonomy,
    patient_id: &str,
    result: &AssessmentResult,
) -> Result<SavedAssessment, RiskAssessmentError> {
    let patient_id = normalize_patient_id(patient_id);
    if patient_id.is_empty() {
        return Err(RiskAssessmentError::EmptyPatientId);
    }
    if taxonomy.disease(&result.predicted_disease).is_none() {
        return Err(RiskAssessmentError::UnknownDisease(result.predicted_disease.clone()));
    }
    if db::assessment_exists(conn, &patient_id, &result.predicted_disease)? {
        return Err(RiskAssessmentError::DuplicateAssessment {
            disease: result.predicted_disease.clone(),
        });
    }

    let plan = taxonomy.follow_up(&result.predicted_disease);
    let saved = db::new_assessment_row(
        &patient_id,
        &result.predicted_disease,
        result.symptoms.clone(),
        plan.steps,
        plan.recovery_days,
    );
    db::insert_assessment(conn, &saved)?;

    tracing::info!(
        patient = %patient_id,
        disease = %saved.predicted_disease,
        "Assessment saved"
    );
    Ok(saved)
}

/// Newest first.
pub fn patient_assessments(
    conn: &Connection,
    patient_id: &str,
) -> Result<Vec<SavedAssessment>, RiskAssessmentError> {
    Ok(db::list_assessments(conn, &normalize_patient_id(patient_id))?)
}
