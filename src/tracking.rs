//! Symptom tracking: daily log submission, cure events and per-patient
//! priority, on top of any `TrackingStore`.
//!
//! Every submission is validated against the taxonomy before the store is
//! touched.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

use crate::config;
use crate::db::{DatabaseError, TrackingStore};
use crate::models::{normalize_patient_id, DailyLog, NewTrackingRecord, TrackingRecord};
use crate::severity::{aggregate_by_disease, SeverityAggregate};
use crate::taxonomy::DiseaseTaxonomy;

#[derive(Error, Debug)]
pub enum TrackingError {
    #[error("Symptom '{symptom}' is not tracked for disease '{disease}'")]
    UnknownSymptomOrDisease { disease: String, symptom: String },
    #[error("Score {0} is outside 0..={max}", max = config::MAX_SCORE)]
    ScoreOutOfRange(i64),
    #[error("No tracking record for '{symptom}' under '{disease}'")]
    RecordNotFound { disease: String, symptom: String },
    #[error("Patient identifier must not be empty")]
    EmptyPatientId,
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// One daily report as submitted by a patient.
#[derive(Debug, Clone, Deserialize)]
pub struct LogSubmission {
    pub disease: String,
    pub symptom: String,
    /// Wide type so out-of-range input reaches validation instead of failing to parse.
    pub score: i64,
    pub date: NaiveDate,
}

pub struct SymptomTracker<S> {
    store: S,
    taxonomy: Arc<DiseaseTaxonomy>,
}

impl<S: TrackingStore> SymptomTracker<S> {
    pub fn new(store: S, taxonomy: Arc<DiseaseTaxonomy>) -> Self {
        Self { store, taxonomy }
    }

    /// Appends a daily log, creating the record on the first submission for a key.
    pub fn submit_log(
        &self,
        patient_id: &str,
        submission: &LogSubmission,
    ) -> Result<TrackingRecord, TrackingError> {
        let patient_id = checked_patient(patient_id)?;
        self.check_known(&submission.disease, &submission.symptom)?;
        let score = u8::try_from(submission.score)
            .ok()
            .filter(|s| *s <= config::MAX_SCORE)
            .ok_or(TrackingError::ScoreOutOfRange(submission.score))?;

        let record = match self
            .store
            .find_record(&patient_id, &submission.disease, &submission.symptom)?
        {
            Some(existing) => existing,
            None => {
                let plan = self.taxonomy.follow_up(&submission.disease);
                tracing::info!(
                    patient = %patient_id,
                    disease = %submission.disease,
                    symptom = %submission.symptom,
                    "Tracking new symptom"
                );
                self.store.create_record(&NewTrackingRecord {
                    patient_id: patient_id.clone(),
                    disease_name: submission.disease.clone(),
                    symptom_name: submission.symptom.clone(),
                    estimated_recovery_days: plan.recovery_days,
                })?
            }
        };

        let log = DailyLog::scored(submission.date, score);
        tracing::debug!(
            patient = %patient_id,
            symptom = %submission.symptom,
            score,
            severity = %log.severity,
            "Daily log"
        );
        Ok(self.store.append_daily_log(&record, &log)?)
    }

    pub fn set_cured(
        &self,
        patient_id: &str,
        disease: &str,
        symptom: &str,
        is_cured: bool,
    ) -> Result<TrackingRecord, TrackingError> {
        let patient_id = checked_patient(patient_id)?;
        self.check_known(disease, symptom)?;
        let record = self
            .store
            .find_record(&patient_id, disease, symptom)?
            .ok_or_else(|| TrackingError::RecordNotFound {
                disease: disease.to_string(),
                symptom: symptom.to_string(),
            })?;

        tracing::info!(patient = %patient_id, disease, symptom, is_cured, "Cure status changed");
        Ok(self.store.set_cured(&record, is_cured)?)
    }

    pub fn records(&self, patient_id: &str) -> Result<Vec<TrackingRecord>, TrackingError> {
        let patient_id = checked_patient(patient_id)?;
        Ok(self.store.list_records(&patient_id)?)
    }

    pub fn all_records(&self) -> Result<Vec<TrackingRecord>, TrackingError> {
        Ok(self.store.list_all_records()?)
    }

    /// Mode severity and priority for each disease the patient tracks.
    pub fn compute_priority(&self, patient_id: &str) -> Result<Vec<SeverityAggregate>, TrackingError> {
        Ok(aggregate_by_disease(&self.records(patient_id)?))
    }

    fn check_known(&self, disease: &str, symptom: &str) -> Result<(), TrackingError> {
        if self.taxonomy.contains(disease, symptom) {
            Ok(())
        } else {
            Err(TrackingError::UnknownSymptomOrDisease {
                disease: disease.to_string(),
                symptom: symptom.to_string(),
            })
        }
    }
}

fn checked_patient(raw: &str) -> Result<String, TrackingError> {
    let id = normalize_patient_id(raw);
    if id.is_empty() {
        return Err(TrackingError::EmptyPatientId);
    }
    Ok(id)
}
