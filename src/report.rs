//! Recovery report data for a fully resolved disease.
//!
//! Produces the figures a report renderer needs. Rendering itself happens
//! elsewhere.

use serde::Serialize;
use thiserror::Error;

use crate::models::{DailyLog, Severity, TrackingRecord};
use crate::taxonomy::FollowUpPlan;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ReportError {
    #[error("No tracked symptoms for disease '{0}'")]
    NotTracked(String),
    #[error("Disease '{disease}' still has {} uncured symptom(s)", .open.len())]
    NotResolved { disease: String, open: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymptomSummary {
    pub symptom: String,
    pub estimated_days: u32,
    /// Sorted by date; same-day entries keep append order.
    pub logs: Vec<DailyLog>,
    pub average_score: Option<f64>,
    pub highest_severity: Option<Severity>,
    pub lowest_severity: Option<Severity>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecoveryReport {
    pub patient_id: String,
    pub disease_name: String,
    pub recovery_days: u32,
    pub follow_up_steps: Vec<String>,
    pub symptoms: Vec<SymptomSummary>,
    /// Across every log of every symptom.
    pub average_score: Option<f64>,
    pub highest_severity: Option<Severity>,
    pub lowest_severity: Option<Severity>,
}

/// Builds the report from a patient's records. Only records for `disease` are used.
pub fn build_recovery_report(
    patient_id: &str,
    disease: &str,
    records: &[TrackingRecord],
    plan: FollowUpPlan,
) -> Result<RecoveryReport, ReportError> {
    let tracked: Vec<&TrackingRecord> = records
        .iter()
        .filter(|r| r.disease_name == disease)
        .collect();
    if tracked.is_empty() {
        return Err(ReportError::NotTracked(disease.to_string()));
    }

    let open: Vec<String> = tracked
        .iter()
        .filter(|r| !r.is_cured)
        .map(|r| r.symptom_name.clone())
        .collect();
    if !open.is_empty() {
        return Err(ReportError::NotResolved {
            disease: disease.to_string(),
            open,
        });
    }

    let symptoms: Vec<SymptomSummary> = tracked.iter().map(|r| summarize(r)).collect();
    let all_logs: Vec<&DailyLog> = symptoms.iter().flat_map(|s| s.logs.iter()).collect();

    Ok(RecoveryReport {
        patient_id: patient_id.to_string(),
        disease_name: disease.to_string(),
        recovery_days: plan.recovery_days,
        follow_up_steps: plan.steps,
        average_score: average(&all_logs),
        highest_severity: all_logs.iter().map(|l| l.severity).max_by_key(Severity::rank),
        lowest_severity: all_logs.iter().map(|l| l.severity).min_by_key(Severity::rank),
        symptoms,
    })
}

fn summarize(record: &TrackingRecord) -> SymptomSummary {
    let mut logs = record.daily_logs.clone();
    logs.sort_by_key(|l| l.date);
    let refs: Vec<&DailyLog> = logs.iter().collect();

    SymptomSummary {
        symptom: record.symptom_name.clone(),
        estimated_days: record.estimated_recovery_days,
        average_score: average(&refs),
        highest_severity: logs.iter().map(|l| l.severity).max_by_key(Severity::rank),
        lowest_severity: logs.iter().map(|l| l.severity).min_by_key(Severity::rank),
        logs,
    }
}

fn average(logs: &[&DailyLog]) -> Option<f64> {
    if logs.is_empty() {
        return None;
    }
    let total: u32 = logs.iter().map(|l| u32::from(l.score)).sum();
    Some(f64::from(total) / logs.len() as f64)
}
