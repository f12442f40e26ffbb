//! Severity aggregation & priority classification.
//!
//! Reduces tracked symptom logs to one severity per (patient, disease): the
//! statistical mode of each uncured symptom's latest severity. The mode maps
//! one-to-one onto a triage priority.

use std::collections::HashMap;

use serde::{Serialize, Serializer};

use crate::models::{Priority, Severity, TrackingRecord};

/// Placeholder shown when a disease has no usable log data.
pub const NO_SEVERITY: &str = "N/A";

/// Per-disease aggregate. Derived on read, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeverityAggregate {
    pub patient_id: String,
    pub disease_name: String,
    /// Every tracked symptom, cured ones included, in first-seen order.
    pub symptoms: Vec<String>,
    pub cured_symptoms: Vec<String>,
    #[serde(serialize_with = "severity_or_na")]
    pub severity: Option<Severity>,
    pub priority: Option<Priority>,
    /// All tracked symptoms are cured.
    pub fully_resolved: bool,
}

fn severity_or_na<S: Serializer>(value: &Option<Severity>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(severity) => serializer.serialize_str(severity.as_str()),
        None => serializer.serialize_str(NO_SEVERITY),
    }
}

pub fn score_to_severity(score: u8) -> Severity {
    Severity::from_score(score)
}

/// Severity of the most recent log by date. `None` without logs.
pub fn latest_severity(record: &TrackingRecord) -> Option<Severity> {
    record.latest_log().map(|log| log.severity)
}

/// Most frequent value. Equal counts go to the value seen first.
pub fn mode_severity(values: &[Severity]) -> Option<Severity> {
    let mut counts: HashMap<Severity, usize> = HashMap::new();
    for value in values {
        *counts.entry(*value).or_insert(0) += 1;
    }
    let top = counts.values().copied().max()?;
    values.iter().copied().find(|value| counts[value] == top)
}

/// Groups records by (patient, disease) in first-seen order and aggregates each group.
pub fn aggregate_by_disease(records: &[TrackingRecord]) -> Vec<SeverityAggregate> {
    let mut index: HashMap<(&str, &str), usize> = HashMap::new();
    let mut groups: Vec<Vec<&TrackingRecord>> = Vec::new();

    for record in records {
        let key = (record.patient_id.as_str(), record.disease_name.as_str());
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(record);
    }

    groups.into_iter().map(|group| aggregate_group(&group)).collect()
}

fn aggregate_group(group: &[&TrackingRecord]) -> SeverityAggregate {
    let mut symptoms: Vec<String> = Vec::new();
    let mut cured_symptoms = Vec::new();
    let mut latest = Vec::new();

    for record in group {
        if !symptoms.contains(&record.symptom_name) {
            symptoms.push(record.symptom_name.clone());
        }
        if record.is_cured {
            cured_symptoms.push(record.symptom_name.clone());
            continue;
        }
        if let Some(severity) = latest_severity(record) {
            latest.push(severity);
        }
    }

    let severity = mode_severity(&latest);
    let first = group[0];
    SeverityAggregate {
        patient_id: first.patient_id.clone(),
        disease_name: first.disease_name.clone(),
        fully_resolved: group.iter().all(|r| r.is_cured),
        symptoms,
        cured_symptoms,
        severity,
        priority: severity.map(Priority::from),
    }
}
