//! Clinician triage board: one row per (patient, disease) across every
//! patient, filtered and sorted by priority.

use serde::Deserialize;

use crate::models::{Priority, TrackingRecord};
use crate::severity::{aggregate_by_disease, SeverityAggregate};

/// Priority filter. `All` is the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorityFilter {
    #[default]
    All,
    Low,
    Medium,
    High,
}

impl PriorityFilter {
    fn admits(&self, priority: Option<Priority>) -> bool {
        match self {
            PriorityFilter::All => true,
            PriorityFilter::Low => priority == Some(Priority::Low),
            PriorityFilter::Medium => priority == Some(Priority::Medium),
            PriorityFilter::High => priority == Some(Priority::High),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TriageFilter {
    #[serde(default)]
    pub priority: PriorityFilter,
    /// Case-insensitive substring over patient id, disease and symptom names.
    #[serde(default)]
    pub search: Option<String>,
}

/// Highest priority first, rows without data last. Ties keep first-seen order.
pub fn triage_board(records: &[TrackingRecord], filter: &TriageFilter) -> Vec<SeverityAggregate> {
    let needle = filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    let mut rows: Vec<SeverityAggregate> = aggregate_by_disease(records)
        .into_iter()
        .filter(|row| filter.priority.admits(row.priority))
        .filter(|row| needle.as_deref().map_or(true, |n| matches_search(row, n)))
        .collect();

    // Stable sort keeps first-seen order within a rank.
    rows.sort_by_key(|row| std::cmp::Reverse(row.priority.map_or(0, |p| p.rank())));
    rows
}

fn matches_search(row: &SeverityAggregate, needle: &str) -> bool {
    row.patient_id.to_lowercase().contains(needle)
        || row.disease_name.to_lowercase().contains(needle)
        || row.symptoms.iter().any(|s| s.to_lowercase().contains(needle))
}
