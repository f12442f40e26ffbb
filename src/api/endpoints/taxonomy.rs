//! Taxonomy endpoint.
//!
//! - `GET /api/taxonomy`: diseases, their symptoms and follow-up plans

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::types::ApiContext;
use crate::config;

#[derive(Serialize)]
pub struct DiseaseEntry {
    pub name: String,
    pub symptoms: Vec<String>,
    pub follow_up_steps: Vec<String>,
    pub recovery_days: u32,
}

#[derive(Serialize)]
pub struct TaxonomyResponse {
    pub question_budget: usize,
    pub diseases: Vec<DiseaseEntry>,
}

pub async fn list(State(ctx): State<ApiContext>) -> Json<TaxonomyResponse> {
    let taxonomy = ctx.core.taxonomy();
    let diseases = taxonomy
        .entries()
        .into_iter()
        .map(|entry| DiseaseEntry {
            name: entry.name.to_string(),
            symptoms: entry.symptoms.to_vec(),
            follow_up_steps: entry.follow_up.steps,
            recovery_days: entry.follow_up.recovery_days,
        })
        .collect();

    Json(TaxonomyResponse {
        question_budget: config::QUESTION_BUDGET,
        diseases,
    })
}
