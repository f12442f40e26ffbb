//! `GET /api/patients/:patient/reports/:disease`: recovery report data.

use axum::extract::{Path, State};
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::normalize_patient_id;
use crate::report::{build_recovery_report, RecoveryReport};

pub async fn recovery(
    State(ctx): State<ApiContext>,
    Path((patient, disease)): Path<(String, String)>,
) -> Result<Json<RecoveryReport>, ApiError> {
    let conn = ctx.core.open_db()?;
    let tracker = ctx.tracker(&conn);
    let records = tracker.records(&patient)?;
    let plan = ctx.core.taxonomy().follow_up(&disease);

    let patient = normalize_patient_id(&patient);
    let report = build_recovery_report(&patient, &disease, &records, plan)?;
    tracing::info!(disease = %disease, symptoms = report.symptoms.len(), "Recovery report built");
    Ok(Json(report))
}
