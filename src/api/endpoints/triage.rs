//! `GET /api/triage?priority=&search=`: clinician triage board.

use axum::extract::{Query, State};
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::severity::SeverityAggregate;
use crate::triage::{triage_board, TriageFilter};

pub async fn board(
    State(ctx): State<ApiContext>,
    Query(filter): Query<TriageFilter>,
) -> Result<Json<Vec<SeverityAggregate>>, ApiError> {
    let conn = ctx.core.open_db()?;
    let records = ctx.tracker(&conn).all_records()?;
    Ok(Json(triage_board(&records, &filter)))
}
