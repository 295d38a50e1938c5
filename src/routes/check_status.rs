use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;

use crate::app_state::AppState;
use crate::models::status::{CheckStatus, StatusQuery, StatusResponse};
use crate::routes::error::ApiError;
use crate::services::{sheets, status};

/// GET /api/check-status?id=... — look the request id up in the status sheet.
///
/// A sheet response without the gviz envelope reads as "pending"; only a
/// failed fetch or a broken payload inside the envelope is an error.
pub async fn check_status(
    State(state): State<AppState>,
    query: Result<Query<StatusQuery>, QueryRejection>,
) -> Result<Json<StatusResponse>, ApiError> {
    let Query(query) = query.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let id = query
        .id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::BadRequest("ID is required".to_string()))?;

    tracing::debug!(request_id = %id, "Checking status");

    let response = match lookup(&state, &id).await {
        Ok(response) => response,
        Err(e) => {
            metrics::counter!("status_checks_total", "outcome" => "error").increment(1);
            tracing::error!(request_id = %id, error = %e, "Status check failed");
            return Err(e);
        }
    };

    let outcome = match (response.found, response.status) {
        (false, _) => "not_found",
        (true, CheckStatus::Completed) => "completed",
        (true, CheckStatus::Pending) => "pending",
    };
    metrics::counter!("status_checks_total", "outcome" => outcome).increment(1);

    Ok(Json(response))
}

async fn lookup(state: &AppState, id: &str) -> Result<StatusResponse, ApiError> {
    let text = state.sheets.fetch_raw().await?;

    let Some(payload) = sheets::unwrap_envelope(&text) else {
        tracing::warn!(request_id = %id, "Sheet response has no gviz envelope, reporting pending");
        return Ok(StatusResponse::not_found());
    };

    let table = sheets::parse_table(payload)?;
    tracing::debug!(request_id = %id, rows = table.rows.len(), "Scanning status sheet");

    Ok(status::resolve(&table, id))
}
