use axum::body::{self, Bytes};
use axum::extract::{Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderMap;
use axum::Json;

use crate::app_state::AppState;
use crate::models::submission::SubmitResponse;
use crate::routes::error::ApiError;
use crate::services::{multipart, request_id};

/// POST /api/webhook — tag a multipart submission with a request id and hand
/// it to the workflow.
///
/// Returns as soon as the workflow has received the body; generation itself
/// takes minutes and is tracked through `/api/check-status`.
pub async fn submit(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<SubmitResponse>, ApiError> {
    let request_id = request_id::generate();
    let content_type = content_type(request.headers());

    tracing::info!(
        request_id = %request_id,
        content_type = content_type.as_deref().unwrap_or("<none>"),
        "Incoming submission"
    );
    metrics::counter!("relay_submissions_total").increment(1);

    let result = relay(&state, &request_id, content_type, request).await;
    if let Err(e) = &result {
        metrics::counter!("relay_forward_failures_total").increment(1);
        tracing::error!(request_id = %request_id, error = %e, "Relay failed");
    }
    result?;

    Ok(Json(SubmitResponse::processing(request_id)))
}

async fn relay(
    state: &AppState,
    request_id: &str,
    content_type: Option<String>,
    request: Request,
) -> Result<(), ApiError> {
    let body = collect_body(request, state.max_body_bytes).await?;
    let content_type = content_type.ok_or(multipart::MultipartError::MissingContentType)?;

    let tagged = multipart::inject_request_id(&content_type, &body, request_id)?;
    state.workflow.forward(request_id, &content_type, tagged).await?;
    Ok(())
}

pub(crate) fn content_type(headers: &HeaderMap) -> Option<String> {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

/// Buffer the whole raw body; the multipart stream is never parsed.
pub(crate) async fn collect_body(request: Request, limit: usize) -> Result<Bytes, ApiError> {
    body::to_bytes(request.into_body(), limit)
        .await
        .map_err(|e| ApiError::Body(e.to_string()))
}
