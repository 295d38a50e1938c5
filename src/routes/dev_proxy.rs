use axum::extract::{Request, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::app_state::AppState;
use crate::models::submission::ErrorResponse;
use crate::routes::webhook::{collect_body, content_type};
use crate::services::workflow::{truncate, WorkflowError};

/// POST /webhook — forward the body as-is and wait for the workflow's answer.
///
/// Used locally when the workflow replies synchronously. The upstream status,
/// content type and body are passed through; timeouts become a 504 with
/// `"error": "timeout"` so the caller can tell them apart from failures.
pub async fn proxy_webhook(State(state): State<AppState>, request: Request) -> Response {
    let content_type = content_type(request.headers()).unwrap_or_default();

    tracing::info!("Received submission, waiting for the workflow (may take several minutes)");

    let body = match collect_body(request, state.max_body_bytes).await {
        Ok(body) => body,
        Err(e) => return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string(), None),
    };

    match state.workflow.exchange(&content_type, body).await {
        Ok(reply) => {
            tracing::info!(
                status = reply.status.as_u16(),
                preview = %truncate(&String::from_utf8_lossy(&reply.body), 300),
                "Workflow replied"
            );

            let content_type = reply
                .content_type
                .and_then(|ct| HeaderValue::from_str(&ct).ok())
                .unwrap_or_else(|| HeaderValue::from_static("application/json"));

            (reply.status, [(header::CONTENT_TYPE, content_type)], reply.body).into_response()
        }
        Err(WorkflowError::UpstreamTimeout) => {
            tracing::warn!("Workflow gateway timed out (524); the run continues in n8n");
            error_response(
                StatusCode::GATEWAY_TIMEOUT,
                "timeout".to_string(),
                Some("The workflow took too long. Processing continues in n8n."),
            )
        }
        Err(WorkflowError::Timeout) => {
            tracing::error!("Proxy timed out waiting for the workflow");
            error_response(
                StatusCode::GATEWAY_TIMEOUT,
                "timeout".to_string(),
                Some("Timed out waiting for n8n"),
            )
        }
        Err(e) => {
            tracing::error!(error = %e, "Proxy request failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string(), None)
        }
    }
}

fn error_response(status: StatusCode, error: String, message: Option<&str>) -> Response {
    let body = ErrorResponse {
        error,
        message: message.map(str::to_string),
        details: None,
    };
    (status, Json(body)).into_response()
}

/// Anything the proxy does not serve.
pub async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not Found")
}
