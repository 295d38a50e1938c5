use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::models::submission::ErrorResponse;
use crate::services::{multipart::MultipartError, sheets::SheetsError, workflow::WorkflowError};

/// Error returned by route handlers, rendered as a JSON `{ "error": ... }` body.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("{0}")]
    BadRequest(String),

    #[error("Failed to read request body: {0}")]
    Body(String),

    #[error(transparent)]
    Multipart(#[from] MultipartError),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error(transparent)]
    Sheets(#[from] SheetsError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Body(_)
            | ApiError::Multipart(_)
            | ApiError::Workflow(_)
            | ApiError::Sheets(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let details = match &self {
            ApiError::Body(_) | ApiError::Multipart(_) | ApiError::Workflow(_) => {
                Some("Error processing the request on the server".to_string())
            }
            _ => None,
        };

        let body = ErrorResponse {
            error: self.to_string(),
            message: None,
            details,
        };
        (status, Json(body)).into_response()
    }
}

/// Fallback for unsupported methods on JSON endpoints.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// Empty 200 for bare `OPTIONS` requests that are not CORS preflights.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}
