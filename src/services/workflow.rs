use axum::body::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Status some CDNs in front of n8n return when the origin is too slow.
pub const ORIGIN_TIMEOUT_STATUS: u16 = 524;

/// Client for the n8n webhook that starts the media generation workflow.
pub struct WorkflowClient {
    http: Client,
    url: String,
}

/// Full reply from a synchronous workflow call.
#[derive(Debug)]
pub struct WorkflowReply {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl WorkflowClient {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, WorkflowError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            url: url.to_string(),
        })
    }

    async fn post(&self, content_type: &str, body: Bytes) -> Result<reqwest::Response, WorkflowError> {
        self.http
            .post(&self.url)
            .header(CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await
            .map_err(WorkflowError::from_send)
    }

    /// Hand a multipart body to the workflow and report only that it was sent.
    ///
    /// The workflow's response status is informational: a non-success status
    /// is logged with the response text but is not an error. Only a failed
    /// send is.
    pub async fn forward(
        &self,
        request_id: &str,
        content_type: &str,
        body: Bytes,
    ) -> Result<StatusCode, WorkflowError> {
        tracing::info!(request_id, bytes = body.len(), "Forwarding submission to workflow");

        let response = self.post(content_type, body).await?;
        let status = response.status();

        if status.is_success() {
            tracing::info!(request_id, status = status.as_u16(), "Workflow accepted submission");
        } else {
            let text = response.text().await.unwrap_or_default();
            metrics::counter!("workflow_non_success_total").increment(1);
            tracing::warn!(
                request_id,
                status = status.as_u16(),
                body = %truncate(&text, 500),
                "Workflow answered with non-success status"
            );
        }

        Ok(status)
    }

    /// Send a multipart body and wait for the workflow's full answer.
    ///
    /// An upstream 524 is mapped to [`WorkflowError::UpstreamTimeout`]; the
    /// workflow may still be running. No retry is attempted.
    pub async fn exchange(&self, content_type: &str, body: Bytes) -> Result<WorkflowReply, WorkflowError> {
        let response = self.post(content_type, body).await?;
        let status = response.status();

        if status.as_u16() == ORIGIN_TIMEOUT_STATUS {
            return Err(WorkflowError::UpstreamTimeout);
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let body = response.bytes().await.map_err(WorkflowError::from_send)?;

        Ok(WorkflowReply {
            status,
            content_type,
            body,
        })
    }
}

pub(crate) fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("HTTP request to workflow failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Timed out waiting for the workflow")]
    Timeout,

    #[error("Workflow gateway timed out (HTTP 524)")]
    UpstreamTimeout,
}

impl WorkflowError {
    fn from_send(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            WorkflowError::Timeout
        } else {
            WorkflowError::Http(err)
        }
    }
}
