use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::client::submission::Submission;
use crate::config::ClientConfig;
use crate::models::status::{ResultData, StatusResponse};

/// Per-check timeout; a hung check must not hold up the next tick for long.
const STATUS_CHECK_TIMEOUT: Duration = Duration::from_secs(30);

/// What the relay said about a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitReply {
    /// Accepted for asynchronous processing; poll with this id.
    Accepted { id: String },
    /// The endpoint answered with the finished result directly (dev proxy
    /// talking to a workflow that replies synchronously).
    Direct(ResultData),
}

/// The two calls a polling controller makes against the relay.
#[async_trait]
pub trait RelayApi: Send + Sync {
    async fn submit(&self, submission: &Submission) -> Result<SubmitReply, ClientError>;

    async fn check_status(&self, id: &str) -> Result<StatusResponse, ClientError>;
}

/// reqwest-backed relay client.
pub struct HttpRelayClient {
    http: Client,
    submit_url: String,
    status_url: String,
}

impl HttpRelayClient {
    pub fn new(submit_url: String, status_url: String, timeout: Duration) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            submit_url,
            status_url,
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        Self::new(config.submit_url(), config.status_url(), config.submit_timeout())
    }
}

#[async_trait]
impl RelayApi for HttpRelayClient {
    async fn submit(&self, submission: &Submission) -> Result<SubmitReply, ClientError> {
        tracing::info!(
            url = %self.submit_url,
            image_bytes = submission.image.bytes.len(),
            "Sending submission"
        );

        let response = self
            .http
            .post(&self.submit_url)
            .multipart(submission.to_form()?)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        tracing::debug!(status = status.as_u16(), body = %text, "Submit response");

        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        parse_submit_reply(&text)
    }

    async fn check_status(&self, id: &str) -> Result<StatusResponse, ClientError> {
        let response = self
            .http
            .get(&self.status_url)
            .query(&[("id", id)])
            .timeout(STATUS_CHECK_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}

/// Interpret a successful submit response body.
pub fn parse_submit_reply(text: &str) -> Result<SubmitReply, ClientError> {
    let value: serde_json::Value = serde_json::from_str(text)?;

    if let Some(id) = value.get("id").and_then(|id| id.as_str()).filter(|id| !id.is_empty()) {
        return Ok(SubmitReply::Accepted { id: id.to_string() });
    }

    // Synchronous workflows sometimes wrap their answer in a one-element array.
    let result = match value {
        serde_json::Value::Array(mut items) if items.len() == 1 => items.remove(0),
        other => other,
    };

    if !result.is_object() {
        return Err(ClientError::UnexpectedReply(text.chars().take(200).collect()));
    }

    Ok(SubmitReply::Direct(serde_json::from_value(result)?))
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP request to relay failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Relay answered HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to parse relay response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unexpected relay response: {0}")]
    UnexpectedReply(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepted() {
        let reply = parse_submit_reply(
            r#"{"success":true,"id":"lx1abc","status":"processing","message":"ok"}"#,
        )
        .unwrap();
        assert_eq!(reply, SubmitReply::Accepted { id: "lx1abc".into() });
    }

    #[test]
    fn test_parse_direct_result() {
        let reply = parse_submit_reply(
            r#"[{"file_name":"https://drive/img","video_name":"https://drive/vid"}]"#,
        )
        .unwrap();
        match reply {
            SubmitReply::Direct(data) => {
                assert_eq!(data.file_name, "https://drive/img");
                assert_eq!(data.video_name, "https://drive/vid");
                assert_eq!(data.file_url, "");
            }
            other => panic!("expected direct result, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_non_object() {
        assert!(matches!(
            parse_submit_reply("\"Workflow started\""),
            Err(ClientError::UnexpectedReply(_))
        ));
        assert!(matches!(parse_submit_reply("not json"), Err(ClientError::Parse(_))));
    }
}
