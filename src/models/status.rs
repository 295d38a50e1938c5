use serde::{Deserialize, Serialize};

/// Status reported to the poller.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Pending,
    Completed,
}

/// Links and labels for the generated media, copied from the status row.
///
/// Field names follow the workflow's sheet: `file_*` is the generated image,
/// `video_*` the generated video.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResultData {
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub file_url: String,
    #[serde(default)]
    pub video_name: String,
    #[serde(default)]
    pub video_url: String,
}

/// Response for `GET /api/check-status?id=...`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub found: bool,
    pub status: CheckStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ResultData>,
}

impl StatusResponse {
    /// No row for the id yet (or nothing parseable to look in).
    pub fn not_found() -> Self {
        Self {
            found: false,
            status: CheckStatus::Pending,
            message: Some("Processing...".to_string()),
            data: None,
        }
    }

    /// Row exists but the workflow has not marked it completed.
    pub fn in_progress() -> Self {
        Self {
            found: true,
            status: CheckStatus::Pending,
            message: Some("Still processing...".to_string()),
            data: None,
        }
    }

    pub fn completed(data: ResultData) -> Self {
        Self {
            found: true,
            status: CheckStatus::Completed,
            message: None,
            data: Some(data),
        }
    }

    /// Terminal for a poller: completed with a result payload attached.
    pub fn completed_data(&self) -> Option<&ResultData> {
        match self.status {
            CheckStatus::Completed => self.data.as_ref(),
            CheckStatus::Pending => None,
        }
    }
}

/// Query string for the status endpoint.
#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub id: Option<String>,
}
