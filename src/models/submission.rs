use serde::{Deserialize, Serialize};

/// Response after the relay hands a submission to the workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub id: String,
    pub status: String,
    pub message: String,
}

impl SubmitResponse {
    pub fn processing(id: String) -> Self {
        Self {
            success: true,
            id,
            status: "processing".to_string(),
            message: "Request received. Content is being generated...".to_string(),
        }
    }
}

/// JSON error body shared by every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
