use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::{
    sheets::{SheetsClient, SheetsError},
    workflow::{WorkflowClient, WorkflowError},
};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub workflow: Arc<WorkflowClient>,
    pub sheets: Arc<SheetsClient>,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(workflow: WorkflowClient, sheets: SheetsClient, max_body_bytes: usize) -> Self {
        Self {
            workflow: Arc::new(workflow),
            sheets: Arc::new(sheets),
            max_body_bytes,
        }
    }

    /// Build the upstream clients from configuration. `workflow_timeout` is
    /// the relay's forward timeout, or the dev proxy's much longer one.
    pub fn from_config(
        config: &AppConfig,
        workflow_timeout: std::time::Duration,
    ) -> Result<Self, StateError> {
        let workflow = WorkflowClient::new(&config.workflow_url, workflow_timeout)?;
        let sheets = SheetsClient::new(
            &config.sheets_base_url,
            &config.sheet_id,
            &config.sheet_name,
            config.sheet_timeout(),
        )?;
        Ok(Self::new(workflow, sheets, config.max_body_bytes))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("Failed to build workflow client: {0}")]
    Workflow(#[from] WorkflowError),

    #[error("Failed to build sheets client: {0}")]
    Sheets(#[from] SheetsError),
}
