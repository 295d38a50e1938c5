use serde::Deserialize;
use std::time::Duration;

/// Relay server configuration, read from the environment (and `.env`).
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server bind address (e.g., "0.0.0.0:3000").
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// n8n webhook that starts the media generation workflow
    pub workflow_url: String,

    /// Spreadsheet the workflow appends status rows to
    pub sheet_id: String,

    /// Sheet (tab) name inside the spreadsheet
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,

    /// Origin serving the gviz query endpoint
    #[serde(default = "default_sheets_base_url")]
    pub sheets_base_url: String,

    /// Timeout for handing a submission to the workflow, in seconds
    #[serde(default = "default_forward_timeout_secs")]
    pub forward_timeout_secs: u64,

    /// Timeout for one sheet fetch, in seconds
    #[serde(default = "default_sheet_timeout_secs")]
    pub sheet_timeout_secs: u64,

    /// Largest request body the relay will buffer
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_sheet_name() -> String {
    "Hoja 1".to_string()
}

fn default_sheets_base_url() -> String {
    "https://docs.google.com".to_string()
}

fn default_forward_timeout_secs() -> u64 {
    60
}

fn default_sheet_timeout_secs() -> u64 {
    20
}

fn default_max_body_bytes() -> usize {
    12 * 1024 * 1024
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    pub fn forward_timeout(&self) -> Duration {
        Duration::from_secs(self.forward_timeout_secs)
    }

    pub fn sheet_timeout(&self) -> Duration {
        Duration::from_secs(self.sheet_timeout_secs)
    }
}

/// Local development proxy settings (`DEV_PROXY_*`). Upstream settings are
/// shared with [`AppConfig`].
#[derive(Debug, Clone, Deserialize)]
pub struct DevProxyConfig {
    #[serde(default = "default_dev_proxy_addr")]
    pub addr: String,

    /// How long to hold the connection open waiting for the workflow
    #[serde(default = "default_dev_proxy_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_dev_proxy_addr() -> String {
    "127.0.0.1:3001".to_string()
}

fn default_dev_proxy_timeout_secs() -> u64 {
    300
}

impl DevProxyConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::prefixed("DEV_PROXY_").from_env()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Submitting client settings (`CLIENT_*`).
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the relay (or the dev proxy)
    #[serde(default = "default_relay_url")]
    pub relay_url: String,

    #[serde(default = "default_submit_path")]
    pub submit_path: String,

    #[serde(default = "default_status_path")]
    pub status_path: String,

    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Give up polling after this many seconds
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,

    /// Timeout for the submit request itself
    #[serde(default = "default_submit_timeout_secs")]
    pub submit_timeout_secs: u64,
}

fn default_relay_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_submit_path() -> String {
    "/api/webhook".to_string()
}

fn default_status_path() -> String {
    "/api/check-status".to_string()
}

fn default_poll_interval_secs() -> u64 {
    10
}

fn default_poll_timeout_secs() -> u64 {
    300
}

fn default_submit_timeout_secs() -> u64 {
    330
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::prefixed("CLIENT_").from_env()
    }

    pub fn submit_url(&self) -> String {
        join_url(&self.relay_url, &self.submit_path)
    }

    pub fn status_url(&self) -> String {
        join_url(&self.relay_url, &self.status_path)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_secs)
    }

    pub fn submit_timeout(&self) -> Duration {
        Duration::from_secs(self.submit_timeout_secs)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
