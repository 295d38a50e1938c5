//! Development proxy
//!
//! Stands in for the deployed relay on localhost. Instead of tagging the
//! submission and returning immediately, it forwards the body untouched and
//! keeps the connection open until the workflow answers (up to
//! `DEV_PROXY_TIMEOUT_SECS`, five minutes by default). A CDN timeout (524)
//! is reported as a 504 `timeout` error and not retried.
//!
//! Usage:
//!   cargo run --bin dev-proxy
//!
//! Then point the client at it:
//!   CLIENT_RELAY_URL=http://localhost:3001 CLIENT_SUBMIT_PATH=/webhook \
//!   CLIENT_STATUS_PATH=/check-status cargo run --bin media-client -- ...

use media_relay::app_state::AppState;
use media_relay::config::{AppConfig, DevProxyConfig};
use media_relay::routes;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    let config = AppConfig::from_env().expect("Failed to load configuration");
    let proxy = DevProxyConfig::from_env().expect("Failed to load DEV_PROXY_* configuration");

    let state = AppState::from_config(&config, proxy.timeout())
        .expect("Failed to initialize upstream clients");

    let app = routes::dev_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(routes::cors_layer());

    let listener = tokio::net::TcpListener::bind(&proxy.addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!(
        addr = %proxy.addr,
        workflow_url = %config.workflow_url,
        timeout_secs = proxy.timeout_secs,
        "Dev proxy running; use http://{}/webhook from the front end",
        proxy.addr
    );

    axum::serve(listener, app)
        .await
        .expect("Server error");
}
