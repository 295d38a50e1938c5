//! Test helper utilities: serve the routers on an ephemeral port against
//! wiremock stand-ins for the workflow webhook and the status sheet.

#![allow(dead_code)]

use axum::Router;
use media_relay::app_state::AppState;
use media_relay::config::AppConfig;
use reqwest::multipart;
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::MockServer;

pub const WORKFLOW_PATH: &str = "/webhook/contenido-ia-veo";
pub const SHEET_ID: &str = "sheet123";
pub const SHEET_PATH: &str = "/spreadsheets/d/sheet123/gviz/tq";

/// Smallest valid PNG (1x1).
pub const PNG_1X1: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0xF8,
    0xCF, 0xC0, 0x00, 0x00, 0x03, 0x01, 0x01, 0x00, 0x18, 0xDD, 0x8D, 0xB0, 0x00, 0x00, 0x00,
    0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

pub fn test_config(workflow_base: &str, sheets_base: &str) -> AppConfig {
    AppConfig {
        bind_addr: "127.0.0.1:0".to_string(),
        workflow_url: format!("{}{}", workflow_base, WORKFLOW_PATH),
        sheet_id: SHEET_ID.to_string(),
        sheet_name: "Hoja 1".to_string(),
        sheets_base_url: sheets_base.to_string(),
        forward_timeout_secs: 5,
        sheet_timeout_secs: 5,
        max_body_bytes: 12 * 1024 * 1024,
    }
}

/// Serve `router` on 127.0.0.1 with an OS-assigned port; returns its base URL.
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("No local address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("Test server error");
    });
    format!("http://{}", addr)
}

/// Relay with CORS, backed by the given mock servers.
pub async fn spawn_relay(workflow: &MockServer, sheets: &MockServer) -> String {
    spawn_relay_with(test_config(&workflow.uri(), &sheets.uri())).await
}

pub async fn spawn_relay_with(config: AppConfig) -> String {
    let state = AppState::from_config(&config, config.forward_timeout())
        .expect("Failed to build state");
    serve(media_relay::routes::api_router(state).layer(media_relay::routes::cors_layer())).await
}

/// Dev proxy with a custom workflow timeout.
pub async fn spawn_dev_proxy(workflow: &MockServer, sheets: &MockServer, timeout: Duration) -> String {
    let config = test_config(&workflow.uri(), &sheets.uri());
    let state = AppState::from_config(&config, timeout).expect("Failed to build state");
    serve(media_relay::routes::dev_router(state).layer(media_relay::routes::cors_layer())).await
}

/// A base URL nothing is listening on.
pub async fn unreachable_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("No local address");
    drop(listener);
    format!("http://{}", addr)
}

/// The form the browser front end sends.
pub fn submission_form() -> multipart::Form {
    multipart::Form::new()
        .text("Descripcion de producto", "Red sneakers on a beach")
        .part(
            "Imagen",
            multipart::Part::bytes(PNG_1X1.to_vec())
                .file_name("shoe.png")
                .mime_str("image/png")
                .expect("valid mime"),
        )
}

/// Wrap a gviz table the way the public query endpoint does.
pub fn gviz_envelope(rows: Value) -> String {
    let payload = json!({
        "version": "0.6",
        "reqId": "0",
        "status": "ok",
        "sig": "123456",
        "table": {
            "cols": [
                {"id": "A", "label": "id", "type": "string"},
                {"id": "B", "label": "estado", "type": "string"}
            ],
            "rows": rows,
            "parsedNumHeaders": 1
        }
    });
    format!(
        "/*O_o*/\ngoogle.visualization.Query.setResponse({});",
        payload
    )
}

/// A status row: id, status, image label, image link, video label, video link.
pub fn status_row(id: &str, status: &str) -> Value {
    json!({"c": [
        {"v": id},
        {"v": status},
        {"v": format!("{id}.png")},
        {"v": format!("https://drive.google.com/uc?id={id}-img")},
        {"v": format!("{id}.mp4")},
        {"v": format!("https://drive.google.com/uc?id={id}-vid")}
    ]})
}

/// Pull the injected `request_id` value out of a relayed multipart body.
pub fn request_id_in(body: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(body);
    let marker = "name=\"request_id\"\r\n\r\n";
    let start = text.find(marker)? + marker.len();
    let end = text[start..].find("\r\n")? + start;
    Some(text[start..end].to_string())
}
