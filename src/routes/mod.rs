//! HTTP surface: the relay's `/api/*` endpoints and the dev proxy's routes.

pub mod check_status;
pub mod dev_proxy;
pub mod error;
pub mod health;
pub mod metrics;
pub mod webhook;

use axum::http::{header, HeaderName, Method};
use axum::routing::{get, post};
use axum::Router;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};

use crate::app_state::AppState;

/// Cross-origin policy for the browser front end: any origin may call us.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-requested-with"),
        ])
        .max_age(Duration::from_secs(86400))
}

/// Relay routes: submission and status polling.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/webhook",
            post(webhook::submit)
                .options(error::preflight)
                .fallback(error::method_not_allowed),
        )
        .route(
            "/api/check-status",
            get(check_status::check_status)
                .options(error::preflight)
                .fallback(error::method_not_allowed),
        )
        .route("/health", get(health::health_check))
        .with_state(state)
}

/// Development proxy routes: synchronous pass-through plus status polling.
pub fn dev_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/webhook",
            post(dev_proxy::proxy_webhook)
                .options(error::preflight)
                .fallback(dev_proxy::not_found),
        )
        .route(
            "/check-status",
            get(check_status::check_status)
                .options(error::preflight)
                .fallback(dev_proxy::not_found),
        )
        .fallback(dev_proxy::not_found)
        .with_state(state)
}
