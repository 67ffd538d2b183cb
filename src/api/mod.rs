//! HTTP API module - proxy endpoint and service endpoints

mod images;

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::images::ImageGateway;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub gateway: Arc<ImageGateway>,
}

/// Build the API router
pub fn router(config: Arc<Config>, gateway: Arc<ImageGateway>) -> Router {
    let mounts = config.mounts.clone();
    let state = AppState { config, gateway };

    Router::new()
        .route("/health", get(health_check))
        .route("/", get(root))
        .merge(images::router(&mounts))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

/// Root endpoint
async fn root() -> impl IntoResponse {
    Json(RootResponse {
        name: "imgproxyd",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
struct RootResponse {
    name: &'static str,
    version: &'static str,
}

/// Health check endpoint
///
/// A missing upload directory is reported but not fatal: the origin
/// fallback still serves every image.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let upload_dir = match &state.config.upload_dir {
        None => "disabled",
        Some(dir) => match tokio::fs::metadata(dir).await {
            Ok(meta) if meta.is_dir() => "ok",
            _ => "missing",
        },
    };

    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy",
            upload_dir,
        }),
    )
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    upload_dir: &'static str,
}
