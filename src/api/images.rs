//! Image proxy endpoint
//!
//! GET {mount}/api/proxy-image?path=/uploads/{filename}

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

use super::AppState;
use crate::images::IMMUTABLE_CACHE_CONTROL;

/// Build the images router, one route per mount prefix
pub fn router(mounts: &[String]) -> Router<AppState> {
    mounts.iter().fold(Router::new(), |router, mount| {
        router.route(&format!("{}/api/proxy-image", mount), get(proxy_image))
    })
}

/// First `path` value in the query; repeated keys are ignored after it
fn first_path(pairs: &[(String, String)]) -> Option<&str> {
    pairs
        .iter()
        .find(|(key, _)| key == "path")
        .map(|(_, value)| value.as_str())
}

/// Serve an image from disk or the API origin
async fn proxy_image(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response {
    match state.gateway.resolve(first_path(&pairs)).await {
        Ok(image) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, image.content_type),
                (header::CACHE_CONTROL, IMMUTABLE_CACHE_CONTROL.to_string()),
            ],
            image.bytes,
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}
