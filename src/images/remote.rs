//! Remote origin provider
//!
//! Forwards the original request path to the API origin and buffers the
//! response. Always the last provider: it never declines.

use async_trait::async_trait;
use reqwest::{header, Client};
use tracing::{debug, error};

use super::error::ProxyError;
use super::mime::mime_for;
use super::provider::{ImageData, ImageProvider, ImageSource};
use super::request::ImageRequest;

/// Fetches images from the API origin over HTTP
#[derive(Debug, Clone)]
pub struct RemoteProvider {
    client: Client,
    origin: String,
}

impl RemoteProvider {
    /// Create a provider for `origin` (scheme and authority, no trailing slash)
    pub fn new(client: Client, origin: impl Into<String>) -> Self {
        Self {
            client,
            origin: origin.into(),
        }
    }

    /// Full upstream URL for a request
    pub fn target_url(&self, request: &ImageRequest) -> String {
        format!("{}{}", self.origin, request.requested_path())
    }
}

#[async_trait]
impl ImageProvider for RemoteProvider {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn try_get(&self, request: &ImageRequest) -> Result<Option<ImageData>, ProxyError> {
        let url = self.target_url(request);
        debug!("Fetching image from origin: {}", url);

        let response = self
            .client
            .get(&url)
            .header(header::ACCEPT, "image/*")
            .send()
            .await
            .map_err(|e| {
                error!("Image fetch from {} failed: {}", url, e);
                ProxyError::Network(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            debug!("Origin answered {} for {}", status, url);
            return Err(ProxyError::Upstream(status));
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| mime_for(request.filename()))
            .to_string();

        let bytes = response.bytes().await.map_err(|e| {
            error!("Reading image body from {} failed: {}", url, e);
            ProxyError::Network(e)
        })?;

        Ok(Some(ImageData {
            bytes: bytes.to_vec(),
            content_type,
            source: ImageSource::Remote,
        }))
    }
}
