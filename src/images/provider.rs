//! Image provider interface

use async_trait::async_trait;

use super::error::ProxyError;
use super::request::ImageRequest;

/// Where a resolved image came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    Local,
    Remote,
}

/// A resolved image ready to be served
#[derive(Debug, Clone)]
pub struct ImageData {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub source: ImageSource,
}

/// A source of image bytes.
///
/// `Ok(None)` means the provider does not have the image and the next one
/// should be asked. `Err` ends the request.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Try to resolve the image
    async fn try_get(&self, request: &ImageRequest) -> Result<Option<ImageData>, ProxyError>;
}
