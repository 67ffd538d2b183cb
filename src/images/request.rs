//! Image request validation
//!
//! A servable path looks like `/uploads/<filename>` where `<filename>` is a
//! bare name: no separators, no parent references. Anything else is rejected
//! before any provider is consulted.

use super::error::ProxyError;

/// Logical URL prefix under which uploaded images are addressed
pub const UPLOAD_NAMESPACE: &str = "/uploads/";

/// A validated image request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    requested_path: String,
    filename: String,
}

impl ImageRequest {
    /// Validate a raw `path` query value.
    pub fn parse(path: Option<&str>) -> Result<Self, ProxyError> {
        let path = path.ok_or(ProxyError::InvalidPath)?;
        let filename = path
            .strip_prefix(UPLOAD_NAMESPACE)
            .ok_or(ProxyError::InvalidPath)?;

        if filename.is_empty() || filename.contains("..") || filename.contains('/') {
            return Err(ProxyError::InvalidPath);
        }

        Ok(Self {
            requested_path: path.to_string(),
            filename: filename.to_string(),
        })
    }

    /// Original path, namespace included
    pub fn requested_path(&self) -> &str {
        &self.requested_path
    }

    /// Bare filename inside the upload directory
    pub fn filename(&self) -> &str {
        &self.filename
    }
}
