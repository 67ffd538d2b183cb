//! Local filesystem provider
//!
//! Serves files that live directly inside the upload directory. Used when
//! the web tier shares a host with the upload storage.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, warn};

use super::error::ProxyError;
use super::mime::mime_for;
use super::provider::{ImageData, ImageProvider, ImageSource};
use super::request::ImageRequest;

/// Reads images from a mounted upload directory
#[derive(Debug, Clone)]
pub struct LocalProvider {
    root: PathBuf,
}

impl LocalProvider {
    /// Create a provider rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Join `filename` onto the root. `None` when the name refers to the
    /// root itself; `PathEscape` when the result leaves the root.
    fn resolve(&self, filename: &str) -> Result<Option<PathBuf>, ProxyError> {
        let target = self.root.join(filename);
        let relative = target
            .strip_prefix(&self.root)
            .map_err(|_| ProxyError::PathEscape)?;

        if is_root_itself(relative) {
            return Ok(None);
        }
        if !is_single_child(relative) {
            return Err(ProxyError::PathEscape);
        }
        Ok(Some(target))
    }

    /// Follow symlinks and check the real file still lives under the root.
    ///
    /// `Ok(false)` when either path cannot be canonicalized; the caller
    /// falls through to the next provider.
    async fn check_canonical(&self, target: &Path) -> Result<bool, ProxyError> {
        let (root, real) = match tokio::join!(
            tokio::fs::canonicalize(&self.root),
            tokio::fs::canonicalize(target)
        ) {
            (Ok(root), Ok(real)) => (root, real),
            (Err(e), _) | (_, Err(e)) => {
                if e.kind() != ErrorKind::NotFound {
                    warn!("Unexpected error resolving {}: {}", target.display(), e);
                }
                return Ok(false);
            }
        };

        match real.strip_prefix(&root) {
            Ok(relative) if is_single_child(relative) => Ok(true),
            _ => Err(ProxyError::PathEscape),
        }
    }
}

/// Empty or `.`: the upload directory itself
fn is_root_itself(relative: &Path) -> bool {
    relative
        .components()
        .all(|component| component == Component::CurDir)
}

/// Exactly one normal component: a bare name directly under the root
fn is_single_child(relative: &Path) -> bool {
    let mut components = relative.components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

#[async_trait]
impl ImageProvider for LocalProvider {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn try_get(&self, request: &ImageRequest) -> Result<Option<ImageData>, ProxyError> {
        let Some(target) = self.resolve(request.filename())? else {
            return Ok(None);
        };

        let metadata = match tokio::fs::metadata(&target).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                warn!("Unexpected error reading {}: {}", target.display(), e);
                return Ok(None);
            }
        };

        if !metadata.is_file() {
            return Ok(None);
        }

        if !self.check_canonical(&target).await? {
            return Ok(None);
        }

        let bytes = match tokio::fs::read(&target).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                warn!("Unexpected error reading {}: {}", target.display(), e);
                return Ok(None);
            }
        };

        debug!(
            "Serving {} from disk ({} bytes)",
            request.filename(),
            bytes.len()
        );

        Ok(Some(ImageData {
            bytes,
            content_type: mime_for(request.filename()).to_string(),
            source: ImageSource::Local,
        }))
    }
}
