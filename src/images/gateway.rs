//! Image resolution gateway
//!
//! Runs validated requests through an ordered list of providers. The first
//! provider that returns an image wins; an error from any provider ends the
//! request without consulting the rest.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use super::error::ProxyError;
use super::local::LocalProvider;
use super::provider::{ImageData, ImageProvider};
use super::remote::RemoteProvider;
use super::request::ImageRequest;
use crate::config::Config;

/// Ordered chain of image providers
#[derive(Clone)]
pub struct ImageGateway {
    providers: Vec<Arc<dyn ImageProvider>>,
}

impl ImageGateway {
    /// Build a gateway from an explicit provider list, tried in order
    pub fn new(providers: Vec<Arc<dyn ImageProvider>>) -> Self {
        Self { providers }
    }

    /// Build the standard chain: local disk (if configured), then origin
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.upstream_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        let mut providers: Vec<Arc<dyn ImageProvider>> = Vec::new();
        if let Some(dir) = &config.upload_dir {
            providers.push(Arc::new(LocalProvider::new(dir.clone())));
        }
        providers.push(Arc::new(RemoteProvider::new(client, config.api_origin())));

        Ok(Self::new(providers))
    }

    /// Names of the configured providers, in priority order
    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Resolve a raw `path` query value into image bytes
    pub async fn resolve(&self, path: Option<&str>) -> Result<ImageData, ProxyError> {
        let request = ImageRequest::parse(path)?;

        for provider in &self.providers {
            if let Some(image) = provider.try_get(&request).await? {
                debug!(
                    "Resolved {} via {} provider",
                    request.filename(),
                    provider.name()
                );
                return Ok(image);
            }
        }

        Err(ProxyError::NotFound)
    }
}
