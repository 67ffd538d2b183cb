//! Server configuration
//!
//! Resolved once at startup from, in increasing priority: built-in
//! defaults, an optional TOML file, `IMGPROXY_*` environment variables,
//! and command-line overrides.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "IMGPROXY_";

/// API base used when none is configured
pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] figment::Error),

    #[error("invalid mount prefix '{0}'")]
    InvalidMount(String),

    #[error("api_url must be an http(s) URL, got '{0}'")]
    InvalidApiUrl(String),
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Listen address
    pub bind_addr: SocketAddr,
    /// Upload directory; enables the local disk provider when set
    pub upload_dir: Option<PathBuf>,
    /// API base URL; the origin is derived by dropping a trailing `/api`
    pub api_url: String,
    /// Route prefixes the proxy endpoint is mounted under. Accepts a list
    /// or a single comma-separated string (`IMGPROXY_MOUNTS=/,/dashboard`).
    #[serde(deserialize_with = "deserialize_mounts")]
    pub mounts: Vec<String>,
    /// Upstream request timeout (none = client default)
    pub upstream_timeout_secs: Option<u64>,
    /// Emit JSON log lines
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3001)),
            upload_dir: None,
            api_url: DEFAULT_API_URL.to_string(),
            mounts: vec![String::new()],
            upstream_timeout_secs: None,
            log_json: false,
        }
    }
}

/// Command-line overrides, merged last. Unset fields leave lower layers alone.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind_addr: Option<SocketAddr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mounts: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_json: Option<bool>,
}

impl Config {
    /// Load configuration from all layers and validate it
    pub fn load(file: Option<&Path>, overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(file) = file {
            figment = figment.merge(Toml::file(file));
        }
        figment = figment
            .merge(Env::prefixed(ENV_PREFIX))
            .merge(Serialized::defaults(overrides));

        let config: Config = figment.extract()?;
        config.validated()
    }

    /// Normalize fields and reject unusable values
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        if self
            .upload_dir
            .as_ref()
            .is_some_and(|dir| dir.as_os_str().is_empty())
        {
            self.upload_dir = None;
        }

        let api_url = self.api_url.trim();
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(ConfigError::InvalidApiUrl(self.api_url));
        }
        self.api_url = api_url.to_string();

        let mut mounts: Vec<String> = Vec::new();
        for mount in &self.mounts {
            let mount = normalize_mount(mount)?;
            if !mounts.contains(&mount) {
                mounts.push(mount);
            }
        }
        if mounts.is_empty() {
            mounts.push(String::new());
        }
        self.mounts = mounts;

        Ok(self)
    }

    /// Origin base for remote fetches: `api_url` without a trailing `/api`
    pub fn api_origin(&self) -> String {
        let base = self.api_url.trim_end_matches('/');
        let base = base.strip_suffix("/api").unwrap_or(base);
        base.trim_end_matches('/').to_string()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Mounts {
    List(Vec<String>),
    Joined(String),
}

fn deserialize_mounts<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Mounts::deserialize(deserializer)? {
        Mounts::List(mounts) => mounts,
        Mounts::Joined(joined) => joined.split(',').map(str::to_string).collect(),
    })
}

/// `"dashboard/"` -> `"/dashboard"`, `"/"` -> `""`
fn normalize_mount(mount: &str) -> Result<String, ConfigError> {
    let trimmed = mount.trim().trim_matches('/');
    if trimmed
        .chars()
        .any(|c| matches!(c, '?' | '#' | '{' | '}' | '*') || c.is_whitespace())
    {
        return Err(ConfigError::InvalidMount(mount.to_string()));
    }
    if trimmed.is_empty() {
        Ok(String::new())
    } else {
        Ok(format!("/{}", trimmed))
    }
}
