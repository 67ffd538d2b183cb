//! Image resolution module
//!
//! Provides:
//! - Request validation for the `/uploads/` namespace
//! - Local disk and remote origin providers
//! - The gateway that chains them

mod error;
mod gateway;
mod local;
mod mime;
mod provider;
mod remote;
mod request;

pub use error::{ErrorResponse, ProxyError};
pub use gateway::ImageGateway;
pub use local::LocalProvider;
pub use mime::{mime_for, DEFAULT_MIME};
pub use provider::{ImageData, ImageProvider, ImageSource};
pub use remote::RemoteProvider;
pub use request::{ImageRequest, UPLOAD_NAMESPACE};

/// Cache directive for every served image; published paths never change
pub const IMMUTABLE_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";
