//! Common test utilities - ProxyTest harness and a mock API origin

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use imgproxyd::{Config, Server};
use reqwest::Client;
use tokio::task::JoinHandle;

/// Find a random available port
pub fn free_addr() -> Result<SocketAddr> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(addr)
}

/// Test harness that spawns a real imgproxyd server on a random port
pub struct ProxyTest {
    pub addr: SocketAddr,
    pub client: Client,
    server: Arc<Server>,
    _handle: JoinHandle<()>,
}

impl ProxyTest {
    /// Start a server with the given configuration (bind address is replaced)
    pub async fn start(config: Config) -> Result<Self> {
        let addr = free_addr()?;
        let config = Config {
            bind_addr: addr,
            ..config
        }
        .validated()?;

        let server = Arc::new(Server::new(config)?);
        let server_clone = server.clone();

        // Spawn the server in a background task
        let handle = tokio::spawn(async move {
            if let Err(e) = server_clone.run().await {
                eprintln!("Server error: {}", e);
            }
        });

        let client = Client::builder().timeout(Duration::from_secs(5)).build()?;

        // Poll until server is ready (max 2 seconds)
        let mut ready = false;
        for _ in 0..20 {
            tokio::time::sleep(Duration::from_millis(100)).await;
            if client
                .get(format!("http://{}/health", addr))
                .send()
                .await
                .is_ok()
            {
                ready = true;
                break;
            }
        }

        if !ready {
            panic!("Server failed to start within 2 seconds");
        }

        Ok(Self {
            addr,
            client,
            server,
            _handle: handle,
        })
    }

    /// Get the base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .get(format!("{}{}", self.base_url(), path))
            .send()
            .await?)
    }

    /// Request an image through the root mount
    pub async fn proxy(&self, path: &str) -> Result<reqwest::Response> {
        self.proxy_at("", path).await
    }

    /// Request an image through a specific mount
    pub async fn proxy_at(&self, mount: &str, path: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .get(format!(
                "{}{}/api/proxy-image?path={}",
                self.base_url(),
                mount,
                path
            ))
            .send()
            .await?)
    }
}

impl Drop for ProxyTest {
    fn drop(&mut self) {
        self.server.shutdown();
    }
}

/// Canned response served by the mock origin
#[derive(Clone)]
pub struct OriginReply {
    pub status: StatusCode,
    pub content_type: Option<&'static str>,
    pub body: Vec<u8>,
    pub delay: Duration,
}

impl OriginReply {
    pub fn image(content_type: &'static str, body: &[u8]) -> Self {
        Self {
            status: StatusCode::OK,
            content_type: Some(content_type),
            body: body.to_vec(),
            delay: Duration::ZERO,
        }
    }

    pub fn status(status: StatusCode) -> Self {
        Self {
            status,
            content_type: None,
            body: b"upstream error page".to_vec(),
            delay: Duration::ZERO,
        }
    }

    /// Delay the reply
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// A seen upstream request
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub path: String,
    pub accept: Option<String>,
}

#[derive(Clone)]
struct OriginState {
    reply: OriginReply,
    hits: Arc<AtomicUsize>,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

/// Mock API origin answering every request with the same reply
pub struct MockOrigin {
    pub addr: SocketAddr,
    hits: Arc<AtomicUsize>,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
    _handle: JoinHandle<()>,
}

impl MockOrigin {
    pub async fn start(reply: OriginReply) -> Result<Self> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let hits = Arc::new(AtomicUsize::new(0));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let state = OriginState {
            reply,
            hits: hits.clone(),
            seen: seen.clone(),
        };

        let app = Router::new().fallback(serve_reply).with_state(state);
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Ok(Self {
            addr,
            hits,
            seen,
            _handle: handle,
        })
    }

    /// API base URL as the frontends configure it
    pub fn api_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }
}

async fn serve_reply(State(state): State<OriginState>, request: Request) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    state.seen.lock().unwrap().push(SeenRequest {
        path: request.uri().path().to_string(),
        accept: request
            .headers()
            .get(header::ACCEPT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    });

    let reply = state.reply;
    tokio::time::sleep(reply.delay).await;
    match reply.content_type {
        Some(content_type) => (
            reply.status,
            [(header::CONTENT_TYPE, content_type)],
            reply.body,
        )
            .into_response(),
        None => (reply.status, Body::from(reply.body)).into_response(),
    }
}

/// API base URL pointing at a port nothing listens on
pub fn refused_api_url() -> Result<String> {
    Ok(format!("http://{}/api", free_addr()?))
}
