//! imgproxyd - same-origin image proxy daemon

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use imgproxyd::{Config, ConfigOverrides, Server};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Same-origin image proxy for the storefront and dashboard
#[derive(Parser, Debug)]
#[command(name = "imgproxyd", version, about)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "IMGPROXY_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(short, long)]
    bind: Option<SocketAddr>,

    /// Upload directory to serve from before asking the origin
    #[arg(long)]
    upload_dir: Option<PathBuf>,

    /// API base URL (a trailing /api is stripped to get the origin)
    #[arg(long)]
    api_url: Option<String>,

    /// Route prefix for the proxy endpoint (repeatable)
    #[arg(long = "mount")]
    mounts: Vec<String>,

    /// Emit JSON log lines
    #[arg(long)]
    log_json: bool,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            bind_addr: self.bind,
            upload_dir: self.upload_dir.clone(),
            api_url: self.api_url.clone(),
            mounts: self.mounts.clone(),
            log_json: self.log_json.then_some(true),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load(args.config.as_deref(), args.overrides())?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "imgproxyd=info,tower_http=debug".into());
    if config.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    let server = Arc::new(Server::new(config)?);

    let signal_server = server.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received interrupt, shutting down");
            signal_server.shutdown();
        }
    });

    server.run().await?;

    Ok(())
}
