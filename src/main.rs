//! origin-proxy
//!
//! A reverse HTTP proxy built with Tokio and Axum. Requests arriving on the
//! listener are matched against configured path prefixes and transparently
//! fulfilled by the routed origin server.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌──────────────────────────────────────────────┐
//!                       │                 ORIGIN PROXY                  │
//!                       │                                               │
//!   Client Request      │  ┌────────┐   ┌─────────┐   ┌─────────────┐  │
//!   ────────────────────┼─▶│  http  │──▶│ routing │──▶│ URL resolve │  │
//!                       │  │ server │   │  table  │   │ + header    │  │
//!                       │  └────────┘   └─────────┘   │  translate  │  │
//!                       │                             └──────┬──────┘  │
//!                       │                                    ▼         │
//!   Client Response     │  ┌──────────┐              ┌─────────────┐   │
//!   ◀───────────────────┼──│ response │◀─────────────│  upstream   │◀──┼── Origin
//!                       │  │ rewriter │              │   client    │   │   Server
//!                       │  └──────────┘              └─────────────┘   │
//!                       │                                               │
//!                       │  config · observability (tracing, metrics)   │
//!                       └──────────────────────────────────────────────┘
//! ```

// Core subsystems
pub mod config;
pub mod http;
pub mod proxy;
pub mod routing;
pub mod upstream;

// Cross-cutting concerns
pub mod observability;

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::load_config;
use crate::http::HttpServer;

#[derive(Debug, Parser)]
#[command(name = "origin-proxy", about = "Reverse proxy masking origin servers")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "origin-proxy.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = load_config(&args.config)?;

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("origin_proxy={},tower_http=warn", config.observability.log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("origin-proxy v0.1.0 starting");

    tracing::info!(
        bind_address = %config.listener.bind_address,
        routes = config.routes.len(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(
        address = %local_addr,
        "Listening for connections"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            crate::observability::metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let server = HttpServer::new(config);
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
