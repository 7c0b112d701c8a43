//! HTTP service with server request observation.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ TraceLayer ─▶ TimeoutLayer ─▶ observe_exchange ─▶ handler
//!                                                        │
//!                                                        ▼
//!                                          ObservationConvention (tags)
//!                                                        │
//!                                                        ▼
//!                                          MetricsRecorder ─▶ Prometheus
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use http_observation::config::resolve_config;
use http_observation::observability::{logging, metrics};
use http_observation::HttpServer;

#[derive(Parser, Debug)]
#[command(name = "http-observation")]
#[command(about = "HTTP service instrumented with server request observations", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = resolve_config(cli.config.as_deref(), cli.bind)?;

    logging::init_logging(&config.observability)?;

    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_ms = config.timeouts.request_ms,
        observation = %config.observability.observation_name,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => {
                if metrics::init_metrics(addr) {
                    metrics::describe_observation(&config.observability.observation_name);
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(config);
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
