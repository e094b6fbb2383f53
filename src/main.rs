//! route-guards demo server
//!
//! Serves a small axum application whose routes are protected by guards.

mod routes;

use clap::Parser;
use route_guards::config::{AppConfig, LogFormat, load_config};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Route guards demo server
#[derive(Parser, Debug)]
#[command(name = "route-guards")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "ROUTE_GUARDS_CONFIG")]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "ROUTE_GUARDS_LOG_LEVEL")]
    log_level: Option<String>,

    /// Server host (overrides server.host)
    #[arg(long, env = "ROUTE_GUARDS_HOST")]
    host: Option<String>,

    /// Server port (overrides server.port)
    #[arg(long, env = "ROUTE_GUARDS_PORT")]
    port: Option<u16>,
}

fn init_logging(config: &AppConfig, level_override: Option<&str>) {
    let level = level_override.unwrap_or(&config.logging.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let json = config.logging.format == LogFormat::Json;

    tracing_subscriber::registry()
        .with(json.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| fmt::layer().with_writer(std::io::stderr)))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Pick up a local .env before anything reads the environment
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration
    let mut config = load_config(args.config.as_deref())?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    init_logging(&config, args.log_level.as_deref());

    info!(
        version = env!("CARGO_PKG_VERSION"),
        matching = %config.guards.matching,
        "Starting route-guards demo server"
    );

    // Build the guard hook
    let hook = Arc::new(routes::guard_hook(&config.guards));
    if config.guards.preload {
        let guards = hook
            .preload()
            .await
            .inspect_err(|e| error!(error = %e, "Failed to load guards"))?;
        info!(guards, "Guards preloaded");
    }

    let app = routes::router(hook).layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));

    let listener = TcpListener::bind(config.server.bind_addr()).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Received shutdown signal");
            }
        })
        .await?;

    Ok(())
}
