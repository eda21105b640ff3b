//! Donghua catalog API gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌────────────────────────────────────────────────┐
//!                         │                    GATEWAY                     │
//!                         │                                                │
//!   Browser request       │  ┌─────────┐   ┌───────────┐   ┌───────────┐   │
//!   /api/donghua/*  ──────┼─▶│  http   │──▶│  routing  │──▶│  gateway  │───┼──▶ Upstream API
//!                         │  │ server  │   │ allow-list│   │ + API key │   │    (X-API-Key)
//!                         │  └─────────┘   └───────────┘   └─────┬─────┘   │
//!                         │                                      │         │
//!   status + JSON   ◀─────┼──────────────────────────────────────┘         │
//!                         │                                                │
//!                         │  config (toml + env, reload)  observability    │
//!                         │  lifecycle (signals)          security headers │
//!                         └────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use donghua_gateway::config::watcher::ConfigWatcher;
use donghua_gateway::config::{load_config, load_from_env};
use donghua_gateway::lifecycle::signals::shutdown_on_signal;
use donghua_gateway::observability::{logging, metrics};
use donghua_gateway::{net, HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "donghua-gateway", version)]
#[command(about = "API gateway for the donghua catalog front end", long_about = None)]
struct Cli {
    /// TOML configuration file. Without it, configuration comes from the environment.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Reload the configuration file when it changes.
    #[arg(long, requires = "config")]
    watch: bool,

    /// Validate the configuration and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => load_config(path),
        None => load_from_env(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            eprintln!("donghua-gateway: {e}");
            std::process::exit(2);
        }
    };

    if cli.check {
        println!("configuration OK");
        return Ok(());
    }

    logging::init_tracing(&config.observability);

    tracing::info!("donghua-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        tls = config.listener.tls.is_some(),
        prefix = %config.route.prefix,
        allowed_prefixes = ?config.route.allowed_prefixes,
        upstream_timeout_secs = config.upstream.timeout_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics exporter");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // The watcher must outlive the server.
    let (config_updates, _watcher) = match (&cli.config, cli.watch) {
        (Some(path), true) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            (updates, Some(watcher.run()?))
        }
        _ => {
            let (_, updates) = mpsc::unbounded_channel();
            (updates, None)
        }
    };

    let server = HttpServer::new(config.clone())?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        shutdown_on_signal(&signal_shutdown).await;
    });

    match &config.listener.tls {
        Some(tls) => {
            let rustls = net::tls::from_config(tls).await?;
            let addr: SocketAddr = config.listener.bind_address.parse()?;
            server
                .run_tls(addr, rustls, config_updates, server_shutdown)
                .await?;
        }
        None => {
            let listener = TcpListener::bind(&config.listener.bind_address).await?;
            server.run(listener, config_updates, server_shutdown).await?;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
