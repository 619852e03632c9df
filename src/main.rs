// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/smartmine

//! SmartMine - Mining Operations Digital Twin
//!
//! Runs the site simulation headless, streams one JSON snapshot per tick over
//! WebSocket and accepts operator commands on stdin.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use smartmine::{
    control::run_console, Config, ProfileScorer, ReferenceDataset, Simulator, WebSocketServer,
    VERSION,
};

/// SmartMine - Mining Operations Digital Twin
#[derive(Parser, Debug)]
#[command(name = "smartmine")]
#[command(author = "SmartMine Project")]
#[command(version = VERSION)]
#[command(about = "Synthetic mining site simulator with real-time snapshot streaming")]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable trace-level logging
    #[arg(long)]
    trace: bool,

    /// WebSocket server port
    #[arg(long)]
    ws_port: Option<u16>,

    /// Reference dataset (CSV)
    #[arg(long)]
    dataset: Option<PathBuf>,

    /// Initial speed multiplier
    #[arg(long)]
    speed: Option<f64>,

    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Do not read commands from stdin
    #[arg(long)]
    no_console: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Load or create configuration
    let config_path = args.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load_or_create(&config_path)?;

    // Initialize logging
    let directive = config.log_directive(args.debug, args.trace);
    let filter = EnvFilter::try_new(directive)
        .with_context(|| format!("invalid log_level {:?}", directive))?;

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(args.debug)
        .with_line_number(args.debug)
        .with_ansi(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("⛏️  SmartMine v{} - Mining Operations Digital Twin", VERSION);

    // Override with command line args
    if let Some(port) = args.ws_port {
        config.streaming.websocket_port = port;
    }
    if let Some(path) = args.dataset.clone() {
        config.dataset.path = path;
    }
    if let Some(speed) = args.speed {
        config.simulation.speed_multiplier = speed;
    }
    if args.seed.is_some() {
        config.simulation.seed = args.seed;
    }

    info!("Configuration loaded from {:?}", config_path);

    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(run(config, !args.no_console));
    // stdin reads sit on a blocking thread that never returns on its own
    rt.shutdown_timeout(Duration::from_secs(1));
    result
}

async fn run(config: Config, console: bool) -> Result<()> {
    let dataset = ReferenceDataset::load(&config.dataset.path, &config.dataset.label_columns)
        .with_context(|| {
            format!("cannot start without reference dataset {:?}", config.dataset.path)
        })?;
    let dataset = Arc::new(dataset);

    let simulator = Simulator::new(&config, dataset.clone());
    simulator
        .scoring()
        .load(Arc::new(ProfileScorer::from_dataset(&dataset)));
    let handle = simulator.handle();

    let (shutdown_tx, _) = broadcast::channel::<()>(4);

    let server = if config.streaming.websocket_enabled {
        let server = WebSocketServer::bind(
            &config.streaming.bind_addr(),
            config.streaming.websocket_max_clients,
        )
        .await?;
        let broadcaster = simulator.broadcaster();
        let shutdown = shutdown_tx.subscribe();
        Some(tokio::spawn(async move {
            if let Err(e) = server.serve(broadcaster, shutdown).await {
                error!("WebSocket server failed: {}", e);
            }
        }))
    } else {
        None
    };

    if console {
        tokio::spawn(run_console(handle.clone(), shutdown_tx.subscribe()));
    }

    let mut driver = tokio::spawn(simulator.run(shutdown_tx.subscribe()));

    info!("🚀 SmartMine running");
    info!("   Press Ctrl+C to shutdown");

    let driver_finished = tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received, cleaning up...");
            false
        }
        _ = &mut driver => true,
    };

    let _ = shutdown_tx.send(());
    if !driver_finished {
        let _ = driver.await;
    }
    if let Some(server) = server {
        let _ = server.await;
    }

    info!("SmartMine shutdown complete");

    Ok(())
}
