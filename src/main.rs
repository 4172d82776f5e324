// src/main.rs - Motion host entry point
use std::path::PathBuf;

use clap::Parser;
use motion_host::config::{self, BackendKind, Config};
use motion_host::{MotionService, backend, web};

#[derive(Debug, Parser)]
#[command(name = "motion-host", version, about = "HTTP front end for a motion control backend")]
struct Cli {
    /// Path to the TOML configuration file. Built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `server.bind`.
    #[arg(long)]
    bind: Option<String>,

    /// Override `controller.backend`.
    #[arg(long, value_parser = parse_backend)]
    backend: Option<BackendKind>,

    /// Override `logging.level` (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,
}

fn parse_backend(value: &str) -> Result<BackendKind, String> {
    match value {
        "simulated" => Ok(BackendKind::Simulated),
        "native" => Ok(BackendKind::Native),
        other => Err(format!("unknown backend '{}' (expected 'simulated' or 'native')", other)),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = match &cli.config {
        Some(path) => config::load_config(path).map_err(|e| {
            eprintln!("Failed to load config from '{}': {}", path.display(), e);
            Box::new(e) as Box<dyn std::error::Error + Send + Sync + 'static>
        })?,
        None => Config::default(),
    };
    if let Some(bind) = cli.bind {
        config.server.bind = bind;
    }
    if let Some(kind) = cli.backend {
        config.controller.backend = kind;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    config.validate()?;

    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(config.logging.tracing_level()?)
        .init();

    tracing::info!("Starting motion-host");
    tracing::info!("Version: {}", env!("CARGO_PKG_VERSION"));
    match &cli.config {
        Some(path) => tracing::info!("Configuration loaded from: {}", path.display()),
        None => tracing::info!("No configuration file given, using defaults"),
    }
    tracing::info!("Backend: {} ({} axes)", config.controller.backend, config.controller.axes);

    let backend = backend::build(&config).map_err(|e| {
        tracing::error!("Failed to create motion backend: {}", e);
        Box::new(e) as Box<dyn std::error::Error + Send + Sync + 'static>
    })?;

    // The worker owns the backend; handlers talk to it through the service handle.
    let (service, worker) = MotionService::spawn(backend, config.server.request_queue);

    let app = web::api::create_router(service);

    // Start the web server.
    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!("Web API listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Dropping the router released the last service handle; let the worker drain.
    worker.await?;
    tracing::info!("motion-host stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}
