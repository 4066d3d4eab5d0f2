#![forbid(unsafe_code)]

mod config;

use anyhow::{Context, Result};
use clap::Parser;
use config::{AppConfig, LoggingConfig};
use sea_orm::{ConnectOptions, Database};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use workshop_orders::WorkshopOrdersModule;

/// Workshop orders HTTP server
#[derive(Debug, Parser)]
#[command(name = "workshop-server", version)]
struct Cli {
    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Run database migrations and exit
    #[arg(long)]
    migrate_only: bool,
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));
    if logging.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_current_span(false))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn wait_for_shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;

    if cli.print_config {
        print!("{}", serde_yaml::to_string(&config)?);
        return Ok(());
    }

    init_tracing(&config.logging);

    let mut options = ConnectOptions::new(config.database.url.clone());
    options
        .max_connections(config.database.max_connections)
        .sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .with_context(|| format!("failed to connect to {}", config.database.url))?;

    WorkshopOrdersModule::migrate(&db).await?;
    if cli.migrate_only {
        return Ok(());
    }

    let module = WorkshopOrdersModule::new(Arc::new(db), config.workshop_orders.clone());
    let app = module
        .register_rest(axum::Router::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind_addr))?;
    info!(addr = %config.server.bind_addr, "workshop server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            wait_for_shutdown_signal().await;
            info!("shutdown signal received");
        })
        .await?;

    info!("workshop server stopped");
    Ok(())
}
