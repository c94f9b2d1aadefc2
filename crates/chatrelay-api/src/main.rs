//! Chatrelay server entry point.
//!
//! Parses CLI arguments, loads configuration, initializes the database and
//! services, then serves the HTTP API until interrupted.

mod http;
mod state;

use std::path::PathBuf;

use clap::Parser;

use chatrelay_observe::tracing_setup::init_tracing;
use state::AppState;

#[derive(Parser)]
#[command(name = "chatrelay", about = "Conversational LLM relay server")]
struct Cli {
    /// Path to the configuration file.
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Bind host; overrides the config file.
    #[arg(long)]
    host: Option<String>,

    /// Bind port; overrides the config file.
    #[arg(long)]
    port: Option<u16>,

    /// SQLite database URL; overrides the config file.
    #[arg(long)]
    database_url: Option<String>,

    /// Export spans via OpenTelemetry (stdout exporter).
    #[arg(long)]
    otel: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let _tracing = init_tracing(cli.otel).map_err(|e| anyhow::anyhow!("tracing setup: {e}"))?;

    let mut config = chatrelay_infra::config::load_config(&cli.config).await;
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(database_url) = cli.database_url {
        config.database_url = database_url;
    }

    let addr = format!("{}:{}", config.host, config.port);
    let state = AppState::init(config).await?;
    let router = http::router::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("chatrelay listening on http://{addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
