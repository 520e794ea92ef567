#![forbid(unsafe_code)]

//! `todo-sync`: task store server binary.
//!
//! Loads configuration, opens the `SQLite` task store, and serves the REST
//! API until Ctrl-C or SIGTERM.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use todo_sync::api::{server, AppState};
use todo_sync::config::GlobalConfig;
use todo_sync::persistence::db;
use todo_sync::{AppError, Result};

/// Filter used when `RUST_LOG` is unset; keeps pool chatter out of `info`.
const DEFAULT_LOG_FILTER: &str = "info,sqlx=warn";

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "todo-sync", about = "Personal task tracker server", version, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Override the HTTP port from the configuration.
    #[arg(long, env = "TODO_SYNC_PORT")]
    port: Option<u16>,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;
    info!("todo-sync server bootstrap");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
}

async fn run(args: Cli) -> Result<()> {
    // ── Load configuration ──────────────────────────────
    let mut config = GlobalConfig::resolve(args.config.as_deref())?;
    if let Some(port) = args.port {
        config.http_port = port;
    }
    info!(db_path = %config.db_path.display(), "configuration loaded");

    // ── Initialize database ─────────────────────────────
    let pool = db::connect_for(&config).await?;
    info!("database connected");

    let state = Arc::new(AppState::new(config, pool));

    // ── Start REST server ───────────────────────────────
    let ct = CancellationToken::new();
    let http_ct = ct.clone();
    let http_state = Arc::clone(&state);
    let http_handle = tokio::spawn(async move {
        if let Err(err) = server::serve(http_state, http_ct).await {
            error!(%err, "REST server failed");
        }
    });

    // ── Wait for shutdown signal ────────────────────────
    let reason = shutdown_signal().await;
    info!(reason, "shutdown signal received");
    ct.cancel();

    let _ = http_handle.await;
    state.db.close().await;
    info!("todo-sync shut down");

    Ok(())
}

/// Wait for Ctrl-C or, on Unix, SIGTERM; returns which one arrived.
#[cfg(unix)]
async fn shutdown_signal() -> &'static str {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(sigterm) => sigterm,
        Err(err) => {
            tracing::warn!(%err, "SIGTERM unavailable, waiting for ctrl-c only");
            return ctrl_c().await;
        }
    };

    tokio::select! {
        reason = ctrl_c() => reason,
        _ = sigterm.recv() => "SIGTERM",
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() -> &'static str {
    ctrl_c().await
}

async fn ctrl_c() -> &'static str {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(%err, "ctrl-c handler failed");
    }
    "ctrl-c"
}

fn init_tracing(log_format: LogFormat) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = fmt().with_env_filter(filter).with_target(true);

    let installed = match log_format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().flatten_event(true).try_init(),
    };
    installed.map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))
}
