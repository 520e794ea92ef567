//! HTTP server bootstrap for the REST surface.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::services::ServeDir;
use tracing::info;

use super::{routes, AppState};
use crate::{AppError, Result};

/// Build the application router.
///
/// When `static_dir` is configured, unmatched paths fall through to the
/// browser UI assets in that directory.
#[must_use]
pub fn router(state: Arc<AppState>) -> Router {
    let static_dir = state.config.static_dir.clone();

    let router = Router::new()
        .route("/api/todos", get(routes::list_tasks).post(routes::create_task))
        .route(
            "/api/todos/{id}",
            axum::routing::put(routes::update_task).delete(routes::delete_task),
        )
        .route("/health", get(routes::health))
        .with_state(state);

    match static_dir {
        Some(dir) => {
            info!(dir = %dir.display(), "serving static assets");
            router.fallback_service(ServeDir::new(dir))
        }
        None => router,
    }
}

/// Bind `config.http_host:http_port` and serve until `ct` is cancelled.
///
/// # Errors
///
/// Returns `AppError::Config` if the server fails to bind, or
/// `AppError::Io` if serving fails.
pub async fn serve(state: Arc<AppState>, ct: CancellationToken) -> Result<()> {
    let bind = state.config.bind_addr();
    let listener = TcpListener::bind(bind)
        .await
        .map_err(|err| AppError::Config(format!("failed to bind HTTP on {bind}: {err}")))?;
    serve_on(listener, state, ct).await
}

/// Serve on an already-bound listener until `ct` is cancelled.
///
/// # Errors
///
/// Returns `AppError::Io` if the listener address cannot be read or the
/// server loop fails.
pub async fn serve_on(
    listener: TcpListener,
    state: Arc<AppState>,
    ct: CancellationToken,
) -> Result<()> {
    let addr: SocketAddr = listener.local_addr()?;
    info!(%addr, "starting REST server");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { ct.cancelled().await })
        .await
        .map_err(|err| AppError::Io(format!("HTTP server error: {err}")))?;

    info!("REST server shut down");
    Ok(())
}
