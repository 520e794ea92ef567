//! Shared test helpers for integration tests.
//!
//! Each test gets its own in-memory store and a REST server bound to an
//! ephemeral port on the loopback interface.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use todo_sync::api::{server, AppState};
use todo_sync::config::{ClientConfig, GlobalConfig};
use todo_sync::persistence::db;

/// Build a configuration backed by an in-memory database.
pub fn test_config() -> GlobalConfig {
    GlobalConfig {
        db_path: PathBuf::from(":memory:"),
        http_port: 0,
        ..GlobalConfig::default()
    }
}

/// Client settings pointing at `base_url` with a short timeout.
pub fn client_config(base_url: &str) -> ClientConfig {
    ClientConfig {
        base_url: base_url.to_owned(),
        request_timeout_seconds: 2,
        ..ClientConfig::default()
    }
}

/// A running server. Cancel `ct` (or call [`TestServer::shutdown`]) to stop it.
pub struct TestServer {
    pub base_url: String,
    pub state: Arc<AppState>,
    pub ct: CancellationToken,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// URL of `path` on this server.
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Stop the server and wait for the serve loop to exit.
    pub async fn shutdown(self) {
        self.ct.cancel();
        let _ = self.handle.await;
    }
}

/// Start a server for `config` on `127.0.0.1:0`.
pub async fn spawn_server_with(config: GlobalConfig) -> TestServer {
    let pool = db::connect_for(&config).await.expect("db");
    let state = Arc::new(AppState::new(config, pool));

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral");
    let addr = listener.local_addr().expect("local addr");

    let ct = CancellationToken::new();
    let server_ct = ct.clone();
    let server_state = Arc::clone(&state);
    let handle = tokio::spawn(async move {
        let _ = server::serve_on(listener, server_state, server_ct).await;
    });

    TestServer {
        base_url: format!("http://{addr}"),
        state,
        ct,
        handle,
    }
}

/// Start a server with [`test_config`].
pub async fn spawn_server() -> TestServer {
    spawn_server_with(test_config()).await
}

/// A loopback URL nothing is listening on.
pub async fn dead_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}")
}
