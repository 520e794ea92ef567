//! REST surface for the task store.
//!
//! | Method | Path              | Success           |
//! |--------|-------------------|-------------------|
//! | GET    | `/api/todos`      | 200, task array   |
//! | POST   | `/api/todos`      | 201, created task |
//! | PUT    | `/api/todos/{id}` | 200, updated task |
//! | DELETE | `/api/todos/{id}` | 200, ack message  |
//! | GET    | `/health`         | 200, `ok`         |
//!
//! Failures carry `{"message": ..., "kind": ...}` bodies; see [`error`].

pub mod error;
pub mod routes;
pub mod server;

use std::sync::Arc;

use crate::config::GlobalConfig;
use crate::persistence::db::Database;
use crate::persistence::task_repo::TaskRepo;

/// Shared application state handed to every route handler.
pub struct AppState {
    /// Global configuration.
    pub config: Arc<GlobalConfig>,
    /// `SQLite` connection pool.
    pub db: Arc<Database>,
}

impl AppState {
    /// Build state from an already-connected pool.
    #[must_use]
    pub fn new(config: GlobalConfig, db: Database) -> Self {
        Self {
            config: Arc::new(config),
            db: Arc::new(db),
        }
    }

    /// Repository handle over the shared pool.
    #[must_use]
    pub fn tasks(&self) -> TaskRepo {
        TaskRepo::new(Arc::clone(&self.db))
    }
}
