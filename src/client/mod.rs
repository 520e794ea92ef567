//! Sync client: a cached mirror of the server's task list.
//!
//! The cache changes only after the server acknowledges a request. Derived
//! views, metrics, and deadline alerts are computed from the cache on demand
//! and never stored.

pub mod alerts;
pub mod api;
pub mod notify;
pub mod sync;
pub mod view;

pub use alerts::{spawn_deadline_scanner, DeadlineAlert};
pub use api::{HttpTaskApi, TaskApi};
pub use notify::{ConsoleNotifier, Notifier, TracingNotifier};
pub use sync::SyncClient;
pub use view::{Metrics, TaskView};
