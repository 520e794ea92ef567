//! Sinks for user-facing notifications.

use tracing::{info, warn};

use super::alerts::DeadlineAlert;

/// Receives short-lived operation feedback and deadline alerts.
pub trait Notifier: Send + Sync {
    /// Show a transient message ("Task added!", "Failed to delete task: ...").
    fn toast(&self, message: &str);

    /// Deliver a deadline alert. Only called when [`alerts_permitted`]
    /// returns true.
    ///
    /// [`alerts_permitted`]: Notifier::alerts_permitted
    fn deadline_alert(&self, alert: &DeadlineAlert);

    /// Whether the user allowed deadline alerts. Denied alerts are dropped
    /// without a trace.
    fn alerts_permitted(&self) -> bool {
        true
    }
}

/// Writes notifications to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn toast(&self, message: &str) {
        info!(message, "toast");
    }

    fn deadline_alert(&self, alert: &DeadlineAlert) {
        warn!(task_id = %alert.task_id, deadline = %alert.deadline, "{}", alert.message());
    }
}

/// Terminal notifier used by `todo-sync-ctl`.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleNotifier {
    alerts_enabled: bool,
}

impl ConsoleNotifier {
    /// Create a notifier; `alerts_enabled = false` mutes deadline alerts.
    #[must_use]
    pub fn new(alerts_enabled: bool) -> Self {
        Self { alerts_enabled }
    }
}

impl Notifier for ConsoleNotifier {
    fn toast(&self, message: &str) {
        eprintln!("{message}");
    }

    fn deadline_alert(&self, alert: &DeadlineAlert) {
        println!("Task reminder: {}", alert.message());
    }

    fn alerts_permitted(&self) -> bool {
        self.alerts_enabled
    }
}
