//! Deadline alert scan and the periodic scanner task.
//!
//! A task is "due soon" when it is incomplete, its deadline parses, and the
//! deadline lies strictly inside the next hour. The scan keeps no memory of
//! earlier alerts, so a task stays alertable on every tick until it is
//! completed or its deadline passes.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, Instrument};

use super::api::TaskApi;
use super::notify::Notifier;
use super::sync::SyncClient;
use crate::models::task::Task;

/// Width of the "due soon" window.
pub const ALERT_WINDOW_MINUTES: i64 = 60;

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// One task approaching its deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeadlineAlert {
    /// Task identifier.
    pub task_id: String,
    /// Task headline.
    pub text: String,
    /// Deadline exactly as the user entered it.
    pub deadline: String,
    /// Parsed deadline.
    pub due: DateTime<Local>,
}

impl DeadlineAlert {
    /// Human-readable reminder text.
    #[must_use]
    pub fn message(&self) -> String {
        format!("Task \"{}\" is due at {}", self.text, self.deadline)
    }
}

/// Parse a free-text deadline.
///
/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM[:SS]` and `YYYY-MM-DD HH:MM[:SS]` in
/// local time, and a bare `YYYY-MM-DD` as UTC midnight. Anything else yields
/// `None`.
#[must_use]
pub fn parse_deadline(raw: &str) -> Option<DateTime<Local>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Local));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Local.from_local_datetime(&naive).earliest();
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| Utc.from_utc_datetime(&midnight).with_timezone(&Local))
}

/// True when `due` is after `now` and less than the alert window away.
#[must_use]
pub fn is_due_soon(due: DateTime<Local>, now: DateTime<Local>) -> bool {
    let remaining = due - now;
    remaining > chrono::Duration::zero()
        && remaining < chrono::Duration::minutes(ALERT_WINDOW_MINUTES)
}

/// Alerts for every incomplete task due within the window, in input order.
#[must_use]
pub fn scan_deadlines<'a, I>(tasks: I, now: DateTime<Local>) -> Vec<DeadlineAlert>
where
    I: IntoIterator<Item = &'a Task>,
{
    tasks
        .into_iter()
        .filter(|task| !task.completed && !task.deadline.is_empty())
        .filter_map(|task| {
            let due = parse_deadline(&task.deadline)?;
            is_due_soon(due, now).then(|| DeadlineAlert {
                task_id: task.id.clone(),
                text: task.text.clone(),
                deadline: task.deadline.clone(),
                due,
            })
        })
        .collect()
}

/// Spawn a task that runs the deadline check every `period` until `cancel`
/// fires. The first check happens one full period after start.
#[must_use]
pub fn spawn_deadline_scanner<A, N>(
    client: Arc<Mutex<SyncClient<A, N>>>,
    period: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()>
where
    A: TaskApi + 'static,
    N: Notifier + 'static,
{
    tokio::spawn(
        async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(period_secs = period.as_secs(), "deadline scanner started");

            loop {
                tokio::select! {
                    () = cancel.cancelled() => {
                        info!("deadline scanner shutting down");
                        break;
                    }
                    _ = ticker.tick() => {
                        let delivered = client.lock().await.check_deadlines(Local::now());
                        debug!(delivered, "deadline scan complete");
                    }
                }
            }
        }
        .instrument(info_span!("deadline_scanner")),
    )
}
