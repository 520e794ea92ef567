//! The cache-owning client session.

use chrono::{DateTime, Local};
use tracing::{debug, info, warn};

use super::alerts::{scan_deadlines, DeadlineAlert};
use super::api::TaskApi;
use super::notify::Notifier;
use super::view::{Metrics, TaskView};
use crate::models::task::{NewTask, Task, TaskFilter, TaskPatch};
use crate::{AppError, Result};

/// One client session: an API handle, a notifier, and the task cache.
///
/// The cache mirrors the server's "newest first" order. It is replaced by
/// [`refresh`](Self::refresh) and otherwise changed by exactly one edit per
/// acknowledged request. A failed request never touches it.
pub struct SyncClient<A, N> {
    api: A,
    notifier: N,
    cache: Vec<Task>,
}

impl<A: TaskApi, N: Notifier> SyncClient<A, N> {
    /// Create a session with an empty cache. Call [`refresh`](Self::refresh)
    /// before relying on the cache.
    #[must_use]
    pub fn new(api: A, notifier: N) -> Self {
        Self {
            api,
            notifier,
            cache: Vec::new(),
        }
    }

    /// The cached tasks, newest first.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.cache
    }

    /// Look up a cached task.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Task> {
        self.cache.iter().find(|task| task.id == id)
    }

    /// The notifier this session reports through.
    #[must_use]
    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Replace the cache with the server's current list.
    ///
    /// Returns the number of tasks loaded.
    ///
    /// # Errors
    ///
    /// Propagates the API error; the cache keeps its previous contents.
    pub async fn refresh(&mut self) -> Result<usize> {
        match self.api.list().await {
            Ok(tasks) => {
                debug!(count = tasks.len(), "cache refreshed");
                self.cache = tasks;
                Ok(self.cache.len())
            }
            Err(err) => Err(self.report("Failed to load tasks", err)),
        }
    }

    /// Submit a draft and prepend the stored record on success.
    ///
    /// Text and note are trimmed first; a blank text is rejected locally
    /// without contacting the server.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for blank text, or the API error.
    pub async fn create(&mut self, mut draft: NewTask) -> Result<Task> {
        draft.text = draft.text.trim().to_owned();
        draft.desc = draft.desc.trim().to_owned();
        if let Err(err) = draft.validate() {
            self.notifier.toast("Please enter a task!");
            return Err(err);
        }

        match self.api.create(&draft).await {
            Ok(task) => {
                info!(task_id = %task.id, "task added");
                self.cache.insert(0, task.clone());
                self.notifier.toast("Task added!");
                Ok(task)
            }
            Err(err) => Err(self.report("Failed to add task", err)),
        }
    }

    /// Send a partial update and swap in the server's record on success.
    ///
    /// The cached record is replaced in place, so its position never changes.
    /// An acknowledged update for an id missing from the cache leaves the
    /// cache as is.
    ///
    /// # Errors
    ///
    /// Propagates the API error; the cache is untouched.
    pub async fn update(&mut self, id: &str, patch: &TaskPatch) -> Result<Task> {
        match self.api.update(id, patch).await {
            Ok(task) => {
                if let Some(slot) = self.cache.iter_mut().find(|t| t.id == task.id) {
                    slot.clone_from(&task);
                } else {
                    debug!(task_id = %task.id, "updated task not in cache");
                }
                Ok(task)
            }
            Err(err) => Err(self.report("Failed to update task", err)),
        }
    }

    /// Flip the completion flag of a cached task.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if `id` is not cached, or the API error.
    pub async fn toggle(&mut self, id: &str) -> Result<Task> {
        let Some(current) = self.get(id).map(|task| task.completed) else {
            let err = AppError::NotFound(format!("task {id} not found"));
            return Err(self.report("Failed to update task", err));
        };
        self.update(id, &TaskPatch::completed(!current)).await
    }

    /// Delete a task and drop it from the cache on success.
    ///
    /// # Errors
    ///
    /// Propagates the API error; the cache is untouched.
    pub async fn delete(&mut self, id: &str) -> Result<()> {
        match self.api.delete(id).await {
            Ok(()) => {
                self.cache.retain(|task| task.id != id);
                info!(task_id = %id, "task deleted");
                self.notifier.toast("Task deleted!");
                Ok(())
            }
            Err(err) => Err(self.report("Failed to delete task", err)),
        }
    }

    /// Lazily filtered view over the cache, in cache order.
    #[must_use]
    pub fn view(&self, filter: TaskFilter) -> TaskView<'_> {
        TaskView::new(&self.cache, filter)
    }

    /// Progress over the whole cache.
    #[must_use]
    pub fn metrics(&self) -> Metrics {
        Metrics::from_tasks(&self.cache)
    }

    /// Tasks in the cache that are due within the alert window of `now`.
    #[must_use]
    pub fn deadline_alerts(&self, now: DateTime<Local>) -> Vec<DeadlineAlert> {
        scan_deadlines(&self.cache, now)
    }

    /// Scan the cache and hand each alert to the notifier.
    ///
    /// Returns how many alerts were delivered; zero when the notifier has
    /// alerts turned off.
    #[must_use = "the count tells whether anything was delivered"]
    pub fn check_deadlines(&self, now: DateTime<Local>) -> usize {
        let alerts = self.deadline_alerts(now);
        if !self.notifier.alerts_permitted() {
            debug!(dropped = alerts.len(), "deadline alerts not permitted");
            return 0;
        }
        for alert in &alerts {
            self.notifier.deadline_alert(alert);
        }
        alerts.len()
    }

    fn report(&self, action: &str, err: AppError) -> AppError {
        warn!(%err, action, "sync request failed");
        self.notifier.toast(&format!("{action}: {}", err.message()));
        err
    }
}
