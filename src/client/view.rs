//! Derived read-only projections of the task cache.

use std::fmt::{Display, Formatter};
use std::iter::FusedIterator;
use std::slice;

use crate::models::task::{Task, TaskFilter};

/// Lazy filtered walk over a task slice, in slice order.
///
/// Cloning a view restarts it from the same position; a fresh view is
/// obtained from the cache whenever the cache or the filter changes.
#[derive(Debug, Clone)]
pub struct TaskView<'a> {
    inner: slice::Iter<'a, Task>,
    filter: TaskFilter,
}

impl<'a> TaskView<'a> {
    /// View `tasks` through `filter`.
    #[must_use]
    pub fn new(tasks: &'a [Task], filter: TaskFilter) -> Self {
        Self {
            inner: tasks.iter(),
            filter,
        }
    }

    /// The filter this view applies.
    #[must_use]
    pub fn selected_filter(&self) -> TaskFilter {
        self.filter
    }
}

impl<'a> Iterator for TaskView<'a> {
    type Item = &'a Task;

    fn next(&mut self) -> Option<&'a Task> {
        let filter = self.filter;
        self.inner.find(|task| filter.matches(task))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.inner.size_hint().1)
    }
}

impl DoubleEndedIterator for TaskView<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let filter = self.filter;
        self.inner.rfind(|task| filter.matches(task))
    }
}

impl FusedIterator for TaskView<'_> {}

/// Progress summary over the whole cache, ignoring any active filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    /// All tasks.
    pub total: usize,
    /// Completed tasks.
    pub completed: usize,
    /// `total - completed`.
    pub active: usize,
    /// `completed / total * 100`, or 0 for an empty list.
    pub percent: f64,
}

impl Metrics {
    /// Compute metrics for `tasks`.
    #[must_use]
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let total = tasks.len();
        let completed = tasks.iter().filter(|task| task.completed).count();
        Self {
            total,
            completed,
            active: total - completed,
            percent: percent(completed, total),
        }
    }
}

impl Display for Metrics {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Total: {} | Active: {} | Completed: {}",
            self.total, self.active, self.completed
        )
    }
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    let part = f64::from(u32::try_from(part).unwrap_or(u32::MAX));
    let whole = f64::from(u32::try_from(whole).unwrap_or(u32::MAX));
    part / whole * 100.0
}
