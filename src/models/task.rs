//! Task model, drafts, partial updates, and list filters.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppError, Result};

/// Task urgency. Anything outside these three values is rejected.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Can wait.
    Low,
    /// Default when the draft omits a priority.
    #[default]
    Medium,
    /// Needs attention first.
    High,
}

impl Priority {
    /// Wire and storage representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(AppError::Validation(format!(
                "priority must be one of low, medium, high (got '{other}')"
            ))),
        }
    }
}

/// Client-submitted fields for a new task.
///
/// `completed` is not part of the draft: new tasks always start active, and
/// a `completed` key in submitted JSON is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewTask {
    /// Task headline; must contain a non-whitespace character.
    #[serde(default)]
    pub text: String,
    /// Free-form due date.
    #[serde(default)]
    pub deadline: String,
    /// Omitted means [`Priority::Medium`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    /// Free-text note.
    #[serde(default)]
    pub desc: String,
}

impl NewTask {
    /// Draft with only the required text set.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Set the priority.
    #[must_use]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Set the deadline.
    #[must_use]
    pub fn with_deadline(mut self, deadline: impl Into<String>) -> Self {
        self.deadline = deadline.into();
        self
    }

    /// Set the note.
    #[must_use]
    pub fn with_desc(mut self, desc: impl Into<String>) -> Self {
        self.desc = desc.into();
        self
    }

    /// Check the draft against the task schema.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if `text` is empty after trimming.
    pub fn validate(&self) -> Result<()> {
        validate_text(&self.text)
    }
}

/// Partial update; only the `Some` fields are written.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskPatch {
    /// New completion state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    /// New headline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// New deadline; an empty string clears it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    /// New priority.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    /// New note; an empty string clears it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
}

impl TaskPatch {
    /// Patch that only flips the completion flag.
    #[must_use]
    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }

    /// True when no field would change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.completed.is_none()
            && self.text.is_none()
            && self.deadline.is_none()
            && self.priority.is_none()
            && self.desc.is_none()
    }

    /// Check supplied fields against the task schema.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidRequest` for an empty patch and
    /// `AppError::Validation` if a supplied `text` is blank.
    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(AppError::InvalidRequest(
                "update must contain at least one field".into(),
            ));
        }
        if let Some(ref text) = self.text {
            validate_text(text)?;
        }
        Ok(())
    }
}

/// Canonical task record as stored and returned by the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Store-assigned identifier; immutable.
    pub id: String,
    /// Task headline.
    pub text: String,
    /// Whether the task is done.
    pub completed: bool,
    /// Free-form due date, empty when unset.
    pub deadline: String,
    /// Urgency.
    pub priority: Priority,
    /// Free-text note.
    pub desc: String,
    /// Creation timestamp; default ordering key.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Build the canonical record for a validated draft.
    #[must_use]
    pub fn from_draft(draft: NewTask, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: draft.text,
            completed: false,
            deadline: draft.deadline,
            priority: draft.priority.unwrap_or_default(),
            desc: draft.desc,
            created_at: now,
            updated_at: now,
        }
    }

    /// True while the task still needs doing.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.completed
    }
}

/// Which tasks a derived view shows.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskFilter {
    /// Every task.
    #[default]
    All,
    /// Tasks not yet completed.
    Active,
    /// Completed tasks.
    Completed,
}

impl TaskFilter {
    /// Whether `task` belongs in this view.
    #[must_use]
    pub fn matches(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Active => !task.completed,
            Self::Completed => task.completed,
        }
    }
}

impl FromStr for TaskFilter {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            other => Err(AppError::Validation(format!(
                "filter must be one of all, active, completed (got '{other}')"
            ))),
        }
    }
}

fn validate_text(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(AppError::Validation("task text is required".into()));
    }
    Ok(())
}
