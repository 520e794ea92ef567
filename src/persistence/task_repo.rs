//! Task repository for `SQLite` persistence.
//!
//! The repository is the only writer of ids and timestamps. Every mutation
//! is a single statement touching exactly one row.

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::models::task::{NewTask, Priority, Task, TaskPatch};
use crate::{AppError, Result};

use super::db::Database;

const SELECT_COLUMNS: &str =
    "SELECT id, text, completed, deadline, priority, note, created_at, updated_at FROM task";

/// Repository wrapper around `SQLite` for task records.
#[derive(Clone)]
pub struct TaskRepo {
    db: Arc<Database>,
}

/// Internal row struct for `SQLite` deserialization.
#[derive(sqlx::FromRow)]
struct TaskRow {
    id: String,
    text: String,
    completed: i64,
    deadline: String,
    priority: String,
    note: String,
    created_at: String,
    updated_at: String,
}

impl TaskRow {
    fn into_task(self) -> Result<Task> {
        let priority = self
            .priority
            .parse::<Priority>()
            .map_err(|_| AppError::Db(format!("invalid priority: {}", self.priority)))?;

        Ok(Task {
            id: self.id,
            text: self.text,
            completed: self.completed != 0,
            deadline: self.deadline,
            priority,
            desc: self.note,
            created_at: parse_timestamp(&self.created_at, "created_at")?,
            updated_at: parse_timestamp(&self.updated_at, "updated_at")?,
        })
    }
}

fn parse_timestamp(raw: &str, column: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::Db(format!("invalid {column}: {e}")))
}

/// Fixed-width RFC 3339 so lexical order matches chronological order.
fn timestamp_str(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn not_found(id: &str) -> AppError {
    AppError::NotFound(format!("task {id} not found"))
}

impl TaskRepo {
    /// Create a new repository instance.
    #[must_use]
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// List every task, most recently created first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn list(&self) -> Result<Vec<Task>> {
        let rows: Vec<TaskRow> =
            sqlx::query_as(&format!("{SELECT_COLUMNS} ORDER BY created_at DESC, seq DESC"))
                .fetch_all(self.db.as_ref())
                .await?;

        rows.into_iter().map(TaskRow::into_task).collect()
    }

    /// Retrieve a task by identifier.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the task does not exist.
    pub async fn get_by_id(&self, id: &str) -> Result<Task> {
        let row: Option<TaskRow> = sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(self.db.as_ref())
            .await?;

        row.ok_or_else(|| not_found(id))?.into_task()
    }

    /// Validate a draft, assign identity and timestamps, and persist it.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if the draft text is blank, or
    /// `AppError::Db` if the insert fails.
    pub async fn create(&self, draft: NewTask) -> Result<Task> {
        draft.validate()?;
        let task = Task::from_draft(draft, Utc::now());
        let stamp = timestamp_str(task.created_at);

        sqlx::query(
            "INSERT INTO task (id, text, completed, deadline, priority, note, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(&task.id)
        .bind(&task.text)
        .bind(i64::from(task.completed))
        .bind(&task.deadline)
        .bind(task.priority.as_str())
        .bind(&task.desc)
        .bind(&stamp)
        .bind(&stamp)
        .execute(self.db.as_ref())
        .await?;

        Ok(task)
    }

    /// Apply the supplied fields of `patch` to task `id`.
    ///
    /// The patch is checked before the id is looked up, so an empty patch is
    /// rejected even for unknown ids. The merge runs as one `UPDATE ...
    /// RETURNING` statement, so it takes the write lock up front and
    /// concurrent updates queue on the busy timeout; the last commit wins.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidRequest` for an empty patch,
    /// `AppError::Validation` for a blank text, `AppError::NotFound` for an
    /// unknown id, or `AppError::Db` on persistence failure.
    pub async fn update(&self, id: &str, patch: &TaskPatch) -> Result<Task> {
        patch.validate()?;

        let row: Option<TaskRow> = sqlx::query_as(
            "UPDATE task SET
                 completed = COALESCE(?1, completed),
                 text = COALESCE(?2, text),
                 deadline = COALESCE(?3, deadline),
                 priority = COALESCE(?4, priority),
                 note = COALESCE(?5, note),
                 updated_at = ?6
             WHERE id = ?7
             RETURNING id, text, completed, deadline, priority, note, created_at, updated_at",
        )
        .bind(patch.completed.map(i64::from))
        .bind(patch.text.as_deref())
        .bind(patch.deadline.as_deref())
        .bind(patch.priority.map(Priority::as_str))
        .bind(patch.desc.as_deref())
        .bind(timestamp_str(Utc::now()))
        .bind(id)
        .fetch_optional(self.db.as_ref())
        .await?;

        row.ok_or_else(|| not_found(id))?.into_task()
    }

    /// Remove task `id`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if no such task exists, or `AppError::Db`
    /// if the delete fails.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM task WHERE id = ?1")
            .bind(id)
            .execute(self.db.as_ref())
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }

    /// Number of stored tasks.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn count(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM task")
            .fetch_one(self.db.as_ref())
            .await?;
        Ok(count)
    }
}
