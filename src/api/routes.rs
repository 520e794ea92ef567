//! Route handlers for `/api/todos`.
//!
//! Bodies are read as raw bytes and decoded here so that malformed JSON is
//! reported through the same error taxonomy as schema violations instead of
//! axum's default 415/422 rejections.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, info_span, Instrument};
use uuid::Uuid;

use super::AppState;
use crate::models::task::{NewTask, Task, TaskPatch};
use crate::{AppError, Result};

/// Acknowledgment body for a successful delete.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeleteAck {
    /// Confirmation text.
    pub message: String,
}

/// `GET /api/todos`: all tasks, newest first.
pub async fn list_tasks(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Task>>> {
    let tasks = state.tasks().list().await?;
    debug!(count = tasks.len(), "listed tasks");
    Ok(Json(tasks))
}

/// `POST /api/todos`: create from a draft.
pub async fn create_task(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<Task>)> {
    let draft = parse_draft(&body)?;
    let task = state
        .tasks()
        .create(draft)
        .instrument(info_span!("create_task"))
        .await?;
    info!(task_id = %task.id, priority = %task.priority, "task created");
    Ok((StatusCode::CREATED, Json(task)))
}

/// `PUT /api/todos/{id}`: partial update.
pub async fn update_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Task>> {
    let patch = parse_patch(&body)?;
    ensure_task_id(&id)?;
    let task = state
        .tasks()
        .update(&id, &patch)
        .instrument(info_span!("update_task", task_id = %id))
        .await?;
    info!(task_id = %task.id, completed = task.completed, "task updated");
    Ok(Json(task))
}

/// `DELETE /api/todos/{id}`: remove a task.
pub async fn delete_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DeleteAck>> {
    ensure_task_id(&id)?;
    state
        .tasks()
        .delete(&id)
        .instrument(info_span!("delete_task", task_id = %id))
        .await?;
    info!(task_id = %id, "task deleted");
    Ok(Json(DeleteAck {
        message: "task deleted".into(),
    }))
}

/// `GET /health`: liveness probe.
pub async fn health() -> &'static str {
    "ok"
}

/// Decode a create body. A missing body is treated as an empty draft so the
/// caller gets the same "text is required" answer either way.
fn parse_draft(body: &[u8]) -> Result<NewTask> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(AppError::Validation("task text is required".into()));
    }
    let value = parse_object(body)?;
    serde_json::from_value(value).map_err(|err| AppError::Validation(err.to_string()))
}

/// Decode an update body, rejecting empty payloads before schema checks.
fn parse_patch(body: &[u8]) -> Result<TaskPatch> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(AppError::InvalidRequest("update body must not be empty".into()));
    }
    let value = parse_object(body)?;
    if value.as_object().is_some_and(serde_json::Map::is_empty) {
        return Err(AppError::InvalidRequest("update body must not be empty".into()));
    }
    serde_json::from_value(value).map_err(|err| AppError::Validation(err.to_string()))
}

fn parse_object(body: &[u8]) -> Result<Value> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|err| AppError::Validation(format!("malformed JSON body: {err}")))?;
    if !value.is_object() {
        return Err(AppError::Validation("request body must be a JSON object".into()));
    }
    Ok(value)
}

fn ensure_task_id(id: &str) -> Result<()> {
    Uuid::parse_str(id)
        .map(|_| ())
        .map_err(|_| AppError::InvalidRequest(format!("malformed task id '{id}'")))
}
