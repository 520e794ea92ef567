//! Transport seam between the sync client and the task store.
//!
//! [`HttpTaskApi`] talks to the REST surface with `reqwest`. The store's
//! [`TaskRepo`] also implements [`TaskApi`] so the client can run against an
//! in-process store.

use std::future::Future;
use std::pin::Pin;

use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::api::error::ErrorBody;
use crate::config::ClientConfig;
use crate::models::task::{NewTask, Task, TaskPatch};
use crate::persistence::task_repo::TaskRepo;
use crate::{AppError, Result};

/// Boxed future returned by [`TaskApi`] methods.
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Remote operations the sync client depends on.
pub trait TaskApi: Send + Sync {
    /// Fetch every task, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Transient`] on network or server failure.
    fn list(&self) -> ApiFuture<'_, Vec<Task>>;

    /// Submit a draft and return the canonical record.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the store rejects the draft.
    fn create<'a>(&'a self, draft: &'a NewTask) -> ApiFuture<'a, Task>;

    /// Apply a partial update and return the canonical record.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for an unknown id and
    /// [`AppError::InvalidRequest`] for an empty patch.
    fn update<'a>(&'a self, id: &'a str, patch: &'a TaskPatch) -> ApiFuture<'a, Task>;

    /// Delete a task.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for an unknown id.
    fn delete<'a>(&'a self, id: &'a str) -> ApiFuture<'a, ()>;
}

/// REST client for `/api/todos`.
#[derive(Clone)]
pub struct HttpTaskApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpTaskApi {
    /// Build a client with the configured base URL and request timeout.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the HTTP client cannot be constructed.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|err| AppError::Config(format!("failed to build http client: {err}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
        })
    }

    fn collection_url(&self) -> String {
        format!("{}/api/todos", self.base_url)
    }

    fn item_url(&self, id: &str) -> String {
        format!("{}/api/todos/{id}", self.base_url)
    }
}

impl TaskApi for HttpTaskApi {
    fn list(&self) -> ApiFuture<'_, Vec<Task>> {
        Box::pin(async move {
            let resp = self.http.get(self.collection_url()).send().await?;
            decode(resp).await
        })
    }

    fn create<'a>(&'a self, draft: &'a NewTask) -> ApiFuture<'a, Task> {
        Box::pin(async move {
            let resp = self
                .http
                .post(self.collection_url())
                .json(draft)
                .send()
                .await?;
            decode(resp).await
        })
    }

    fn update<'a>(&'a self, id: &'a str, patch: &'a TaskPatch) -> ApiFuture<'a, Task> {
        Box::pin(async move {
            let resp = self.http.put(self.item_url(id)).json(patch).send().await?;
            decode(resp).await
        })
    }

    fn delete<'a>(&'a self, id: &'a str) -> ApiFuture<'a, ()> {
        Box::pin(async move {
            let resp = self.http.delete(self.item_url(id)).send().await?;
            if resp.status().is_success() {
                return Ok(());
            }
            Err(error_from_response(resp).await)
        })
    }
}

impl TaskApi for TaskRepo {
    fn list(&self) -> ApiFuture<'_, Vec<Task>> {
        Box::pin(TaskRepo::list(self))
    }

    fn create<'a>(&'a self, draft: &'a NewTask) -> ApiFuture<'a, Task> {
        Box::pin(TaskRepo::create(self, draft.clone()))
    }

    fn update<'a>(&'a self, id: &'a str, patch: &'a TaskPatch) -> ApiFuture<'a, Task> {
        Box::pin(TaskRepo::update(self, id, patch))
    }

    fn delete<'a>(&'a self, id: &'a str) -> ApiFuture<'a, ()> {
        Box::pin(TaskRepo::delete(self, id))
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T> {
    if resp.status().is_success() {
        return Ok(resp.json::<T>().await?);
    }
    Err(error_from_response(resp).await)
}

async fn error_from_response(resp: Response) -> AppError {
    let status = resp.status();
    let body = resp.json::<ErrorBody>().await.ok();
    debug!(status = status.as_u16(), ?body, "server rejected request");
    error_from_status(status, body)
}

/// Translate a non-success status and optional error body into the taxonomy.
#[must_use]
pub fn error_from_status(status: StatusCode, body: Option<ErrorBody>) -> AppError {
    let message = body
        .as_ref()
        .map_or_else(|| status.to_string(), |b| b.message.clone());

    match status {
        StatusCode::NOT_FOUND => AppError::NotFound(message),
        StatusCode::BAD_REQUEST => match body.as_ref().map(|b| b.kind.as_str()) {
            Some("invalid_request") => AppError::InvalidRequest(message),
            _ => AppError::Validation(message),
        },
        s if s.is_client_error() => AppError::InvalidRequest(message),
        _ => AppError::Transient(message),
    }
}
