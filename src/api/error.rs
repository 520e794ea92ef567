//! Mapping from [`AppError`] to HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::AppError;

/// JSON body returned with every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    /// Human-readable failure description.
    pub message: String,
    /// Taxonomy tag from [`AppError::kind`].
    pub kind: String,
}

/// HTTP status for each error category.
#[must_use]
pub fn status_for(err: &AppError) -> StatusCode {
    match err {
        AppError::Validation(_) | AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        AppError::NotFound(_) => StatusCode::NOT_FOUND,
        AppError::Transient(_) => StatusCode::SERVICE_UNAVAILABLE,
        AppError::Config(_) | AppError::Db(_) | AppError::Io(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        if status.is_server_error() {
            error!(err = %self, "request failed");
        } else {
            warn!(err = %self, status = status.as_u16(), "request rejected");
        }

        let body = ErrorBody {
            message: self.message().to_owned(),
            kind: self.kind().to_owned(),
        };
        (status, Json(body)).into_response()
    }
}
