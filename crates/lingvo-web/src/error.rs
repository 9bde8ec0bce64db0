use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use lingvo_engine::RepositoryError;
use serde_json::json;
use thiserror::Error;

/// Failures starting the server.
#[derive(Debug, Error)]
pub enum WebError {
    #[error("Invalid bind address {0}")]
    Address(String),
    #[error("Content error: {0}")]
    Content(#[from] RepositoryError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error answered to a client as `{"error": message}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::InvalidPath(path) => Self::bad_request(format!("Invalid path: {path}")),
            other => {
                log::error!("content lookup failed: {other}");
                Self::internal("Failed to read content")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let payload = json!({ "error": self.message });
        (self.status, Json(payload)).into_response()
    }
}
