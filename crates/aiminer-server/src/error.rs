//! Server errors and their HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::{error, warn};

use aiminer_contracts::error::BrainError;

/// Failures starting or running the HTTP service.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {reason}")]
    Bind { addr: String, reason: String },

    #[error("server terminated: {reason}")]
    Serve { reason: String },
}

pub type ServerResult<T> = Result<T, ServerError>;

/// An error answered to an HTTP client as `{"detail": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn unprocessable(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            detail: detail.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: detail.into(),
        }
    }
}

impl From<BrainError> for ApiError {
    fn from(e: BrainError) -> Self {
        if e.is_retryable() {
            return Self {
                status: StatusCode::SERVICE_UNAVAILABLE,
                detail: format!("Inference gateway not ready: {e}"),
            };
        }
        match e {
            BrainError::InvalidDocument { .. } => {
                Self::unprocessable(format!("Invalid brain data: {e}"))
            }
            other => Self::internal(format!("Processing failed: {other}")),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, detail = %self.detail, "brain request failed");
        } else {
            warn!(status = %self.status, detail = %self.detail, "brain request rejected");
        }
        (self.status, Json(serde_json::json!({ "detail": self.detail }))).into_response()
    }
}
