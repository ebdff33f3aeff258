//! Error types shared across the service.
//!
//! Every failure a handler can see is an [`AppError`]; the `IntoResponse`
//! impl translates it to an HTTP status and a JSON `{"detail": ...}` body,
//! so nothing propagates unhandled to the transport layer.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Result alias used throughout the workspace.
pub type AppResult<T> = Result<T, AppError>;

/// Application error taxonomy.
#[derive(Debug, Error)]
pub enum AppError {
    /// The pool never came up at startup; the service runs degraded and
    /// every report call fails fast.
    #[error("Service unavailable: the connection pool failed to initialize.")]
    PoolUnavailable,

    /// All pooled connections are leased and the acquire timed out.
    #[error("Connection pool exhausted: {0}")]
    PoolExhausted(String),

    /// The database rejected or aborted the report query. The raw driver
    /// message is surfaced to the caller for operability.
    #[error("Failed to query the database: {0}")]
    QueryExecution(String),

    /// The environment-supplied configuration is unusable.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl AppError {
    /// HTTP status this error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::PoolUnavailable | AppError::PoolExhausted(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::QueryExecution(_) | AppError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// JSON error body returned to clients.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Human-readable error message.
    pub detail: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let detail = self.to_string();

        if status.is_server_error() {
            tracing::error!(status = %status, error = %detail, "request failed");
        }

        (status, Json(ErrorBody { detail })).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut => AppError::PoolExhausted(
                "timed out waiting for a connection from the pool".to_string(),
            ),
            other => AppError::QueryExecution(other.to_string()),
        }
    }
}
