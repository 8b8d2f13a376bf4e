//! Typed errors and HTTP mapping.

use crate::response::Envelope;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {var}: '{value}'")]
    InvalidValue { var: &'static str, value: String },
    #[error("invalid DATABASE_URL: {0}")]
    InvalidDatabaseUrl(String),
    #[error("unknown storage backend '{0}' (expected 'postgres' or 'memory')")]
    UnknownStorage(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Every violation found, in schema order. Never empty.
    #[error("validation: {}", .0.join("; "))]
    Validation(Vec<String>),
    #[error("invalid book id")]
    InvalidId,
    #[error("book not found")]
    NotFound,
    #[error("request body too large")]
    PayloadTooLarge,
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("internal: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(vec![message.into()])
    }

    /// Status, envelope `error` label and client-facing message.
    pub fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Validation(violations) => (
                StatusCode::BAD_REQUEST,
                "Validation Error",
                violations.first().cloned().unwrap_or_else(|| "Invalid request".into()),
            ),
            AppError::InvalidId => (
                StatusCode::BAD_REQUEST,
                "Invalid ID",
                "Book ID must be a valid number".into(),
            ),
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not Found", "Book not found".into()),
            AppError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "Payload Too Large",
                "Request body is too large".into(),
            ),
            AppError::Db(e) if is_unique_violation(e) => (
                StatusCode::CONFLICT,
                "ConflictError",
                "Resource conflict - duplicate entry".into(),
            ),
            AppError::Db(e) if is_connectivity(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DatabaseError",
                "Database connection error".into(),
            ),
            AppError::Config(_) | AppError::Db(_) | AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "ServerError",
                "Internal Server Error".into(),
            ),
        }
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

fn is_connectivity(e: &sqlx::Error) -> bool {
    matches!(
        e,
        sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
            | sqlx::Error::Configuration(_)
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, label, message) = self.parts();
        if status.is_server_error() {
            tracing::error!(error = %self, label, "request failed");
        } else if let AppError::Validation(violations) = &self {
            tracing::debug!(?violations, "request rejected");
        }
        (status, Json(Envelope::<()>::failure(label, message))).into_response()
    }
}
