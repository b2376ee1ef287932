use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// AppError
///
/// The failure taxonomy shared by every service. Each variant is terminal for the
/// request: the services never retry and never swallow one of these.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AppError {
    /// A referenced place, review or user does not exist.
    #[error("{entity} not found with id: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Malformed input, rejected before any persistence call.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The resource exists but the caller may not act on it.
    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// The caller identity could not be established.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Persistence error: {0}")]
    Persistence(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        AppError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::AccessDenied(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Authentication(_) => StatusCode::UNAUTHORIZED,
            AppError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Postgres' default name for the UNIQUE constraint on `users.email`.
pub const EMAIL_CONSTRAINT: &str = "users_email_key";

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        // 23505 = unique_violation; the email constraint is the authoritative duplicate guard.
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some("23505") {
                return match db_err.constraint() {
                    Some(EMAIL_CONSTRAINT) => AppError::Conflict("Email already taken".to_string()),
                    _ => AppError::Conflict("Resource already exists".to_string()),
                };
            }
        }
        AppError::Persistence(err.to_string())
    }
}

/// Maps the taxonomy onto HTTP at the edge. Persistence details are logged, not echoed.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            AppError::Persistence(detail) => {
                tracing::error!("persistence failure: {}", detail);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "message": message }))).into_response()
    }
}

/// ConfigError
///
/// Raised by `AppConfig::load` when the environment cannot produce a usable configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set in production")]
    Missing(&'static str),
}
