//! Error types shared by the services, the store layer and the HTTP API.
//!
//! Errors fall into four categories: validation, not-found,
//! eligibility/conflict and transient infrastructure failures. Only the last
//! category is safe to retry unchanged.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

pub type GigletResult<T> = Result<T, GigletError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GigletError {
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Not eligible: {}", .0.join("; "))]
    Ineligible(Vec<String>),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Missing or invalid API key")]
    Unauthorized,

    #[error("Gig deadline has passed")]
    DeadlinePassed,

    #[error("Gig is closed")]
    GigClosed,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store error: {0}")]
    Store(String),
}

/// Coarse error category, exposed to API clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Eligibility,
    Conflict,
    Transient,
}

impl GigletError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        GigletError::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            GigletError::Validation(_) => ErrorCategory::Validation,
            GigletError::NotFound { .. } => ErrorCategory::NotFound,
            GigletError::Ineligible(_)
            | GigletError::Forbidden(_)
            | GigletError::Unauthorized
            | GigletError::DeadlinePassed
            | GigletError::GigClosed => ErrorCategory::Eligibility,
            GigletError::Conflict(_) => ErrorCategory::Conflict,
            GigletError::Store(_) => ErrorCategory::Transient,
        }
    }

    /// Whether the caller may retry the same request without changing state.
    pub fn is_retryable(&self) -> bool {
        self.category() == ErrorCategory::Transient
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            GigletError::Validation(_) | GigletError::DeadlinePassed | GigletError::GigClosed => {
                StatusCode::BAD_REQUEST
            }
            GigletError::NotFound { .. } => StatusCode::NOT_FOUND,
            GigletError::Ineligible(_) | GigletError::Forbidden(_) => StatusCode::FORBIDDEN,
            GigletError::Unauthorized => StatusCode::UNAUTHORIZED,
            GigletError::Conflict(_) => StatusCode::CONFLICT,
            GigletError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for GigletError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => GigletError::Store("row not found".to_string()),
            sqlx::Error::Database(ref db) if db.code().as_deref() == Some("40001") => {
                GigletError::Store(format!("transaction aborted by concurrent write: {}", db))
            }
            _ => GigletError::Store(e.to_string()),
        }
    }
}

impl From<serde_json::Error> for GigletError {
    fn from(e: serde_json::Error) -> Self {
        GigletError::Store(format!("Failed to decode stored document: {}", e))
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    category: ErrorCategory,
    message: String,
    retryable: bool,
}

impl IntoResponse for GigletError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorBody {
            error: status.canonical_reason().unwrap_or("Error"),
            category: self.category(),
            message: self.to_string(),
            retryable: self.is_retryable(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            GigletError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GigletError::not_found("gig", "g1").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            GigletError::Conflict("taken".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            GigletError::Ineligible(vec!["low trust".into()]).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            GigletError::Store("down".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_only_store_errors_are_retryable() {
        assert!(GigletError::Store("timeout".into()).is_retryable());
        assert!(!GigletError::DeadlinePassed.is_retryable());
        assert!(!GigletError::Conflict("full".into()).is_retryable());
    }

    #[test]
    fn test_ineligible_message_joins_reasons() {
        let err = GigletError::Ineligible(vec!["a".into(), "b".into()]);
        assert_eq!(err.to_string(), "Not eligible: a; b");
    }
}
