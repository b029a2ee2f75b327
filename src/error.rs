//! Application error type and its HTTP mapping.
//!
//! Only errors a caller can act on live here. Cache failures and background
//! increment failures are absorbed where they happen and never become an
//! [`AppError`].

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

use crate::domain::repositories::StoreError;

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Machine-readable error payload.
#[derive(Debug, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

#[derive(Debug, Error)]
pub enum AppError {
    /// The request input was rejected before reaching the engine.
    #[error("{message}")]
    Validation { message: String, details: Value },

    /// No record exists for the requested code.
    #[error("{message}")]
    NotFound { message: String, details: Value },

    /// Every generated candidate collided; the code space needs widening.
    #[error("failed to allocate a unique code after {attempts} attempts")]
    CodeSpaceExhausted { attempts: usize },

    /// A foreground store operation failed; safe to retry.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("{message}")]
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }
    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }
    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    /// Returns true for failures the caller may retry as-is.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::CodeSpaceExhausted { .. } | AppError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Converts the error into its JSON payload.
    pub fn to_error_info(&self) -> ErrorInfo {
        let message = self.to_string();
        match self {
            AppError::Validation { details, .. } => ErrorInfo {
                code: "validation_error",
                message,
                details: details.clone(),
            },
            AppError::NotFound { details, .. } => ErrorInfo {
                code: "not_found",
                message,
                details: details.clone(),
            },
            AppError::CodeSpaceExhausted { attempts } => ErrorInfo {
                code: "code_space_exhausted",
                message,
                details: json!({ "attempts": attempts }),
            },
            // Store internals stay in the logs.
            AppError::StoreUnavailable(_) => ErrorInfo {
                code: "store_unavailable",
                message: "Storage temporarily unavailable".to_string(),
                details: json!({ "retryable": true }),
            },
            AppError::Internal { details, .. } => ErrorInfo {
                code: "internal_error",
                message,
                details: details.clone(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = ErrorBody {
            error: self.to_error_info(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Unavailable(reason) => AppError::StoreUnavailable(reason),
            StoreError::Rejected(reason) => {
                tracing::error!(reason = %reason, "Store rejected operation");
                AppError::internal("Store rejected the request", json!({}))
            }
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        let details = serde_json::to_value(&e).unwrap_or_else(|_| json!({}));
        AppError::bad_request("Request validation failed", details)
    }
}
