//! API error type
//!
//! Every handler surfaces failures through this type so that callers always
//! see a structured `{ message, code }` body; nothing propagates as a panic.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use crate::models::ErrorResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    /// 401: missing, malformed, or stale credentials
    #[error("{message}")]
    Unauthenticated {
        message: String,
        code: &'static str,
    },

    /// 403: authenticated but not permitted
    #[error("{message}")]
    Forbidden { message: String },

    /// 404: referenced item or account absent
    #[error("{message}")]
    NotFound { message: String },

    /// 400: malformed or out-of-range field
    #[error("{message}")]
    Validation { message: String },

    /// 500: persistence failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// 500: anything else that should not leak details
    #[error("{message}")]
    Internal { message: String },
}

impl ApiError {
    pub fn unauthenticated(code: &'static str, message: impl Into<String>) -> Self {
        Self::Unauthenticated {
            message: message.into(),
            code,
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::Unauthenticated { code, .. } => (StatusCode::UNAUTHORIZED, Some(*code)),
            ApiError::Forbidden { .. } => (StatusCode::FORBIDDEN, Some("ACCESS_DENIED")),
            ApiError::NotFound { .. } => (StatusCode::NOT_FOUND, Some("NOT_FOUND")),
            ApiError::Validation { .. } => (StatusCode::BAD_REQUEST, Some("VALIDATION_FAILED")),
            ApiError::Database(e) => {
                error!("Database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, None)
            }
            ApiError::Internal { .. } => (StatusCode::INTERNAL_SERVER_ERROR, None),
        };

        let body = ErrorResponse {
            message: self.to_string(),
            code: code.map(str::to_string),
        };

        (status, Json(body)).into_response()
    }
}
