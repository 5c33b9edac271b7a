//! Error type system for the member chat backend
//!
//! This module provides the error taxonomy shared by every layer:
//! - Validation / authentication / authorization failures with their
//!   HTTP status code mapping
//! - Structured JSON error responses with trace IDs
//! - Field-level validation details for form-style errors

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Main error type for the member chat backend
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    // System-level errors
    #[error("System initialization failed: {0}")]
    InitializationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    // Client-input errors
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("{message}")]
    ValidationError {
        /// Field the validation failed on, when there is a single culprit
        field: Option<&'static str>,
        message: String,
    },

    // Authentication / authorization errors
    #[error("{0}")]
    AuthenticationError(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // I/O errors
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    // Blocking task errors
    #[error("Task error: {0}")]
    TaskError(String),
}

impl ChatError {
    /// Create a validation error without a field association
    pub fn validation(message: impl Into<String>) -> Self {
        ChatError::ValidationError {
            field: None,
            message: message.into(),
        }
    }

    /// Create a validation error tied to a single request field
    pub fn field_validation(field: &'static str, message: impl Into<String>) -> Self {
        ChatError::ValidationError {
            field: Some(field),
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            ChatError::InvalidRequest(_) | ChatError::ValidationError { .. } => {
                StatusCode::BAD_REQUEST
            }

            // 401 Unauthorized
            ChatError::AuthenticationError(_) => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            ChatError::PermissionDenied(_) => StatusCode::FORBIDDEN,

            // 404 Not Found
            ChatError::NotFound(_) => StatusCode::NOT_FOUND,

            // 500 Internal Server Error
            ChatError::InitializationError(_)
            | ChatError::ConfigError(_)
            | ChatError::DatabaseError(_)
            | ChatError::IoError(_)
            | ChatError::TaskError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error type name for API responses
    pub fn error_type(&self) -> &'static str {
        match self {
            ChatError::InitializationError(_) => "InitializationError",
            ChatError::ConfigError(_) => "ConfigError",
            ChatError::DatabaseError(_) => "DatabaseError",
            ChatError::InvalidRequest(_) => "InvalidRequest",
            ChatError::ValidationError { .. } => "ValidationError",
            ChatError::AuthenticationError(_) => "AuthenticationError",
            ChatError::PermissionDenied(_) => "PermissionDenied",
            ChatError::NotFound(_) => "NotFound",
            ChatError::IoError(_) => "IoError",
            ChatError::TaskError(_) => "TaskError",
        }
    }
}

/// Error response structure for API endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error type identifier
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Optional field-level details, e.g. {"username": ["..."]}
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Unique trace ID for this error
    pub trace_id: String,
}

impl ErrorResponse {
    /// Create a new error response with a generated trace ID
    pub fn new(error: String, message: String) -> Self {
        Self {
            error,
            message,
            details: None,
            trace_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an error response from a ChatError
    ///
    /// Field-bound validation errors carry a details object mapping the
    /// offending field to its message list.
    pub fn from_error(error: &ChatError) -> Self {
        let mut response = Self::new(error.error_type().to_string(), error.to_string());
        if let ChatError::ValidationError {
            field: Some(field),
            message,
        } = error
        {
            response.details = Some(serde_json::json!({ *field: [message] }));
        }
        response
    }
}

/// Implement IntoResponse for ChatError to enable automatic error handling in Axum
impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        let error_response = ErrorResponse::from_error(&self);

        tracing::error!(
            error_type = self.error_type(),
            trace_id = %error_response.trace_id,
            status_code = %status_code,
            "Request failed: {}",
            self
        );

        (status_code, Json(error_response)).into_response()
    }
}

/// Result type alias for operations that can fail with ChatError
pub type Result<T> = std::result::Result<T, ChatError>;
