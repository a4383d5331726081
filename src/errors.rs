//! Centralized error handling.
//!
//! Every operation returns an explicit `AppError` kind; translation to
//! transport status codes happens only here, in `IntoResponse`, at the
//! HTTP boundary.

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Field name to list-of-messages mapping produced by request validation.
///
/// Ordered so error bodies are deterministic.
pub type ValidationFailure = BTreeMap<String, Vec<String>>;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication
    #[error("Authentication required")]
    Unauthorized,

    #[error("Login credentials are invalid")]
    InvalidCredentials,

    // Client input
    #[error("Validation failed")]
    Validation(ValidationFailure),

    #[error("Invalid input: {0}")]
    BadRequest(String),

    // Resources
    #[error("Resource not found")]
    NotFound,

    // Provisioning faults (registration transaction and its collaborators)
    #[error("{0}")]
    Provisioning(String),

    #[error("Card number space exhausted after {attempts} attempts")]
    CardSpaceExhausted { attempts: u32 },

    #[error("{0}")]
    ImageDecode(String),

    #[error("{0}")]
    Storage(String),

    // External collaborators
    #[error("Token issuance failed")]
    TokenIssuance(#[source] jsonwebtoken::errors::Error),

    #[error("Database error")]
    Database(#[from] sea_orm::DbErr),

    #[error("Cache error: {0}")]
    Cache(String),

    // Internal
    #[error("Internal server error")]
    Internal(String),
}

/// Error body for validation failures: `{"errors": {field: [messages]}}`
#[derive(Debug, Serialize)]
struct ValidationErrorBody<'a> {
    errors: &'a ValidationFailure,
}

/// Error body for everything else: `{"message": "..."}`
#[derive(Debug, Serialize)]
struct MessageErrorBody {
    message: String,
}

impl AppError {
    /// Get HTTP status code
    fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::InvalidCredentials | AppError::Validation(_) | AppError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Provisioning(_)
            | AppError::CardSpaceExhausted { .. }
            | AppError::ImageDecode(_)
            | AppError::Storage(_)
            | AppError::TokenIssuance(_)
            | AppError::Database(_)
            | AppError::Cache(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get user-facing message (hides internal details)
    fn user_message(&self) -> String {
        match self {
            // Provisioning faults surface their cause
            AppError::Provisioning(msg) => msg.clone(),
            AppError::BadRequest(msg) => msg.clone(),

            // Hide details for internal/security errors
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "A database error occurred".to_string()
            }
            AppError::TokenIssuance(e) => {
                tracing::error!("Token issuance error: {:?}", e);
                "Token issuance failed".to_string()
            }
            AppError::Cache(msg) => {
                tracing::error!("Cache error: {}", msg);
                "An internal error occurred".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }

            // Use default message for others
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        match self {
            AppError::Validation(errors) => {
                (status, Json(ValidationErrorBody { errors: &errors })).into_response()
            }
            other => {
                let body = MessageErrorBody {
                    message: other.user_message(),
                };
                (status, Json(body)).into_response()
            }
        }
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Convenience constructors
impl AppError {
    /// Validation failure attributed to a single field
    pub fn validation_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = ValidationFailure::new();
        errors.insert(field.into(), vec![message.into()]);
        AppError::Validation(errors)
    }

    pub fn provisioning(msg: impl Into<String>) -> Self {
        AppError::Provisioning(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    /// Fold collaborator faults that occurred during registration into a
    /// provisioning fault carrying the underlying cause. Kinds that callers
    /// distinguish (card-space exhaustion, token issuance, validation) pass
    /// through unchanged.
    pub fn into_provisioning(self) -> Self {
        match self {
            AppError::Database(e) => AppError::Provisioning(e.to_string()),
            AppError::Storage(msg) | AppError::ImageDecode(msg) => AppError::Provisioning(msg),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_bad_request() {
        let err = AppError::validation_field("pin", "PIN must be exactly 6 digits");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn provisioning_faults_are_server_errors() {
        assert_eq!(
            AppError::provisioning("wallet insert failed").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::CardSpaceExhausted { attempts: 10 }.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn invalid_credentials_never_name_a_field() {
        let err = AppError::InvalidCredentials;
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        let msg = err.user_message();
        assert!(!msg.contains("email"));
        assert!(!msg.contains("password"));
    }

    #[test]
    fn storage_fault_folds_into_provisioning_with_cause() {
        let err = AppError::Storage("disk full".to_string()).into_provisioning();
        assert!(matches!(err, AppError::Provisioning(ref msg) if msg == "disk full"));
    }
}
