use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use thiserror::Error;
use tracing::error;

use crate::schemas::ErrorResponse;

/// Error types for the API surface.
///
/// `NotFound` is deliberately identical for "does not exist" and "exists but
/// belongs to another organization", so callers cannot probe foreign data.
#[derive(Error, Debug)]
pub enum ApiError {
    /// No principal could be resolved for the request
    #[error("Authentication required")]
    Unauthorized,

    /// The principal is authenticated but lacks the organizer role
    #[error("Organizer role required")]
    Forbidden,

    /// The id is absent or outside the caller's visible scope
    #[error("Resource not found")]
    NotFound,

    /// Malformed or out-of-scope input
    #[error("{0}")]
    Validation(String),

    /// Error from the database operations
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Error from credential hashing
    #[error("Credential error: {0}")]
    Credential(String),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            ApiError::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            ApiError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
            ApiError::Credential(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CREDENTIAL_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Internal failures are logged but not echoed back to the client
        let message = match &self {
            ApiError::Database(db_error) => {
                error!("Database error: {}", db_error);
                "Internal server error".to_string()
            }
            ApiError::Credential(reason) => {
                error!("Credential error: {}", reason);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorResponse {
            error: message,
            code: code.to_string(),
            success: false,
        };

        (status, Json(body)).into_response()
    }
}

/// Map an insert failure to a friendlier validation error when it is a
/// unique-constraint violation (e.g., duplicate username).
pub fn map_unique_violation(db_error: sea_orm::DbErr, what: &str) -> ApiError {
    let message = db_error.to_string().to_lowercase();
    if message.contains("unique") || message.contains("constraint") {
        ApiError::Validation(format!("{what} already exists"))
    } else {
        ApiError::Database(db_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_and_foreign_scope_are_indistinguishable() {
        let (status, code) = ApiError::NotFound.status_and_code();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(code, "NOT_FOUND");
    }

    #[test]
    fn unique_violation_maps_to_validation() {
        let err = sea_orm::DbErr::Custom("UNIQUE constraint failed: users.username".to_string());
        match map_unique_violation(err, "Username") {
            ApiError::Validation(msg) => assert_eq!(msg, "Username already exists"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
