//! Error types for the Biblioteca server

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use sqlx::error::ErrorKind;
use thiserror::Error;

/// SQLSTATE raised by `RAISE EXCEPTION` in the reservation procedures
const PROCEDURE_SIGNAL: &str = "P0001";

/// Machine readable error codes returned next to the message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    NotAuthenticated = 2,
    NotAuthorized = 3,
    DbFailure = 4,
    NotFound = 5,
    BadValue = 6,
    Duplicate = 7,
    HasDependents = 8,
    RuleViolation = 9,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Has dependents: {0}")]
    Conflict(String),

    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Classify a database error.
    ///
    /// Constraint violations become client errors carrying the given
    /// messages; a procedure signal carries the procedure's own message.
    pub fn from_db(err: sqlx::Error, duplicate: &str, dependents: &str) -> Self {
        if let sqlx::Error::Database(ref db) = err {
            if db.code().as_deref() == Some(PROCEDURE_SIGNAL) {
                return AppError::BusinessRule(db.message().to_string());
            }
            match db.kind() {
                ErrorKind::UniqueViolation => return AppError::Duplicate(duplicate.to_string()),
                ErrorKind::ForeignKeyViolation => return AppError::Conflict(dependents.to_string()),
                ErrorKind::CheckViolation | ErrorKind::NotNullViolation => {
                    return AppError::Validation(format!("Invalid value ({})", db.constraint().unwrap_or("constraint")))
                }
                _ => {}
            }
        }
        AppError::Database(err)
    }

    /// Name of the violated constraint, when the error carries one
    pub fn constraint_of(err: &sqlx::Error) -> Option<&str> {
        match err {
            sqlx::Error::Database(db) => db.constraint(),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::from_db(err, "Record already exists", "Record has dependent records")
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = Vec::new();
        for (field, field_errors) in errors.field_errors() {
            for error in field_errors {
                match &error.message {
                    Some(message) => messages.push(message.to_string()),
                    None => messages.push(format!("Invalid value for {}", field)),
                }
            }
        }
        messages.sort();
        AppError::Validation(messages.join("; "))
    }
}

/// Extension for repository calls that know which resource they touch
pub trait DbResultExt<T> {
    fn map_constraint(self, duplicate: &str, dependents: &str) -> AppResult<T>;

    /// Like `map_constraint`, for inserts whose foreign key names a record
    /// supplied by the client: a missing referenced row is a bad value.
    fn map_reference(self, duplicate: &str, missing: &str) -> AppResult<T>;
}

impl<T> DbResultExt<T> for Result<T, sqlx::Error> {
    fn map_constraint(self, duplicate: &str, dependents: &str) -> AppResult<T> {
        self.map_err(|e| AppError::from_db(e, duplicate, dependents))
    }

    fn map_reference(self, duplicate: &str, missing: &str) -> AppResult<T> {
        self.map_err(|e| match AppError::from_db(e, duplicate, missing) {
            AppError::Conflict(msg) => AppError::Validation(msg),
            other => other,
        })
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl AppError {
    fn parts(&self) -> (StatusCode, ErrorCode, String) {
        match self {
            AppError::Authentication(msg) => {
                (StatusCode::UNAUTHORIZED, ErrorCode::NotAuthenticated, msg.clone())
            }
            AppError::Authorization(msg) => {
                (StatusCode::FORBIDDEN, ErrorCode::NotAuthorized, msg.clone())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorCode::NotFound, msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone()),
            AppError::Duplicate(msg) => (StatusCode::BAD_REQUEST, ErrorCode::Duplicate, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, ErrorCode::HasDependents, msg.clone()),
            AppError::BusinessRule(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::RuleViolation, msg.clone())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::DbFailure,
                    "Database error".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Failure,
                    "Internal server error".to_string(),
                )
            }
        }
    }

    /// HTTP status this error is reported with
    pub fn status(&self) -> StatusCode {
        self.parts().0
    }

    /// Message safe to show to a client
    pub fn public_message(&self) -> String {
        self.parts().2
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, error) = self.parts();

        let details = match &self {
            AppError::Duplicate(_) | AppError::Conflict(_) => Some(format!("{:?}", code)),
            _ => None,
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error,
            details,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Rated {
        #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
        calificacion: Option<i16>,
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::Authentication("x".into()).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Authorization("x".into()).status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::Duplicate("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Conflict("x".into()).status(), StatusCode::CONFLICT);
        assert_eq!(AppError::BusinessRule("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Internal("x".into()).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_internal_message_is_not_leaked() {
        let err = AppError::Internal("relation \"usuarios\" does not exist".into());
        assert_eq!(err.public_message(), "Internal server error");

        let err = AppError::from(sqlx::Error::RowNotFound);
        assert_eq!(err.public_message(), "Database error");
    }

    #[test]
    fn test_non_database_error_is_opaque() {
        let err = AppError::from_db(sqlx::Error::PoolTimedOut, "dup", "deps");
        assert!(matches!(err, AppError::Database(_)));
    }

    #[test]
    fn test_validation_errors_are_bad_requests() {
        let rated = Rated { calificacion: Some(9) };
        let err: AppError = rated.validate().unwrap_err().into();
        match err {
            AppError::Validation(msg) => assert_eq!(msg, "Rating must be between 1 and 5"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
