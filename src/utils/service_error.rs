// Domain error shared by every service and handler.
//
// Each variant decides its HTTP status and machine-readable code once, at
// the place it is raised.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::email::EmailError;
use crate::services::jwt::JwtError;
use crate::store::StoreError;
use crate::utils::password::PasswordError;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Verification token has expired")]
    Expired,

    #[error("Verification token has already been used")]
    AlreadyUsed,

    #[error("Authentication required")]
    Unauthorized,

    #[error("Internal server error: {0}")]
    Internal(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn not_found(what: &str) -> Self {
        ServiceError::NotFound(format!("{} not found", what))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::Expired => StatusCode::BAD_REQUEST,
            ServiceError::AlreadyUsed => StatusCode::BAD_REQUEST,
            ServiceError::Unauthorized => StatusCode::UNAUTHORIZED,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ServiceError::NotFound(_) => "NOT_FOUND",
            ServiceError::Forbidden(_) => "FORBIDDEN",
            ServiceError::Conflict(_) => "CONFLICT",
            ServiceError::BadRequest(_) => "BAD_REQUEST",
            ServiceError::Validation(_) => "VALIDATION_ERROR",
            ServiceError::Expired => "TOKEN_EXPIRED",
            ServiceError::AlreadyUsed => "TOKEN_ALREADY_USED",
            ServiceError::Unauthorized => "UNAUTHORIZED",
            ServiceError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to show a client; internal details stay in the logs
    fn public_message(&self) -> String {
        match self {
            ServiceError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if let ServiceError::Internal(detail) = &self {
            tracing::error!("Internal error: {}", detail);
        }

        let body = Json(json!({
            "success": false,
            "error": self.public_message(),
            "code": self.error_code(),
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<StoreError> for ServiceError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound => ServiceError::NotFound("Resource not found".to_string()),
            StoreError::Conflict(msg) => ServiceError::Conflict(msg),
            StoreError::Database(msg) => ServiceError::Internal(msg),
            StoreError::Pool(msg) => ServiceError::Internal(msg),
        }
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(error: validator::ValidationErrors) -> Self {
        ServiceError::Validation(crate::utils::validation::describe_validation_errors(&error))
    }
}

impl From<PasswordError> for ServiceError {
    fn from(error: PasswordError) -> Self {
        ServiceError::Internal(error.to_string())
    }
}

impl From<JwtError> for ServiceError {
    fn from(error: JwtError) -> Self {
        match error {
            JwtError::TokenExpired | JwtError::InvalidToken(_) => ServiceError::Unauthorized,
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

impl From<EmailError> for ServiceError {
    fn from(error: EmailError) -> Self {
        ServiceError::Internal(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_errors_are_client_errors() {
        assert_eq!(ServiceError::Expired.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ServiceError::AlreadyUsed.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ServiceError::AlreadyUsed.error_code(), "TOKEN_ALREADY_USED");
    }

    #[test]
    fn test_store_errors_map_to_service_errors() {
        assert!(matches!(
            ServiceError::from(StoreError::NotFound),
            ServiceError::NotFound(_)
        ));
        assert!(matches!(
            ServiceError::from(StoreError::Conflict("dup".into())),
            ServiceError::Conflict(_)
        ));
        assert!(matches!(
            ServiceError::from(StoreError::Pool("timeout".into())),
            ServiceError::Internal(_)
        ));
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err = ServiceError::Internal("connection refused to 10.0.0.3".into());
        assert_eq!(err.public_message(), "Internal server error");
        assert_eq!(
            ServiceError::Forbidden("Not your project".into()).public_message(),
            "Not your project"
        );
    }
}
