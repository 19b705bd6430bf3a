use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use super::{dto::ErrorResponse, validation::FieldError};
use crate::storage::StoreError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("validation failed")]
    Validation(Vec<FieldError>),

    #[error("Username already exists")]
    DuplicateUser,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    #[error("password hashing failed: {0}")]
    Hashing(String),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::Validation(_) | AuthError::DuplicateUser => StatusCode::BAD_REQUEST,
            AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::StoreUnavailable(_) | AuthError::Hashing(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            AuthError::Validation(details) => ErrorResponse {
                error: "Validation failed".into(),
                details: Some(details),
            },
            AuthError::DuplicateUser => ErrorResponse::new("Username already exists"),
            AuthError::InvalidCredentials => ErrorResponse::new("Invalid credentials"),
            other => {
                error!(error = %other, "internal error");
                ErrorResponse::new("Internal server error")
            }
        };
        (status, Json(body)).into_response()
    }
}
