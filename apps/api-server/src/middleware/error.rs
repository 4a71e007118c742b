//! Error handling - maps domain failures onto the `{success:false, error}`
//! wire envelope.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use greenlight_shared::ErrorBody;
use std::fmt;

use greenlight_core::error::{DomainError, RepoError};
use greenlight_core::ports::{AuthError, FileStoreError};

/// Application-level error type that converts to JSON error responses.
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    PayloadTooLarge(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::PayloadTooLarge(msg) => write!(f, "Payload too large: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::BadRequest(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::PayloadTooLarge(msg) => ErrorBody::new(msg.clone()),
            AppError::Internal(msg) => {
                // Detail stays server-side; callers get a generic message.
                tracing::error!("Internal error: {}", msg);
                ErrorBody::new("Internal server error")
            }
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity_type, id } => {
                AppError::NotFound(format!("{} with id {} not found", entity_type, id))
            }
            DomainError::Validation(msg) => AppError::BadRequest(msg),
            DomainError::Forbidden(what) => {
                AppError::Forbidden(format!("You are not permitted to {}", what))
            }
            DomainError::InvalidTransition { .. } => AppError::BadRequest(err.to_string()),
            DomainError::Repo(repo) => repo.into(),
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => AppError::NotFound("Resource not found".to_string()),
            RepoError::Constraint(msg) => AppError::BadRequest(msg),
            RepoError::Connection(msg) | RepoError::Query(msg) => {
                tracing::error!("Post store error: {}", msg);
                AppError::Internal("Post store error".to_string())
            }
        }
    }
}

impl From<FileStoreError> for AppError {
    fn from(err: FileStoreError) -> Self {
        match err {
            FileStoreError::InvalidMediaType(_) => {
                AppError::BadRequest("Only image and video files are allowed".to_string())
            }
            FileStoreError::TooLarge { max, .. } => AppError::PayloadTooLarge(format!(
                "File too large. Maximum size is {} bytes.",
                max
            )),
            FileStoreError::MissingPostId => AppError::BadRequest("postId is required".to_string()),
            FileStoreError::NotFound => AppError::NotFound("File not found".to_string()),
            FileStoreError::Io(err) => AppError::Internal(err.to_string()),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidAssertion(detail) => {
                tracing::warn!("ID token verification failed: {}", detail);
                AppError::Unauthorized("Invalid or expired ID token".to_string())
            }
            AuthError::TokenGenerationFailed(detail) => AppError::Internal(detail),
            AuthError::TokenExpired => AppError::Unauthorized(
                "Your session has expired. Please sign in again.".to_string(),
            ),
            AuthError::InvalidToken(detail) => AppError::Unauthorized(detail),
            AuthError::MissingAuth => AppError::Unauthorized(
                "Please provide a valid Bearer token in the Authorization header.".to_string(),
            ),
        }
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;
