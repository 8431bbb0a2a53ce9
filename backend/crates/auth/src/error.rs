//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.
//!
//! Token failures keep their subkind for logs and tests, but all of them
//! render the same client-facing 401 message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

use crate::domain::services::TokenCodecError;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Message shared by every rejected token
const UNAUTHORIZED_TOKEN_MESSAGE: &str = "Unauthorized request";

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// One or more required fields are blank
    #[error("All fields are required")]
    MissingFields(Vec<String>),

    /// Malformed input (email format, over-long values, ...)
    #[error("{0}")]
    Validation(String),

    /// Registration without an avatar file
    #[error("Avatar is required")]
    AvatarRequired,

    /// Username or email already registered
    #[error("User with email or username already exists")]
    UserAlreadyExists,

    /// No identity matches the login identifier
    #[error("User does not exist")]
    UserNotFound,

    /// Login without identifier or password
    #[error("{0}")]
    MissingCredentials(&'static str),

    /// Wrong password
    #[error("Invalid user credentials")]
    InvalidCredentials,

    /// Neither cookie nor bearer header carried a token
    #[error("Token is missing")]
    MissingToken,

    /// Bad signature, wrong secret, malformed token or wrong type tag
    #[error("Token signature is invalid")]
    InvalidSignature,

    /// `now > exp`
    #[error("Token has expired")]
    TokenExpired,

    /// Well-formed token whose subject no longer exists
    #[error("Token subject does not exist")]
    InvalidSubject,

    /// Refresh token differs from the stored one (rotated away, logged out,
    /// or lost a concurrent rotation)
    #[error("Refresh token does not match the active session")]
    RefreshTokenMismatch,

    /// External asset upload failed
    #[error("Error while uploading asset: {0}")]
    Upload(String),

    /// Repository call exceeded the configured timeout
    #[error("Store call timed out")]
    StoreTimeout,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::MissingFields(_) | AuthError::Validation(_) | AuthError::AvatarRequired => {
                ErrorKind::BadRequest
            }
            AuthError::UserAlreadyExists => ErrorKind::Conflict,
            AuthError::UserNotFound => ErrorKind::NotFound,
            AuthError::MissingCredentials(_)
            | AuthError::InvalidCredentials
            | AuthError::MissingToken
            | AuthError::InvalidSignature
            | AuthError::TokenExpired
            | AuthError::InvalidSubject
            | AuthError::RefreshTokenMismatch => ErrorKind::Unauthorized,
            AuthError::Upload(_) => ErrorKind::BadGateway,
            AuthError::StoreTimeout | AuthError::Database(_) | AuthError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// True for failures raised while verifying or rotating a token
    pub fn is_token_rejection(&self) -> bool {
        matches!(
            self,
            AuthError::MissingToken
                | AuthError::InvalidSignature
                | AuthError::TokenExpired
                | AuthError::InvalidSubject
                | AuthError::RefreshTokenMismatch
        )
    }

    /// Message rendered to the client
    fn client_message(&self) -> String {
        match self {
            e if e.is_token_rejection() => UNAUTHORIZED_TOKEN_MESSAGE.to_string(),
            AuthError::Upload(_) => "Error while uploading avatar".to_string(),
            AuthError::Internal(msg) => msg.clone(),
            AuthError::StoreTimeout | AuthError::Database(_) => "Something went wrong".to_string(),
            other => other.to_string(),
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        let app_error = AppError::new(self.kind(), self.client_message());
        match self {
            AuthError::MissingFields(fields) => fields
                .iter()
                .fold(app_error, |err, field| err.with_error(format!("{field} is required"))),
            _ => app_error,
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::StoreTimeout => {
                tracing::error!("Auth store call timed out");
            }
            AuthError::Upload(msg) => {
                tracing::error!(message = %msg, "Asset upload failed");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::RefreshTokenMismatch => {
                tracing::warn!("Refresh token does not match the active session");
            }
            e if e.is_token_rejection() => {
                tracing::warn!(reason = %e, "Token rejected");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        match err.kind() {
            ErrorKind::BadRequest => AuthError::Validation(err.message().to_string()),
            _ => AuthError::Internal(err.to_string()),
        }
    }
}

impl From<TokenCodecError> for AuthError {
    fn from(err: TokenCodecError) -> Self {
        match err {
            TokenCodecError::Malformed | TokenCodecError::BadSignature => {
                AuthError::InvalidSignature
            }
            TokenCodecError::Encode(e) => AuthError::Internal(format!("Token signing failed: {e}")),
        }
    }
}
