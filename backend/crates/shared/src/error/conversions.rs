//! Error conversions
//!
//! Renders [`AppError`] through the shared response envelope.

use super::app_error::AppError;
use crate::response::ApiResponse;

impl From<AppError> for ApiResponse<()> {
    fn from(err: AppError) -> Self {
        ApiResponse::failure(err.status_code(), err.message(), err.errors().to_vec())
    }
}

// ============================================================================
// Axum conversions (feature-gated)
// ============================================================================

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        ApiResponse::from(self).into_response()
    }
}
