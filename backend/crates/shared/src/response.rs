//! Response Envelope
//!
//! Every endpoint answers with the same JSON shape, on success and on error:
//!
//! ```json
//! { "statusCode": 200, "success": true, "message": "...", "data": {...}, "errors": [] }
//! ```

use serde::Serialize;

/// Uniform response envelope
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub status_code: u16,
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
    pub errors: Vec<String>,
}

impl<T> ApiResponse<T> {
    /// Successful response carrying `data`
    pub fn ok(status_code: u16, message: impl Into<String>, data: T) -> Self {
        Self {
            status_code,
            success: status_code < 400,
            message: message.into(),
            data: Some(data),
            errors: Vec::new(),
        }
    }
}

impl ApiResponse<()> {
    /// Error response; `data` is always `null`
    pub fn failure(status_code: u16, message: impl Into<String>, errors: Vec<String>) -> Self {
        Self {
            status_code,
            success: false,
            message: message.into(),
            data: None,
            errors,
        }
    }
}

#[cfg(feature = "axum")]
impl<T: Serialize> axum::response::IntoResponse for ApiResponse<T> {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use axum::http::StatusCode;

        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_envelope_shape() {
        let response = ApiResponse::ok(201, "Successfully registered the user", "alice");
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["statusCode"], 201);
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "Successfully registered the user");
        assert_eq!(json["data"], "alice");
        assert_eq!(json["errors"], serde_json::json!([]));
    }

    #[test]
    fn test_failure_envelope_shape() {
        let response =
            ApiResponse::failure(409, "User with email or username already exists", vec![]);
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["statusCode"], 409);
        assert_eq!(json["success"], false);
        assert!(json["data"].is_null());
    }
}
