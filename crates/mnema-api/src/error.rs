//! Error-to-response mapping for the HTTP surface.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use mnema_core::Error;

/// Wrapper turning core errors into caller-visible JSON error bodies.
///
/// Every body carries `success: false`, a human-readable `error`, and
/// the machine-checkable `code`; provider-backed failures also carry
/// the upstream `provider_status`.
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

/// HTTP status for a given error code.
pub fn status_for(code: &str) -> StatusCode {
    match code {
        "INVALID_INPUT" | "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
        "UNAUTHORIZED" => StatusCode::UNAUTHORIZED,
        "NOT_FOUND" => StatusCode::NOT_FOUND,
        "QUOTA_EXHAUSTED" => StatusCode::TOO_MANY_REQUESTS,
        "PROVIDER_ERROR" | "PARSE_ERROR" => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.0.code();
        let mut body = serde_json::json!({
            "success": false,
            "error": self.0.to_string(),
            "code": code,
        });
        if let Some(provider_status) = self.0.provider_status() {
            body["provider_status"] = serde_json::json!(provider_status);
        }
        (status_for(code), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for("INVALID_INPUT"), StatusCode::BAD_REQUEST);
        assert_eq!(status_for("VALIDATION_ERROR"), StatusCode::BAD_REQUEST);
        assert_eq!(status_for("UNAUTHORIZED"), StatusCode::UNAUTHORIZED);
        assert_eq!(status_for("NOT_FOUND"), StatusCode::NOT_FOUND);
        assert_eq!(status_for("QUOTA_EXHAUSTED"), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(status_for("PROVIDER_ERROR"), StatusCode::BAD_GATEWAY);
        assert_eq!(status_for("PARSE_ERROR"), StatusCode::BAD_GATEWAY);
        assert_eq!(
            status_for("DATABASE_ERROR"),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_quota_body_distinguishes_itself() {
        let err = ApiError(Error::QuotaExhausted {
            status: Some(429),
            message: "quota exceeded".to_string(),
        });
        let code = err.0.code();
        assert_eq!(code, "QUOTA_EXHAUSTED");
        assert_eq!(err.0.provider_status(), Some(429));
    }
}
