//! Mapping failed API responses into typed errors.
//!
//! The signers never touch this module; callers use it after a signed
//! request comes back with a non-2xx status.

use http::StatusCode;
use serde::Deserialize;

/// Shape of the JSON error body the Cinco API returns.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Option<serde_json::Value>,
}

/// Typed error built from a failed API response.
#[derive(Debug, thiserror::Error)]
#[error("{status_code}: {user_message}")]
pub struct ApiError {
    status_code: StatusCode,
    user_message: String,
    details: Option<serde_json::Value>,
}

impl ApiError {
    /// Build a typed error from a response's status and raw body.
    ///
    /// Bodies that are not JSON or carry no `message` fall back to the
    /// status line's canonical reason so callers always get something
    /// printable.
    pub fn from_response(status_code: StatusCode, body: &[u8]) -> Self {
        let parsed: ErrorBody = serde_json::from_slice(body).unwrap_or_default();
        let user_message = parsed.message.unwrap_or_else(|| {
            status_code
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string()
        });

        Self {
            status_code,
            user_message,
            details: parsed.details,
        }
    }

    /// The HTTP status the API answered with.
    pub fn status_code(&self) -> StatusCode {
        self.status_code
    }

    /// Human readable message, taken from the body when present.
    pub fn user_message(&self) -> &str {
        &self.user_message
    }

    /// Structured details the API attached to the error, if any.
    pub fn details(&self) -> Option<&serde_json::Value> {
        self.details.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_from_json_body() {
        let body = br#"{"message":"project not found","details":{"projectId":"p-42"}}"#;
        let err = ApiError::from_response(StatusCode::NOT_FOUND, body);

        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.user_message(), "project not found");
        assert_eq!(err.details(), Some(&json!({"projectId": "p-42"})));
        assert_eq!(err.to_string(), "404 Not Found: project not found");
    }

    #[test]
    fn test_from_message_only_body() {
        let body = br#"{"message":"signature mismatch"}"#;
        let err = ApiError::from_response(StatusCode::FORBIDDEN, body);

        assert_eq!(err.user_message(), "signature mismatch");
        assert!(err.details().is_none());
    }

    #[test]
    fn test_from_non_json_body() {
        let err = ApiError::from_response(StatusCode::INTERNAL_SERVER_ERROR, b"<html>oops</html>");

        assert_eq!(err.user_message(), "Internal Server Error");
        assert!(err.details().is_none());
    }

    #[test]
    fn test_from_empty_body() {
        let err = ApiError::from_response(StatusCode::BAD_GATEWAY, b"");

        assert_eq!(err.user_message(), "Bad Gateway");
    }
}
