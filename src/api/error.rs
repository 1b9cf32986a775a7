//! API error types for the OpenProject client.

use serde_json::Value;
use thiserror::Error;

/// The body of a failed API response.
///
/// Keeps the raw response text plus a best-effort JSON parse of it.
/// OpenProject error bodies are normally JSON documents carrying a
/// `message` field, but a proxy or an HTML error page can break that
/// assumption; a failed parse is recorded as `json: None` rather than
/// raised, so callers must guard for an absent body.
#[derive(Debug, Clone)]
pub struct ErrorBody {
    text: String,
    json: Option<Value>,
}

impl ErrorBody {
    /// Capture a response body, attempting to parse it as JSON.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let json = serde_json::from_str(&text).ok();
        Self { text, json }
    }

    /// The raw response text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The parsed JSON body, absent if the text was not valid JSON.
    pub fn json(&self) -> Option<&Value> {
        self.json.as_ref()
    }

    /// The remote error's own `message` field, when the body parsed.
    pub fn message(&self) -> Option<&str> {
        self.json.as_ref()?.get("message")?.as_str()
    }
}

/// Errors that can occur when interacting with the OpenProject API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Authentication failed - invalid or revoked API key.
    #[error("authentication failed: OpenProject rejected the API key")]
    Unauthorized(ErrorBody),

    /// Any other non-2xx response from the API.
    #[error("OpenProject API error (HTTP {status})")]
    Api {
        /// The HTTP status code of the response.
        status: u16,
        /// The response body.
        body: ErrorBody,
    },

    /// Network or HTTP transport error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A 2xx response whose body could not be decoded as expected.
    #[error("invalid API response: {0}")]
    InvalidResponse(String),
}

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// Classify a non-2xx response by its status code.
    ///
    /// 401 becomes [`ApiError::Unauthorized`]; every other status becomes
    /// a generic [`ApiError::Api`] carrying the code.
    pub fn from_status(status: reqwest::StatusCode, text: impl Into<String>) -> Self {
        let body = ErrorBody::new(text);
        match status.as_u16() {
            401 => ApiError::Unauthorized(body),
            code => ApiError::Api { status: code, body },
        }
    }

    /// The HTTP status code, when this error carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized(_) => Some(401),
            ApiError::Api { status, .. } => Some(*status),
            ApiError::Network(e) => e.status().map(|s| s.as_u16()),
            ApiError::InvalidResponse(_) => None,
        }
    }

    /// The response body, when this error carries one.
    pub fn body(&self) -> Option<&ErrorBody> {
        match self {
            ApiError::Unauthorized(body) | ApiError::Api { body, .. } => Some(body),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_401() {
        let err = ApiError::from_status(StatusCode::UNAUTHORIZED, "{}");
        assert!(matches!(err, ApiError::Unauthorized(_)));
        assert_eq!(err.status(), Some(401));
    }

    #[test]
    fn test_from_status_404() {
        let err = ApiError::from_status(StatusCode::NOT_FOUND, "missing");
        match err {
            ApiError::Api { status, .. } => assert_eq!(status, 404),
            _ => panic!("Expected generic Api error"),
        }
    }

    #[test]
    fn test_from_status_500() {
        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "boom");
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn test_error_body_parses_json() {
        let body = ErrorBody::new(r#"{"message": "Project not visible"}"#);
        assert!(body.json().is_some());
        assert_eq!(body.message(), Some("Project not visible"));
    }

    #[test]
    fn test_error_body_invalid_json_is_absent() {
        let body = ErrorBody::new("<html>502 Bad Gateway</html>");
        assert!(body.json().is_none());
        assert_eq!(body.message(), None);
        assert_eq!(body.text(), "<html>502 Bad Gateway</html>");
    }

    #[test]
    fn test_error_body_empty_text() {
        let body = ErrorBody::new("");
        assert!(body.json().is_none());
        assert_eq!(body.message(), None);
    }

    #[test]
    fn test_error_body_json_without_message() {
        let body = ErrorBody::new(r#"{"errorIdentifier": "urn:openproject-org:api:v3:errors:NotFound"}"#);
        assert!(body.json().is_some());
        assert_eq!(body.message(), None);
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::from_status(StatusCode::BAD_GATEWAY, "");
        assert_eq!(err.to_string(), "OpenProject API error (HTTP 502)");
    }
}
