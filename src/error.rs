// Relay error taxonomy: validation failures (400) and provider failures (500).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::config::{INVALID_BODY_MESSAGE, MISSING_URL_MESSAGE, RELAY_FAILURE_MESSAGE};
use crate::models::ErrorEnvelope;

/// Anything that went wrong while talking to the provider.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("provider timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    #[error("could not connect to provider: {0}")]
    Connect(#[source] reqwest::Error),

    #[error("provider returned HTTP {status}")]
    Status { status: u16, body: String },

    #[error("provider response is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("provider request failed: {0}")]
    Request(#[source] reqwest::Error),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout(e)
        } else if e.is_connect() {
            Self::Connect(e)
        } else {
            Self::Request(e)
        }
    }
}

impl UpstreamError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout(_) => "timeout",
            Self::Connect(_) => "connect",
            Self::Status { .. } => "status",
            Self::Decode(_) => "decode",
            Self::Request(_) => "request",
        }
    }

    /// Upstream HTTP status, when the provider answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Timeout(e) | Self::Connect(e) | Self::Request(e) => {
                e.status().map(|s| s.as_u16())
            }
            Self::Decode(_) => None,
        }
    }

    /// The `details` payload of the error envelope.
    pub fn details(&self) -> Value {
        let mut details = json!({
            "kind": self.kind(),
            "message": error_chain(self),
        });
        if let Some(status) = self.status() {
            details["status"] = json!(status);
        }
        if let Self::Status { body, .. } = self {
            if !body.is_empty() {
                details["body"] = json!(body);
            }
        }
        details
    }
}

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("request body is not JSON: {0}")]
    InvalidBody(#[source] serde_json::Error),

    #[error("url is missing or empty")]
    MissingUrl,

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl RelayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidBody(_) | Self::MissingUrl => StatusCode::BAD_REQUEST,
            Self::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn envelope(&self) -> ErrorEnvelope {
        match self {
            Self::InvalidBody(_) => ErrorEnvelope::new(INVALID_BODY_MESSAGE),
            Self::MissingUrl => ErrorEnvelope::new(MISSING_URL_MESSAGE),
            Self::Upstream(e) => ErrorEnvelope::with_details(RELAY_FAILURE_MESSAGE, e.details()),
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.envelope())).into_response()
    }
}

/// Render an error and its sources as a single `a: b: c` line.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        // thiserror's `{0}` formatting already inlines the first cause.
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_are_client_errors() {
        assert_eq!(RelayError::MissingUrl.status_code(), StatusCode::BAD_REQUEST);
        let envelope = RelayError::MissingUrl.envelope();
        assert_eq!(envelope.error, MISSING_URL_MESSAGE);
        assert!(envelope.details.is_none());

        let bad_json = serde_json::from_str::<Value>("{").unwrap_err();
        let err = RelayError::InvalidBody(bad_json);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.envelope().error, INVALID_BODY_MESSAGE);
    }

    #[test]
    fn test_status_error_details() {
        let err = RelayError::from(UpstreamError::Status {
            status: 503,
            body: "maintenance".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let envelope = err.envelope();
        assert_eq!(envelope.error, RELAY_FAILURE_MESSAGE);
        let details = envelope.details.unwrap();
        assert_eq!(details["kind"], "status");
        assert_eq!(details["status"], 503);
        assert_eq!(details["message"], "provider returned HTTP 503");
        assert_eq!(details["body"], "maintenance");
    }

    #[test]
    fn test_decode_error_details_have_no_status() {
        let decode = serde_json::from_str::<Value>("<html>").unwrap_err();
        let details = UpstreamError::from(decode).details();
        assert_eq!(details["kind"], "decode");
        assert!(details.get("status").is_none());
        assert!(details.get("body").is_none());
        assert!(details["message"]
            .as_str()
            .unwrap()
            .starts_with("provider response is not valid JSON"));
    }
}
