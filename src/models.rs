// Wire shapes accepted and produced by the relay routes.

use serde::Serialize;
use serde_json::Value;

use crate::error::RelayError;

/// Inbound `{ "url": "..." }` body, already validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub url: String,
}

impl DownloadRequest {
    /// Parse a raw request body.
    ///
    /// Only the presence of a non-empty string `url` is checked. Anything else in the
    /// body is ignored and the link itself is forwarded as-is.
    pub fn from_body(body: &[u8]) -> Result<Self, RelayError> {
        let value: Value = serde_json::from_slice(body).map_err(RelayError::InvalidBody)?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self, RelayError> {
        match value.get("url").and_then(Value::as_str) {
            Some(url) if !url.is_empty() => Ok(Self {
                url: url.to_string(),
            }),
            _ => Err(RelayError::MissingUrl),
        }
    }
}

/// Error body produced by the relay itself, never by the provider.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEnvelope {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ErrorEnvelope {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(error: impl Into<String>, details: Value) -> Self {
        Self {
            error: error.into(),
            details: Some(details),
        }
    }
}

/// Static payload answered on a plain `GET` of the relay route.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    pub status: String,
    pub service: String,
    pub message: String,
    pub usage: String,
}

impl ServiceStatus {
    pub fn ready() -> Self {
        Self {
            status: "success".to_string(),
            service: env!("CARGO_PKG_NAME").to_string(),
            message: "TikTok downloader relay ready".to_string(),
            usage: r#"POST a JSON body { "url": "<tiktok link>" }"#.to_string(),
        }
    }
}
