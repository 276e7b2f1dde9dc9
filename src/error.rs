//! Unified error types for the alert tracker.

use thiserror::Error;

/// Maximum number of response body characters kept for diagnostics.
pub const BODY_EXCERPT_CHARS: usize = 300;

/// Unified error type for the alert tracker.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration loaded but failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Upstream data acquisition error.
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Notification delivery error.
    #[error("notify error: {0}")]
    Notify(#[from] NotifyError),

    /// JSON parsing error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while talking to the Gamma and CLOB endpoints.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Non-retryable status, or a retryable one that outlived the retry budget.
    #[error("{method} {url} -> {status}: {body}")]
    Upstream {
        /// HTTP method of the failed request.
        method: String,
        /// Request URL (without query string).
        url: String,
        /// Last HTTP status received.
        status: u16,
        /// Leading excerpt of the response body.
        body: String,
    },

    /// The event endpoint returned an empty or malformed payload.
    #[error("event {event_id} not found or unexpected response")]
    NotFound {
        /// The requested event identifier.
        event_id: u64,
    },

    /// Connection, TLS or timeout failure. Never retried.
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not valid JSON.
    #[error("failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// Configured header value cannot be sent.
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    /// Response was valid JSON but not the expected shape.
    #[error("unexpected payload: {0}")]
    UnexpectedPayload(String),
}

impl FetchError {
    /// Build an upstream error, truncating the body to [`BODY_EXCERPT_CHARS`].
    pub fn upstream(method: &str, url: &str, status: u16, body: &str) -> Self {
        FetchError::Upstream {
            method: method.to_string(),
            url: url.to_string(),
            status,
            body: body.chars().take(BODY_EXCERPT_CHARS).collect(),
        }
    }

    /// HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Upstream { status, .. } => Some(*status),
            FetchError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Notification delivery errors.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// A sender or recipient address could not be parsed.
    #[error("invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The message could not be assembled.
    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    /// SMTP conversation failed.
    #[error("smtp delivery failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_body_is_truncated_to_excerpt() {
        let body = "x".repeat(1000);
        let err = FetchError::upstream("GET", "https://example.test/events", 500, &body);
        match err {
            FetchError::Upstream { body, status, .. } => {
                assert_eq!(body.chars().count(), BODY_EXCERPT_CHARS);
                assert_eq!(status, 500);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn upstream_truncation_respects_char_boundaries() {
        let body = "é".repeat(400);
        let err = FetchError::upstream("POST", "https://example.test/prices", 429, &body);
        assert_eq!(err.status(), Some(429));
        assert!(err.to_string().starts_with("POST https://example.test/prices -> 429: "));
    }

    #[test]
    fn not_found_has_no_status() {
        let err = FetchError::NotFound { event_id: 7 };
        assert_eq!(err.status(), None);
        assert_eq!(err.to_string(), "event 7 not found or unexpected response");
    }
}
