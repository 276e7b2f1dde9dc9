//! HTTP transport for the Gamma and CLOB endpoints.
//!
//! This module handles:
//! - One-shot HTTP attempts behind the [`Sender`] trait
//! - Connection-scoped sessions opened per fetch through [`Connector`]
//! - Retry with exponential backoff and jitter on 429/5xx
//! - Mock connector for testing

pub mod client;
pub mod mock;
pub mod retry;

use reqwest::Method;
use serde_json::Value;

use crate::error::FetchError;

pub use client::{HttpConnector, HttpSender};
pub use mock::{MockConnector, MockSender, RecordedRequest};
pub use retry::{is_retryable, RetryPolicy, RetryingTransport};

/// A single logical request against an upstream endpoint.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL without query string.
    pub url: String,
    /// Query parameters, in order.
    pub query: Vec<(String, String)>,
    /// Optional JSON body.
    pub body: Option<Value>,
}

impl ApiRequest {
    /// GET request with no query parameters.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            query: Vec::new(),
            body: None,
        }
    }

    /// POST request carrying a JSON body.
    pub fn post_json(url: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::POST,
            url: url.into(),
            query: Vec::new(),
            body: Some(body),
        }
    }

    /// Append a query parameter.
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }
}

/// Status and raw body of one HTTP attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

impl RawResponse {
    /// Create a response from status and body.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Performs exactly one HTTP attempt. Retries live in [`RetryingTransport`].
#[allow(async_fn_in_trait)]
pub trait Sender {
    /// Send the request once and return whatever status came back.
    async fn send(&self, request: &ApiRequest) -> Result<RawResponse, FetchError>;
}

/// Opens a fresh [`Sender`] for each logical fetch.
///
/// The sender is dropped when the fetch returns, on success and on error alike,
/// so no connection state is shared between fetches.
pub trait Connector {
    /// Sender type produced by this connector.
    type Sender: Sender;

    /// Open a new session.
    fn connect(&self) -> Result<Self::Sender, FetchError>;
}
