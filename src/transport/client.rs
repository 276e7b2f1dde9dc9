//! reqwest-backed sender and connector.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use tracing::{debug, instrument};

use super::{ApiRequest, Connector, RawResponse, Sender};
use crate::config::Config;
use crate::error::FetchError;

/// Opens a fresh reqwest client per fetch with the fixed headers and timeout.
#[derive(Debug, Clone)]
pub struct HttpConnector {
    /// Per-request timeout.
    timeout: Duration,
    /// User-Agent header value.
    user_agent: String,
}

impl HttpConnector {
    /// Create a connector with explicit settings.
    pub fn new(timeout: Duration, user_agent: impl Into<String>) -> Self {
        Self {
            timeout,
            user_agent: user_agent.into(),
        }
    }

    /// Create a connector from application config.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.http_timeout(), config.user_agent.clone())
    }

    /// Configured per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn default_headers(&self) -> Result<HeaderMap, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_str(&self.user_agent)?);
        Ok(headers)
    }
}

impl Connector for HttpConnector {
    type Sender = HttpSender;

    fn connect(&self) -> Result<HttpSender, FetchError> {
        let http = reqwest::Client::builder()
            .default_headers(self.default_headers()?)
            .timeout(self.timeout)
            .build()?;
        Ok(HttpSender { http })
    }
}

/// One HTTP session. Dropped together with its connection pool.
#[derive(Debug)]
pub struct HttpSender {
    http: reqwest::Client,
}

impl Sender for HttpSender {
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    async fn send(&self, request: &ApiRequest) -> Result<RawResponse, FetchError> {
        let mut builder = self.http.request(request.method.clone(), &request.url);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        debug!(status, bytes = body.len(), "Received response");

        Ok(RawResponse { status, body })
    }
}
