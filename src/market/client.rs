//! Gamma event and CLOB price fetchers.

use serde_json::Value;
use tracing::{debug, info, instrument};

use super::prices::{PriceBook, PriceRequest};
use super::types::Event;
use crate::config::Config;
use crate::error::FetchError;
use crate::transport::{ApiRequest, Connector, HttpConnector, RetryPolicy, RetryingTransport};

/// Client for the two upstream endpoints.
///
/// Every fetch opens its own session through the connector and drops it before
/// returning.
#[derive(Debug, Clone)]
pub struct MarketDataClient<C> {
    /// Session factory.
    connector: C,
    /// Retry policy applied to each fetch.
    policy: RetryPolicy,
    /// Gamma API base URL.
    gamma_url: String,
    /// CLOB API base URL.
    clob_url: String,
}

impl MarketDataClient<HttpConnector> {
    /// Create a reqwest-backed client from config.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            HttpConnector::from_config(config),
            config.retry_policy(),
            &config.gamma_api_url,
            &config.clob_api_url,
        )
    }
}

impl<C: Connector> MarketDataClient<C> {
    /// Create a client over any connector.
    pub fn new(connector: C, policy: RetryPolicy, gamma_url: &str, clob_url: &str) -> Self {
        Self {
            connector,
            policy,
            gamma_url: gamma_url.trim_end_matches('/').to_string(),
            clob_url: clob_url.trim_end_matches('/').to_string(),
        }
    }

    fn transport(&self) -> Result<RetryingTransport<C::Sender>, FetchError> {
        Ok(RetryingTransport::new(self.connector.connect()?, self.policy))
    }

    /// Fetch an event with its markets via `GET /events?id=`.
    ///
    /// The first element of the returned list is the event; any others are ignored.
    /// An empty or non-list payload is [`FetchError::NotFound`].
    #[instrument(skip(self))]
    pub async fn fetch_event(&self, event_id: u64) -> Result<Event, FetchError> {
        let request = ApiRequest::get(format!("{}/events", self.gamma_url)).query("id", event_id);
        let payload = self.transport()?.request(&request).await?;

        let first = match payload {
            Value::Array(items) => items.into_iter().next(),
            _ => None,
        };
        let record = first
            .filter(Value::is_object)
            .ok_or(FetchError::NotFound { event_id })?;

        let event: Event = serde_json::from_value(record)?;
        info!(
            event_id,
            title = event.title(),
            markets = event.markets.len(),
            "Fetched event"
        );
        Ok(event)
    }

    /// Fetch prices for a batch via `POST /prices`.
    ///
    /// An empty batch returns an empty book without opening a session.
    #[instrument(skip(self, batch), fields(entries = batch.len()))]
    pub async fn fetch_prices(&self, batch: &[PriceRequest]) -> Result<PriceBook, FetchError> {
        if batch.is_empty() {
            debug!("Empty price batch, skipping request");
            return Ok(PriceBook::default());
        }

        let body = serde_json::to_value(batch)?;
        let request = ApiRequest::post_json(format!("{}/prices", self.clob_url), body);
        let payload = self.transport()?.request(&request).await?;

        match payload {
            Value::Object(entries) => {
                debug!(tokens = entries.len(), "Fetched prices");
                Ok(PriceBook::new(entries))
            }
            other => Err(FetchError::UnexpectedPayload(format!(
                "expected price mapping, got {}",
                json_kind(&other)
            ))),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
