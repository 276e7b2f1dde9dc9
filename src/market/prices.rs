//! Batched CLOB price lookups.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::normalize::to_decimal;
use super::types::{Market, Side};
use crate::pricing::TokenQuote;

/// One `(token, side)` entry of a `POST /prices` batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRequest {
    /// CLOB token identifier.
    pub token_id: String,
    /// Side to price.
    pub side: Side,
}

impl PriceRequest {
    /// Create a request entry.
    pub fn new(token_id: impl Into<String>, side: Side) -> Self {
        Self {
            token_id: token_id.into(),
            side,
        }
    }
}

/// Build the price batch: `BUY` then `SELL` for every non-blank token of every market.
///
/// Order follows markets then tokens. Duplicates are kept.
pub fn build_batch_request(markets: &[&Market]) -> Vec<PriceRequest> {
    markets
        .iter()
        .flat_map(|market| market.token_ids())
        .filter(|token_id| !token_id.trim().is_empty())
        .flat_map(|token_id| {
            [
                PriceRequest::new(token_id.clone(), Side::Buy),
                PriceRequest::new(token_id, Side::Sell),
            ]
        })
        .collect()
}

/// Raw `token_id -> {BUY, SELL}` mapping returned by the CLOB.
///
/// Values are kept exactly as received; [`PriceBook::quote`] parses them on read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceBook {
    entries: Map<String, Value>,
}

impl PriceBook {
    /// Wrap a decoded JSON object.
    pub fn new(entries: Map<String, Value>) -> Self {
        Self { entries }
    }

    /// Whether the book holds no tokens.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of tokens in the book.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Raw entry for a token.
    pub fn get(&self, token_id: &str) -> Option<&Value> {
        self.entries.get(token_id)
    }

    /// Two-sided quote for a token. Missing or unparseable legs are absent.
    pub fn quote(&self, token_id: &str) -> TokenQuote {
        let leg = |side: Side| {
            self.get(token_id)
                .and_then(|entry| entry.get(side.to_string()))
                .and_then(to_decimal)
        };
        TokenQuote {
            buy: leg(Side::Buy),
            sell: leg(Side::Sell),
        }
    }
}
