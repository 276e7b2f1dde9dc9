//! Market module for Polymarket events.
//!
//! This module handles:
//! - Event and market types with lenient field decoding
//! - Normalization of heterogeneous list and numeric fields
//! - Candidate selection and outcome/token pairing
//! - Gamma event and batched CLOB price fetchers

pub mod client;
pub mod normalize;
pub mod prices;
pub mod types;

pub use client::MarketDataClient;
pub use normalize::{to_decimal, to_string_list};
pub use prices::{build_batch_request, PriceBook, PriceRequest};
pub use types::{select_candidates, Event, Market, OutcomePair, Side};
