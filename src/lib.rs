//! Polymarket event probability tracker with threshold alerts.
//!
//! Polls one Gamma event, prices the outcome tokens of its most liquid markets
//! through a single batched CLOB request, turns each two-sided quote into a
//! mid-price probability and fires alerts when a tracked candidate drops below
//! its threshold.
//!
//! ```text
//! GET  /events?id=23947   -> event + markets
//!      rank by liquidity  -> top N active markets
//! POST /prices            -> {token: {BUY, SELL}}
//!      mid = (BUY + SELL) / 2
//!      mid < threshold    -> alert
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`transport`]: HTTP attempts, sessions and retry with backoff
//! - [`market`]: Event/market types, normalization and fetchers
//! - [`pricing`]: Mid-price calculation
//! - [`alerts`]: Rules, evaluation and notification rendering
//! - [`notify`]: Notification delivery
//! - [`pipeline`]: One end-to-end run
//! - [`metrics`]: Request and alert metrics

pub mod alerts;
pub mod config;
pub mod error;
pub mod market;
pub mod metrics;
pub mod notify;
pub mod pipeline;
pub mod pricing;
pub mod transport;

pub use config::Config;
pub use error::{AppError, FetchError, NotifyError, Result};
pub use pipeline::{run_once, RunParams};
