//! Mid-price calculation from two-sided quotes.

pub mod mid;

pub use mid::{compute_mid, format_mid, format_probability, QuotePolicy, TokenQuote};
