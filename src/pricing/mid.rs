//! Mid-price calculator.
//!
//! The mid of a token's bid and ask is used as its implied probability. It is
//! not clamped to `[0, 1]`: an out-of-range mid signals bad upstream data and is
//! left for the caller to judge.

use rust_decimal::Decimal;
use serde::Deserialize;
use strum::{Display, EnumString};

/// Combine two quote legs into a mid.
///
/// Both present gives the mean, one present gives that leg, neither gives `None`.
/// A missing leg is never read as zero here; see [`QuotePolicy::ZeroFill`].
pub fn compute_mid(bid: Option<Decimal>, ask: Option<Decimal>) -> Option<Decimal> {
    match (bid, ask) {
        (Some(bid), Some(ask)) => Some(mean(bid, ask)),
        (Some(only), None) | (None, Some(only)) => Some(only),
        (None, None) => None,
    }
}

/// Mean of two decimals that stays in range near `Decimal::MAX`/`Decimal::MIN`.
fn mean(a: Decimal, b: Decimal) -> Decimal {
    match a.checked_add(b) {
        Some(sum) => sum / Decimal::TWO,
        // Overflow implies same-sign legs, so `b - a` cannot overflow and the
        // result lies between them.
        None => (b - a) / Decimal::TWO + a,
    }
}

/// How missing quote legs are treated before computing the mid.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum QuotePolicy {
    /// Missing legs stay missing; a token with no quotes has no mid.
    #[default]
    Strict,
    /// Missing legs are read as zero, so every token gets a mid.
    ZeroFill,
}

/// Parsed BUY/SELL legs for one token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenQuote {
    /// BUY leg (bid).
    pub buy: Option<Decimal>,
    /// SELL leg (ask).
    pub sell: Option<Decimal>,
}

impl TokenQuote {
    /// Legs after applying the policy, as `(bid, ask)`.
    pub fn legs(&self, policy: QuotePolicy) -> (Option<Decimal>, Option<Decimal>) {
        match policy {
            QuotePolicy::Strict => (self.buy, self.sell),
            QuotePolicy::ZeroFill => (
                Some(self.buy.unwrap_or(Decimal::ZERO)),
                Some(self.sell.unwrap_or(Decimal::ZERO)),
            ),
        }
    }

    /// Mid under the given policy.
    pub fn mid(&self, policy: QuotePolicy) -> Option<Decimal> {
        let (bid, ask) = self.legs(policy);
        compute_mid(bid, ask)
    }
}

/// Mid with six decimals, or `n/a`.
pub fn format_mid(mid: Option<Decimal>) -> String {
    match mid {
        Some(value) => format!("{:.6}", value.round_dp(6)),
        None => "n/a".to_string(),
    }
}

/// Mid as a percentage with two decimals, or `n/a`.
///
/// A mid too large to scale to a percentage is also `n/a`; [`format_mid`]
/// still shows the raw value.
pub fn format_probability(mid: Option<Decimal>) -> String {
    match mid.and_then(|value| value.checked_mul(Decimal::ONE_HUNDRED)) {
        Some(pct) => format!("{:.2}%", pct.round_dp(2)),
        None => "n/a".to_string(),
    }
}
