//! Event and market types as returned by the Gamma API.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};
use time::OffsetDateTime;

use super::normalize::{is_truthy, non_empty_str, stringify, to_decimal, to_string_list};

/// Order side in a CLOB price lookup.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Side {
    /// Buy side (bid leg).
    Buy,
    /// Sell side (ask leg).
    Sell,
}

/// A Gamma event with its nested markets.
#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    /// Event identifier (string or number upstream).
    #[serde(default)]
    pub id: Value,
    /// Event title.
    #[serde(default)]
    pub title: Value,
    /// Event slug.
    #[serde(default)]
    pub slug: Value,
    /// Markets in upstream order. Non-object entries are dropped.
    #[serde(default, deserialize_with = "lenient_markets")]
    pub markets: Vec<Market>,
    /// When this event was fetched.
    #[serde(skip, default = "OffsetDateTime::now_utc")]
    pub fetched_at: OffsetDateTime,
}

impl Event {
    /// Event identifier as text.
    pub fn id_str(&self) -> String {
        stringify(&self.id)
    }

    /// Event title, or empty when missing.
    pub fn title(&self) -> &str {
        self.title.as_str().unwrap_or_default()
    }

    /// Event slug, or empty when missing.
    pub fn slug(&self) -> &str {
        self.slug.as_str().unwrap_or_default()
    }
}

fn lenient_markets<'de, D>(deserializer: D) -> Result<Vec<Market>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    let markets = match raw {
        Value::Array(items) => items
            .into_iter()
            .filter(Value::is_object)
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    };
    Ok(markets)
}

/// One market inside an event, kept close to the raw Gamma record.
///
/// Fields are stored as raw JSON because Gamma is inconsistent about their
/// encoding; the accessor methods normalize on read.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Market {
    /// Market question.
    #[serde(default)]
    pub question: Value,
    /// Market title.
    #[serde(default)]
    pub title: Value,
    /// Market slug.
    #[serde(default)]
    pub slug: Value,
    /// Whether the market is open for trading.
    #[serde(default)]
    pub active: Value,
    /// Numeric liquidity.
    #[serde(default, rename = "liquidityNum")]
    pub liquidity_num: Value,
    /// Liquidity, often a numeric string.
    #[serde(default)]
    pub liquidity: Value,
    /// Outcome labels.
    #[serde(default)]
    pub outcomes: Value,
    /// Short outcome labels, preferred when present.
    #[serde(default, rename = "shortOutcomes")]
    pub short_outcomes: Value,
    /// CLOB token identifiers, positionally aligned with the labels.
    #[serde(default, rename = "clobTokenIds")]
    pub clob_token_ids: Value,
}

/// An outcome label paired with its CLOB token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutcomePair {
    /// Outcome label (e.g. "Yes").
    pub label: String,
    /// CLOB token identifier.
    pub token_id: String,
}

impl Market {
    /// Display title: question, then title, then slug.
    pub fn display_title(&self) -> &str {
        non_empty_str(&self.question)
            .or_else(|| non_empty_str(&self.title))
            .or_else(|| non_empty_str(&self.slug))
            .unwrap_or_default()
    }

    /// Whether the market is flagged active.
    pub fn is_active(&self) -> bool {
        is_truthy(&self.active)
    }

    /// Liquidity from `liquidityNum` or `liquidity`; missing or malformed gives zero.
    pub fn liquidity(&self) -> Decimal {
        let raw = if is_truthy(&self.liquidity_num) {
            &self.liquidity_num
        } else {
            &self.liquidity
        };
        to_decimal(raw).unwrap_or(Decimal::ZERO)
    }

    /// Outcome labels, preferring the short form.
    pub fn outcome_labels(&self) -> Vec<String> {
        if is_truthy(&self.short_outcomes) {
            to_string_list(&self.short_outcomes)
        } else {
            to_string_list(&self.outcomes)
        }
    }

    /// CLOB token identifiers in upstream order.
    pub fn token_ids(&self) -> Vec<String> {
        to_string_list(&self.clob_token_ids)
    }

    /// Pair labels and tokens by position.
    ///
    /// The token list decides the count. Labels missing at an index are
    /// synthesized as `Outcome {index}`; extra labels are ignored.
    pub fn pair_outcomes(&self) -> Vec<OutcomePair> {
        let labels = self.outcome_labels();
        self.token_ids()
            .into_iter()
            .enumerate()
            .map(|(i, token_id)| OutcomePair {
                label: labels
                    .get(i)
                    .cloned()
                    .unwrap_or_else(|| format!("Outcome {}", i)),
                token_id,
            })
            .collect()
    }
}

/// Keep active markets with positive liquidity, most liquid first, at most `top_n`.
///
/// Markets with equal liquidity keep their upstream order.
pub fn select_candidates(markets: &[Market], top_n: usize) -> Vec<&Market> {
    let mut candidates: Vec<(Decimal, &Market)> = markets
        .iter()
        .filter(|m| m.is_active())
        .map(|m| (m.liquidity(), m))
        .filter(|(liquidity, _)| *liquidity > Decimal::ZERO)
        .collect();

    candidates.sort_by(|a, b| b.0.cmp(&a.0));
    candidates.into_iter().take(top_n).map(|(_, m)| m).collect()
}
