//! Evaluation of candidate markets against alert rules.

use rust_decimal::Decimal;
use tracing::{debug, info};

use super::rules::{matching_rules, AlertRule, RuleKind};
use crate::market::{Event, Market, PriceBook};
use crate::metrics;
use crate::pricing::{QuotePolicy, TokenQuote};

/// Priced outcome of one market.
#[derive(Debug, Clone, PartialEq)]
pub struct OutcomeQuote {
    /// Outcome label.
    pub label: String,
    /// CLOB token identifier.
    pub token_id: String,
    /// Parsed quote legs as received.
    pub quote: TokenQuote,
    /// Mid under the run's quote policy.
    pub mid: Option<Decimal>,
}

/// Priced view of one candidate market.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketSnapshot {
    /// Market display title.
    pub title: String,
    /// Liquidity used for ranking.
    pub liquidity: Decimal,
    /// Outcomes in token order.
    pub outcomes: Vec<OutcomeQuote>,
}

/// A rule that fired.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggeredAlert {
    /// Rule name (the candidate).
    pub candidate: String,
    /// Title of the market the rule matched.
    pub market_title: String,
    /// Outcome label that was priced.
    pub outcome_label: String,
    /// Rule kind.
    pub kind: RuleKind,
    /// Rule threshold.
    pub threshold: Decimal,
    /// Mid that fell below the threshold.
    pub mid: Decimal,
}

/// Everything one run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Event identifier.
    pub event_id: String,
    /// Event title.
    pub event_title: String,
    /// Event slug.
    pub event_slug: String,
    /// Candidate markets in ranking order.
    pub markets: Vec<MarketSnapshot>,
    /// Fired alerts in encounter order.
    pub alerts: Vec<TriggeredAlert>,
}

impl RunReport {
    /// Whether any rule fired.
    pub fn has_alerts(&self) -> bool {
        !self.alerts.is_empty()
    }
}

/// Price every outcome of the candidates and collect fired rules.
pub fn evaluate(
    event: &Event,
    candidates: &[&Market],
    prices: &PriceBook,
    rules: &[AlertRule],
    policy: QuotePolicy,
) -> RunReport {
    let mut markets = Vec::with_capacity(candidates.len());
    let mut alerts = Vec::new();

    for market in candidates {
        let title = market.display_title().to_string();
        let mut outcomes = Vec::new();

        for pair in market.pair_outcomes() {
            let quote = prices.quote(&pair.token_id);
            let mid = quote.mid(policy);
            debug!(market = %title, outcome = %pair.label, mid = ?mid, "Priced outcome");

            for rule in matching_rules(rules, &title, &pair.label) {
                let Some(value) = mid else { continue };
                if !rule.is_triggered(mid) {
                    continue;
                }
                info!(
                    candidate = %rule.name,
                    mid = %value,
                    threshold = %rule.threshold,
                    "Alert triggered"
                );
                alerts.push(TriggeredAlert {
                    candidate: rule.name.clone(),
                    market_title: title.clone(),
                    outcome_label: pair.label.clone(),
                    kind: rule.kind,
                    threshold: rule.threshold,
                    mid: value,
                });
            }

            outcomes.push(OutcomeQuote {
                label: pair.label,
                token_id: pair.token_id,
                quote,
                mid,
            });
        }

        markets.push(MarketSnapshot {
            title,
            liquidity: market.liquidity(),
            outcomes,
        });
    }

    metrics::record_alerts_triggered(alerts.len());

    RunReport {
        event_id: event.id_str(),
        event_title: event.title().to_string(),
        event_slug: event.slug().to_string(),
        markets,
        alerts,
    }
}
