//! Alert rule definitions.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Kind of threshold comparison.
///
/// Both kinds fire when the mid drops strictly below the threshold; they differ
/// only in how the threshold is meant to be read.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RuleKind {
    /// Threshold is a share price.
    PriceLt,
    /// Threshold is a probability.
    ProbLt,
}

/// Alert on a named candidate's `Yes` outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertRule {
    /// Candidate name, matched case-insensitively inside the market title.
    pub name: String,
    /// Comparison kind.
    #[serde(rename = "type")]
    pub kind: RuleKind,
    /// Threshold the mid must fall below.
    pub threshold: Decimal,
}

impl AlertRule {
    /// Create a rule.
    pub fn new(name: impl Into<String>, kind: RuleKind, threshold: Decimal) -> Self {
        Self {
            name: name.into(),
            kind,
            threshold,
        }
    }

    /// Whether a mid triggers this rule. An absent mid never does.
    pub fn is_triggered(&self, mid: Option<Decimal>) -> bool {
        mid.is_some_and(|value| value < self.threshold)
    }
}

/// Built-in rule set.
pub fn default_rules() -> Vec<AlertRule> {
    vec![
        AlertRule::new("Evelyn Matthei", RuleKind::PriceLt, dec!(0.077)),
        AlertRule::new("Jeannette Jara", RuleKind::ProbLt, dec!(0.12)),
    ]
}

/// Rules that apply to an outcome of a market.
///
/// Only the `Yes` outcome is considered, and the rule name must appear in the
/// market title. Both comparisons ignore case.
pub fn matching_rules<'a>(
    rules: &'a [AlertRule],
    market_title: &str,
    outcome_label: &str,
) -> Vec<&'a AlertRule> {
    if !outcome_label.eq_ignore_ascii_case("yes") {
        return Vec::new();
    }
    let title = market_title.to_lowercase();
    rules
        .iter()
        .filter(|rule| title.contains(&rule.name.to_lowercase()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_rules_are_fixed() {
        let rules = default_rules();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].name, "Evelyn Matthei");
        assert_eq!(rules[0].kind, RuleKind::PriceLt);
        assert_eq!(rules[1].threshold, dec!(0.12));
    }

    #[test]
    fn matches_only_yes_outcome() {
        let rules = default_rules();
        let title = "Will Evelyn Matthei win the election?";
        assert_eq!(matching_rules(&rules, title, "Yes").len(), 1);
        assert_eq!(matching_rules(&rules, title, "YES").len(), 1);
        assert!(matching_rules(&rules, title, "No").is_empty());
        assert!(matching_rules(&rules, title, "Outcome 0").is_empty());
    }

    #[test]
    fn matches_name_case_insensitively() {
        let rules = default_rules();
        let matched = matching_rules(&rules, "will JEANNETTE JARA win?", "yes");
        assert_eq!(matched, vec![&rules[1]]);
        assert!(matching_rules(&rules, "Will someone else win?", "Yes").is_empty());
    }

    #[test]
    fn trigger_is_strictly_below_threshold() {
        let rule = AlertRule::new("x", RuleKind::ProbLt, dec!(0.12));
        assert!(rule.is_triggered(Some(dec!(0.119))));
        assert!(!rule.is_triggered(Some(dec!(0.12))));
        assert!(!rule.is_triggered(None));
    }

    #[test]
    fn rule_json_shape() {
        let rule: AlertRule =
            serde_json::from_str(r#"{"name": "A", "type": "price_lt", "threshold": "0.5"}"#)
                .unwrap();
        assert_eq!(rule, AlertRule::new("A", RuleKind::PriceLt, dec!(0.5)));
    }
}
