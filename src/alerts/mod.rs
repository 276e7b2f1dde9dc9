//! Alert module for threshold rules on outcome probabilities.
//!
//! This module handles:
//! - Rule definitions and matching against markets
//! - Evaluation of candidate markets into a run report
//! - Notification subject and body rendering

pub mod evaluate;
pub mod notification;
pub mod rules;

pub use evaluate::{evaluate, MarketSnapshot, OutcomeQuote, RunReport, TriggeredAlert};
pub use notification::{build_notification, Notification};
pub use rules::{default_rules, matching_rules, AlertRule, RuleKind};
