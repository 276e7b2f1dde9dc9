//! Integration tests for the Polymarket alert tracker.
//!
//! Most tests drive the full pipeline through the mock connector. The live
//! tests at the bottom hit the real Gamma and CLOB APIs.
//! Run them with: cargo test --test integration -- --ignored

use polymarket_alerts::alerts::{build_notification, default_rules};
use polymarket_alerts::config::Config;
use polymarket_alerts::error::FetchError;
use polymarket_alerts::market::MarketDataClient;
use polymarket_alerts::pipeline::{run_once, RunParams};
use polymarket_alerts::pricing::QuotePolicy;
use polymarket_alerts::transport::{MockConnector, MockSender, RawResponse, RetryPolicy};
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use time::OffsetDateTime;

fn mock_client(sender: &MockSender) -> MarketDataClient<MockConnector> {
    MarketDataClient::new(
        MockConnector::new(sender.clone()),
        RetryPolicy::immediate(4),
        "https://gamma.test",
        "https://clob.test",
    )
}

fn params() -> RunParams {
    RunParams {
        event_id: 23947,
        top_n: 15,
        rules: default_rules(),
        quote_policy: QuotePolicy::Strict,
    }
}

fn election_event() -> Value {
    json!([{
        "id": "23947",
        "title": "Chile Presidential Election",
        "slug": "chile-presidential-election",
        "markets": [
            {
                "question": "Will Evelyn Matthei win?",
                "active": true,
                "liquidityNum": 12000.5,
                "outcomes": "[\"Yes\", \"No\"]",
                "clobTokenIds": "[\"em-yes\", \"em-no\"]"
            },
            {
                "question": "Will Jeannette Jara win?",
                "active": true,
                "liquidity": "30000",
                "outcomes": "Yes, No",
                "clobTokenIds": ["jj-yes", "jj-no"]
            },
            {
                "question": "Will someone closed win?",
                "active": false,
                "liquidity": "99999",
                "clobTokenIds": "[\"closed-yes\", \"closed-no\"]"
            },
            {
                "question": "Will nobody trade this?",
                "active": true,
                "liquidity": "not-a-number",
                "clobTokenIds": "[\"dry-yes\"]"
            }
        ]
    }])
}

#[tokio::test]
async fn full_run_prices_candidates_and_fires_alerts() {
    let sender = MockSender::new();
    sender.push_json(&election_event());
    sender.push_json(&json!({
        "em-yes": {"BUY": "0.05", "SELL": "0.09"},
        "em-no": {"BUY": 0.91, "SELL": 0.95},
        "jj-yes": {"BUY": "0.40", "SELL": "0.42"},
        "jj-no": {"BUY": "0.58", "SELL": "0.60"}
    }));

    let report = run_once(&mock_client(&sender), &params()).await.unwrap();

    let titles: Vec<_> = report.markets.iter().map(|m| m.title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["Will Jeannette Jara win?", "Will Evelyn Matthei win?"]
    );
    assert_eq!(report.markets[0].outcomes[0].mid, Some(dec!(0.41)));
    assert_eq!(report.alerts.len(), 1);
    assert_eq!(report.alerts[0].candidate, "Evelyn Matthei");
    assert_eq!(report.alerts[0].mid, dec!(0.07));

    let requests = sender.requests();
    assert_eq!(requests.len(), 2);
    let batch = requests[1].body.as_ref().unwrap().as_array().unwrap();
    assert_eq!(batch.len(), 8);
    assert_eq!(batch[0], json!({"token_id": "jj-yes", "side": "BUY"}));

    let notification =
        build_notification(&report.event_title, &report.alerts, OffsetDateTime::now_utc())
            .unwrap();
    assert_eq!(notification.subject, "Evelyn Matthei → probability 7.00%");
}

#[tokio::test]
async fn transient_failures_are_retried_across_the_pipeline() {
    let sender = MockSender::new();
    sender.push_response(RawResponse::new(503, "unavailable"));
    sender.push_response(RawResponse::new(429, "rate limited"));
    sender.push_json(&election_event());
    sender.push_response(RawResponse::new(502, "bad gateway"));
    sender.push_json(&json!({}));

    let report = run_once(&mock_client(&sender), &params()).await.unwrap();

    assert_eq!(sender.attempts(), 5);
    assert_eq!(sender.connections(), 2);
    assert!(report.alerts.is_empty());
    assert!(report
        .markets
        .iter()
        .flat_map(|m| &m.outcomes)
        .all(|o| o.mid.is_none()));
}

#[tokio::test]
async fn exhausted_retries_abort_the_run() {
    let sender = MockSender::new();
    for _ in 0..5 {
        sender.push_response(RawResponse::new(500, "boom"));
    }

    let err = run_once(&mock_client(&sender), &params()).await.unwrap_err();

    assert!(matches!(err, FetchError::Upstream { status: 500, .. }));
    assert_eq!(sender.attempts(), 5);
}

#[tokio::test]
async fn missing_event_aborts_before_pricing() {
    let sender = MockSender::new();
    sender.push_json(&json!([]));

    let err = run_once(&mock_client(&sender), &params()).await.unwrap_err();

    assert!(matches!(err, FetchError::NotFound { event_id: 23947 }));
    assert_eq!(sender.attempts(), 1);
}

#[tokio::test]
async fn event_without_candidates_skips_price_call() {
    let sender = MockSender::new();
    sender.push_json(&json!([{"id": 1, "title": "Empty", "markets": []}]));

    let report = run_once(&mock_client(&sender), &params()).await.unwrap();

    assert!(report.markets.is_empty());
    assert_eq!(sender.attempts(), 1);
    assert_eq!(sender.connections(), 1);
}

/// Live check against the real Gamma API.
#[tokio::test]
#[ignore = "hits the live Polymarket API"]
async fn live_fetch_default_event() {
    let config = Config::default();
    let client = MarketDataClient::from_config(&config);

    let event = client.fetch_event(config.event_id).await;
    assert!(event.is_ok(), "Failed to fetch event: {:?}", event.err());
    let event = event.unwrap();
    println!("{} ({} markets)", event.title(), event.markets.len());
}

/// Live end-to-end run without notification.
#[tokio::test]
#[ignore = "hits the live Polymarket API"]
async fn live_run_once() {
    let config = Config::default();
    let client = MarketDataClient::from_config(&config);
    let params = RunParams {
        event_id: config.event_id,
        top_n: config.top_n,
        rules: config.alert_rules().unwrap(),
        quote_policy: config.quote_policy,
    };

    let report = run_once(&client, &params).await;
    assert!(report.is_ok(), "Run failed: {:?}", report.err());
    println!("Alerts: {:?}", report.unwrap().alerts);
}
