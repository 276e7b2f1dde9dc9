//! One end-to-end run: event, candidates, prices, evaluation.

use tracing::{info, instrument};

use crate::alerts::{evaluate, AlertRule, RunReport};
use crate::error::FetchError;
use crate::market::{build_batch_request, select_candidates, MarketDataClient};
use crate::pricing::QuotePolicy;
use crate::transport::Connector;

/// Parameters of a run.
#[derive(Debug, Clone)]
pub struct RunParams {
    /// Event to track.
    pub event_id: u64,
    /// Number of markets kept after ranking.
    pub top_n: usize,
    /// Rules to evaluate.
    pub rules: Vec<AlertRule>,
    /// Missing-leg handling.
    pub quote_policy: QuotePolicy,
}

/// Fetch the event, rank its markets, price them in one batch and evaluate rules.
///
/// Any fetch failure aborts the run; there is no partial result.
#[instrument(skip(client, params), fields(event_id = params.event_id, top_n = params.top_n))]
pub async fn run_once<C: Connector>(
    client: &MarketDataClient<C>,
    params: &RunParams,
) -> Result<RunReport, FetchError> {
    let event = client.fetch_event(params.event_id).await?;
    let candidates = select_candidates(&event.markets, params.top_n);
    info!(
        markets = event.markets.len(),
        candidates = candidates.len(),
        "Selected candidate markets"
    );

    let batch = build_batch_request(&candidates);
    let prices = client.fetch_prices(&batch).await?;

    Ok(evaluate(
        &event,
        &candidates,
        &prices,
        &params.rules,
        params.quote_policy,
    ))
}
