//! Retry loop with exponential backoff and jitter.

use std::time::{Duration, Instant};

use rand::Rng;
use serde_json::Value;
use tracing::{debug, warn};

use super::{ApiRequest, Sender};
use crate::error::FetchError;
use crate::metrics;

/// Whether an HTTP status is worth retrying (429 or any 5xx).
pub fn is_retryable(status: u16) -> bool {
    status == 429 || (500..600).contains(&status)
}

/// Backoff configuration for upstream requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Base delay, doubled on each retry.
    pub base: Duration,
    /// Upper bound of the uniform jitter added to each delay.
    pub jitter: Duration,
    /// Maximum delay between attempts.
    pub cap: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 4,
            base: Duration::from_millis(500),
            jitter: Duration::from_millis(250),
            cap: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    /// Policy that retries without sleeping. Useful for tests.
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            base: Duration::ZERO,
            jitter: Duration::ZERO,
            cap: Duration::ZERO,
        }
    }

    /// Delay before retry `attempt` (zero-based) with an explicit jitter value.
    pub fn delay(&self, attempt: u32, jitter: Duration) -> Duration {
        let factor = 2f64.powi(attempt.min(63) as i32);
        let backoff = self.base.as_secs_f64() * factor + jitter.as_secs_f64();
        let capped = backoff.min(self.cap.as_secs_f64());
        Duration::from_secs_f64(capped.max(0.0))
    }

    /// Delay before retry `attempt` with jitter drawn from `[0, self.jitter]`.
    pub fn next_delay(&self, attempt: u32) -> Duration {
        let jitter = if self.jitter.is_zero() {
            Duration::ZERO
        } else {
            let ms = rand::thread_rng().gen_range(0..=self.jitter.as_millis() as u64);
            Duration::from_millis(ms)
        };
        self.delay(attempt, jitter)
    }
}

/// Wraps a [`Sender`] with status-based retries and JSON decoding.
#[derive(Debug)]
pub struct RetryingTransport<S> {
    sender: S,
    policy: RetryPolicy,
}

impl<S: Sender> RetryingTransport<S> {
    /// Create a transport over the given sender.
    pub fn new(sender: S, policy: RetryPolicy) -> Self {
        Self { sender, policy }
    }

    /// Issue the request, retrying 429/5xx, and decode the successful body as JSON.
    ///
    /// Connection and timeout failures surface immediately. So does a body that
    /// is not valid JSON.
    pub async fn request(&self, request: &ApiRequest) -> Result<Value, FetchError> {
        let method = request.method.as_str();
        let mut attempt: u32 = 0;

        loop {
            let start = Instant::now();
            let response = self.sender.send(request).await?;
            metrics::record_http_attempt(start, response.status);

            debug!(
                method,
                url = %request.url,
                attempt,
                status = response.status,
                "Upstream attempt finished"
            );

            if response.status < 400 {
                return Ok(serde_json::from_str(&response.body)?);
            }

            if is_retryable(response.status) && attempt < self.policy.max_retries {
                let delay = self.policy.next_delay(attempt);
                warn!(
                    method,
                    url = %request.url,
                    status = response.status,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "Transient upstream failure, backing off"
                );
                metrics::record_http_retry();
                tokio::time::sleep(delay).await;
                attempt += 1;
                continue;
            }

            return Err(FetchError::upstream(
                method,
                &request.url,
                response.status,
                &response.body,
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{MockSender, RawResponse};
    use pretty_assertions::assert_eq;

    fn ok(body: &str) -> RawResponse {
        RawResponse::new(200, body)
    }

    #[test]
    fn retryable_statuses() {
        assert!(is_retryable(429));
        assert!(is_retryable(500));
        assert!(is_retryable(503));
        assert!(is_retryable(599));
        assert!(!is_retryable(400));
        assert!(!is_retryable(404));
        assert!(!is_retryable(600));
        assert!(!is_retryable(200));
    }

    #[test]
    fn delay_doubles_per_attempt() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay(0, Duration::ZERO), Duration::from_millis(500));
        assert_eq!(policy.delay(1, Duration::ZERO), Duration::from_secs(1));
        assert_eq!(policy.delay(2, Duration::ZERO), Duration::from_secs(2));
        assert_eq!(policy.delay(3, Duration::ZERO), Duration::from_secs(4));
    }

    #[test]
    fn delay_adds_jitter_and_caps() {
        let policy = RetryPolicy::default();
        assert_eq!(
            policy.delay(1, Duration::from_millis(250)),
            Duration::from_millis(1250)
        );
        assert_eq!(policy.delay(4, Duration::ZERO), Duration::from_secs(8));
        assert_eq!(policy.delay(10, Duration::from_millis(250)), Duration::from_secs(8));
    }

    #[test]
    fn next_delay_stays_within_jitter_bounds() {
        let policy = RetryPolicy::default();
        for _ in 0..100 {
            let delay = policy.next_delay(0);
            assert!(delay >= Duration::from_millis(500));
            assert!(delay <= Duration::from_millis(750));
        }
    }

    #[tokio::test]
    async fn success_on_first_attempt() {
        let sender = MockSender::with_responses(vec![ok("[1, 2]")]);
        let transport = RetryingTransport::new(sender.clone(), RetryPolicy::immediate(4));

        let value = transport.request(&ApiRequest::get("https://x.test/a")).await.unwrap();
        assert_eq!(value, serde_json::json!([1, 2]));
        assert_eq!(sender.attempts(), 1);
    }

    #[tokio::test]
    async fn retries_transient_failures_then_succeeds() {
        let sender = MockSender::with_responses(vec![
            RawResponse::new(429, "slow down"),
            RawResponse::new(502, "bad gateway"),
            RawResponse::new(503, "unavailable"),
            ok("{\"ok\": true}"),
        ]);
        let transport = RetryingTransport::new(sender.clone(), RetryPolicy::immediate(4));

        let value = transport.request(&ApiRequest::get("https://x.test/a")).await.unwrap();
        assert_eq!(value["ok"], true);
        assert_eq!(sender.attempts(), 4);
    }

    #[tokio::test]
    async fn exhausting_budget_reports_last_status() {
        let sender = MockSender::with_responses(vec![
            RawResponse::new(500, "a"),
            RawResponse::new(429, "b"),
            RawResponse::new(500, "c"),
            RawResponse::new(502, "d"),
            RawResponse::new(503, "last body"),
            ok("[]"),
        ]);
        let transport = RetryingTransport::new(sender.clone(), RetryPolicy::immediate(4));

        let err = transport
            .request(&ApiRequest::get("https://x.test/a"))
            .await
            .unwrap_err();
        match err {
            FetchError::Upstream { status, body, .. } => {
                assert_eq!(status, 503);
                assert_eq!(body, "last body");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(sender.attempts(), 5);
    }

    #[tokio::test]
    async fn non_retryable_status_fails_immediately() {
        let sender = MockSender::with_responses(vec![RawResponse::new(404, "missing"), ok("[]")]);
        let transport = RetryingTransport::new(sender.clone(), RetryPolicy::immediate(4));

        let err = transport
            .request(&ApiRequest::get("https://x.test/a"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(sender.attempts(), 1);
    }

    #[tokio::test]
    async fn zero_retry_budget_makes_single_attempt() {
        let sender = MockSender::with_responses(vec![RawResponse::new(500, "x"), ok("[]")]);
        let transport = RetryingTransport::new(sender.clone(), RetryPolicy::immediate(0));

        let result = transport.request(&ApiRequest::get("https://x.test/a")).await;
        tokio_test::assert_err!(result);
        assert_eq!(sender.attempts(), 1);
    }

    #[tokio::test]
    async fn malformed_json_is_not_retried() {
        let sender = MockSender::with_responses(vec![ok("not json"), ok("[]")]);
        let transport = RetryingTransport::new(sender.clone(), RetryPolicy::immediate(4));

        let err = transport
            .request(&ApiRequest::get("https://x.test/a"))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
        assert_eq!(sender.attempts(), 1);
    }

    #[tokio::test]
    async fn maximal_retry_budget_does_not_overflow() {
        let sender = MockSender::with_responses(vec![RawResponse::new(503, "x"), ok("[]")]);
        let transport = RetryingTransport::new(sender.clone(), RetryPolicy::immediate(u32::MAX));

        let value = transport.request(&ApiRequest::get("https://x.test/a")).await;
        tokio_test::assert_ok!(value);
        assert_eq!(sender.attempts(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn backoff_sleeps_double_between_attempts() {
        let sender = MockSender::with_responses(vec![
            RawResponse::new(503, "a"),
            RawResponse::new(503, "b"),
            ok("{}"),
        ]);
        let policy = RetryPolicy {
            max_retries: 4,
            base: Duration::from_millis(500),
            jitter: Duration::ZERO,
            cap: Duration::from_secs(8),
        };
        let transport = RetryingTransport::new(sender.clone(), policy);

        let start = tokio::time::Instant::now();
        let value = transport.request(&ApiRequest::get("https://x.test/a")).await;
        let elapsed = start.elapsed();

        tokio_test::assert_ok!(value);
        assert_eq!(sender.attempts(), 3);
        // 500ms before the second attempt, 1s before the third.
        assert!(elapsed >= Duration::from_millis(1500), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_millis(1600), "elapsed {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn backoff_is_capped() {
        let sender = MockSender::with_responses(vec![
            RawResponse::new(500, "a"),
            RawResponse::new(500, "b"),
            ok("{}"),
        ]);
        let policy = RetryPolicy {
            max_retries: 4,
            base: Duration::from_secs(1),
            jitter: Duration::ZERO,
            cap: Duration::from_millis(1200),
        };
        let transport = RetryingTransport::new(sender, policy);

        let start = tokio::time::Instant::now();
        tokio_test::assert_ok!(transport.request(&ApiRequest::get("https://x.test/a")).await);
        let elapsed = start.elapsed();

        // 1s, then 2s capped to 1.2s.
        assert!(elapsed >= Duration::from_millis(2200), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_millis(2300), "elapsed {elapsed:?}");
    }

    #[tokio::test]
    async fn redirect_class_status_is_treated_as_success() {
        let sender = MockSender::with_responses(vec![RawResponse::new(304, "{}")]);
        let transport = RetryingTransport::new(sender, RetryPolicy::immediate(4));

        let value = transport.request(&ApiRequest::get("https://x.test/a")).await;
        tokio_test::assert_ok!(value);
    }
}
