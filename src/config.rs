//! Application configuration loaded from environment variables.

use std::time::Duration;

use serde::Deserialize;

use crate::alerts::{default_rules, AlertRule};
use crate::notify::SmtpSettings;
use crate::pricing::QuotePolicy;
use crate::transport::RetryPolicy;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Target ===
    /// Gamma event identifier to track.
    #[serde(default = "default_event_id")]
    pub event_id: u64,

    /// Number of markets kept after ranking by liquidity.
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    // === Endpoints ===
    /// Gamma API base URL (event metadata).
    #[serde(default = "default_gamma_url")]
    pub gamma_api_url: String,

    /// CLOB API base URL (pricing).
    #[serde(default = "default_clob_url")]
    pub clob_api_url: String,

    /// User-Agent sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    // === HTTP / Retry ===
    /// Per-request timeout in milliseconds.
    #[serde(default = "default_http_timeout_ms")]
    pub http_timeout_ms: u64,

    /// Retries after the first attempt on 429/5xx.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Backoff base delay in milliseconds.
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,

    /// Upper bound of the uniform jitter in milliseconds.
    #[serde(default = "default_backoff_jitter_ms")]
    pub backoff_jitter_ms: u64,

    /// Backoff cap in milliseconds.
    #[serde(default = "default_backoff_max_ms")]
    pub backoff_max_ms: u64,

    // === Evaluation ===
    /// How missing quote legs are treated before the mid is computed.
    #[serde(default)]
    pub quote_policy: QuotePolicy,

    /// Optional JSON array overriding the built-in alert rules.
    #[serde(default)]
    pub alert_rules: Option<String>,

    // === Email ===
    /// SMTP relay host.
    #[serde(default)]
    pub smtp_host: Option<String>,

    /// SMTP relay port.
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    /// SMTP username.
    #[serde(default)]
    pub smtp_user: Option<String>,

    /// SMTP password.
    #[serde(default)]
    pub smtp_pass: Option<String>,

    /// Sender address (falls back to SMTP_USER).
    #[serde(default)]
    pub email_from: Option<String>,

    /// Recipient address.
    #[serde(default)]
    pub email_to: Option<String>,

    // === Logging ===
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,
}

fn default_event_id() -> u64 {
    23947
}

fn default_top_n() -> usize {
    15
}

fn default_gamma_url() -> String {
    "https://gamma-api.polymarket.com".to_string()
}

fn default_clob_url() -> String {
    "https://clob.polymarket.com".to_string()
}

fn default_user_agent() -> String {
    concat!("polymarket-alerts/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_http_timeout_ms() -> u64 {
    20_000
}

fn default_max_retries() -> u32 {
    4
}

fn default_backoff_base_ms() -> u64 {
    500
}

fn default_backoff_jitter_ms() -> u64 {
    250
}

fn default_backoff_max_ms() -> u64 {
    8_000
}

fn default_smtp_port() -> u16 {
    587
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            event_id: default_event_id(),
            top_n: default_top_n(),
            gamma_api_url: default_gamma_url(),
            clob_api_url: default_clob_url(),
            user_agent: default_user_agent(),
            http_timeout_ms: default_http_timeout_ms(),
            max_retries: default_max_retries(),
            backoff_base_ms: default_backoff_base_ms(),
            backoff_jitter_ms: default_backoff_jitter_ms(),
            backoff_max_ms: default_backoff_max_ms(),
            quote_policy: QuotePolicy::default(),
            alert_rules: None,
            smtp_host: None,
            smtp_port: default_smtp_port(),
            smtp_user: None,
            smtp_pass: None,
            email_from: None,
            email_to: None,
            rust_log: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        if self.gamma_api_url.trim().is_empty() {
            return Err("GAMMA_API_URL must not be empty".to_string());
        }

        if self.clob_api_url.trim().is_empty() {
            return Err("CLOB_API_URL must not be empty".to_string());
        }

        if self.top_n == 0 {
            return Err("TOP_N must be at least 1".to_string());
        }

        if self.http_timeout_ms == 0 {
            return Err("HTTP_TIMEOUT_MS must be positive".to_string());
        }

        if self.backoff_max_ms < self.backoff_base_ms {
            return Err("BACKOFF_MAX_MS must be >= BACKOFF_BASE_MS".to_string());
        }

        reqwest::header::HeaderValue::from_str(&self.user_agent)
            .map_err(|e| format!("USER_AGENT is not a valid header value: {}", e))?;

        self.alert_rules()
            .map_err(|e| format!("ALERT_RULES is not a valid rule list: {}", e))?;

        Ok(())
    }

    /// Fixed per-request timeout.
    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.http_timeout_ms)
    }

    /// Retry policy for upstream requests.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            base: Duration::from_millis(self.backoff_base_ms),
            jitter: Duration::from_millis(self.backoff_jitter_ms),
            cap: Duration::from_millis(self.backoff_max_ms),
        }
    }

    /// Alert rules: the `ALERT_RULES` override when set, otherwise the built-in set.
    pub fn alert_rules(&self) -> Result<Vec<AlertRule>, serde_json::Error> {
        match self.alert_rules.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => serde_json::from_str(raw),
            _ => Ok(default_rules()),
        }
    }

    /// SMTP delivery settings.
    pub fn smtp(&self) -> SmtpSettings {
        SmtpSettings {
            host: self.smtp_host.clone(),
            port: self.smtp_port,
            user: self.smtp_user.clone(),
            password: self.smtp_pass.clone(),
            from: self.email_from.clone().or_else(|| self.smtp_user.clone()),
            to: self.email_to.clone(),
        }
    }
}
