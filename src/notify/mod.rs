//! Notification delivery.
//!
//! The only sink is SMTP. Delivery is fail-open: when the SMTP settings are
//! incomplete the message is skipped with a log line rather than an error.

pub mod smtp;

use crate::error::NotifyError;

pub use smtp::{SmtpNotifier, SmtpSettings};

/// Accepts a subject with plain-text and optional HTML bodies.
#[allow(async_fn_in_trait)]
pub trait Notifier {
    /// Deliver the message. Returns whether it was actually sent.
    async fn send(&self, subject: &str, text: &str, html: Option<&str>)
        -> Result<bool, NotifyError>;
}
