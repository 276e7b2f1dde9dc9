//! SMTP notifier backed by lettre.

use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{info, instrument, warn};

use super::Notifier;
use crate::error::NotifyError;
use crate::metrics;

/// SMTP settings as read from the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SmtpSettings {
    /// Relay host.
    pub host: Option<String>,
    /// Relay port (STARTTLS).
    pub port: u16,
    /// Username.
    pub user: Option<String>,
    /// Password.
    pub password: Option<String>,
    /// Sender address.
    pub from: Option<String>,
    /// Recipient address.
    pub to: Option<String>,
}

/// Complete settings, all required fields present and non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ResolvedSmtp {
    host: String,
    port: u16,
    user: String,
    password: String,
    from: String,
    to: String,
}

impl SmtpSettings {
    /// Whether every required field is set.
    pub fn is_configured(&self) -> bool {
        self.resolve().is_some()
    }

    fn resolve(&self) -> Option<ResolvedSmtp> {
        let field = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        Some(ResolvedSmtp {
            host: field(&self.host)?,
            port: self.port,
            user: field(&self.user)?,
            password: field(&self.password)?,
            from: field(&self.from)?,
            to: field(&self.to)?,
        })
    }
}

/// Sends notifications through an SMTP relay.
#[derive(Debug, Clone)]
pub struct SmtpNotifier {
    settings: SmtpSettings,
}

impl SmtpNotifier {
    /// Create a notifier from settings.
    pub fn new(settings: SmtpSettings) -> Self {
        Self { settings }
    }
}

/// Assemble a message, multipart alternative when HTML is given.
fn build_message(
    from: &str,
    to: &str,
    subject: &str,
    text: &str,
    html: Option<&str>,
) -> Result<Message, NotifyError> {
    let builder = Message::builder()
        .from(from.parse::<Mailbox>()?)
        .to(to.parse::<Mailbox>()?)
        .subject(subject);

    let message = match html {
        Some(html) => builder.multipart(
            MultiPart::alternative()
                .singlepart(SinglePart::plain(text.to_string()))
                .singlepart(SinglePart::html(html.to_string())),
        )?,
        None => builder.singlepart(SinglePart::plain(text.to_string()))?,
    };
    Ok(message)
}

impl Notifier for SmtpNotifier {
    #[instrument(skip(self, text, html))]
    async fn send(
        &self,
        subject: &str,
        text: &str,
        html: Option<&str>,
    ) -> Result<bool, NotifyError> {
        let Some(smtp) = self.settings.resolve() else {
            warn!("SMTP not configured; notification skipped");
            return Ok(false);
        };

        let message = build_message(&smtp.from, &smtp.to, subject, text, html)?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host)?
            .port(smtp.port)
            .credentials(Credentials::new(smtp.user, smtp.password))
            .build();

        transport.send(message).await?;
        metrics::record_notification_sent();
        info!(to = %smtp.to, "Notification sent");
        Ok(true)
    }
}
