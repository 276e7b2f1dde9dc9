//! Rendering of fired alerts into an email-style notification.

use rust_decimal::Decimal;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use super::evaluate::TriggeredAlert;
use crate::pricing::format_probability;

/// Subject plus plain-text and HTML bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Message subject.
    pub subject: String,
    /// Plain-text body.
    pub text: String,
    /// HTML body.
    pub html: Option<String>,
}

/// Build the notification for a run, or `None` when nothing fired.
pub fn build_notification(
    event_title: &str,
    alerts: &[TriggeredAlert],
    generated_at: OffsetDateTime,
) -> Option<Notification> {
    let subject = match alerts {
        [] => return None,
        [single] => format!(
            "{} → probability {}",
            single.candidate,
            format_probability(Some(single.mid))
        ),
        many => {
            let title = if event_title.is_empty() {
                "Polymarket"
            } else {
                event_title
            };
            format!("{} alerts - {}", many.len(), title)
        }
    };

    let timestamp = generated_at
        .format(&Rfc3339)
        .unwrap_or_else(|_| generated_at.unix_timestamp().to_string());

    Some(Notification {
        subject,
        text: render_text(alerts, &timestamp),
        html: Some(render_html(alerts, &timestamp)),
    })
}

fn format_price(mid: Decimal) -> String {
    format!("{:.4}", mid.round_dp(4))
}

fn render_text(alerts: &[TriggeredAlert], timestamp: &str) -> String {
    let mut lines = vec!["CANDIDATE | PROBABILITY | CURRENT PRICE".to_string(), String::new()];
    for alert in alerts {
        lines.push(format!(
            "{} | {} | {}",
            alert.candidate,
            format_probability(Some(alert.mid)),
            format_price(alert.mid)
        ));
    }
    lines.push(String::new());
    lines.push(format!("Generated at {}", timestamp));
    lines.join("\n")
}

fn render_html(alerts: &[TriggeredAlert], timestamp: &str) -> String {
    let rows: String = alerts
        .iter()
        .map(|alert| {
            format!(
                concat!(
                    "<tr>",
                    "<td style=\"padding:10px 12px;font-weight:600;\">{}</td>",
                    "<td style=\"padding:10px 12px;text-align:right;\">{}</td>",
                    "<td style=\"padding:10px 12px;text-align:right;\">{}</td>",
                    "</tr>"
                ),
                escape_html(&alert.candidate),
                format_probability(Some(alert.mid)),
                format_price(alert.mid)
            )
        })
        .collect();

    format!(
        concat!(
            "<div style=\"font-family:Inter,Segoe UI,Roboto,Arial,sans-serif;line-height:1.45;color:#111;\">",
            "<h2 style=\"margin:0 0 12px 0;\">Opportunity detected</h2>",
            "<table width=\"100%\" cellpadding=\"0\" cellspacing=\"0\" ",
            "style=\"border-collapse:collapse;min-width:420px;border:1px solid #eee;\">",
            "<thead><tr style=\"background:#111;color:#fff;\">",
            "<th align=\"left\" style=\"padding:10px 12px;\">CANDIDATE</th>",
            "<th align=\"right\" style=\"padding:10px 12px;\">PROBABILITY</th>",
            "<th align=\"right\" style=\"padding:10px 12px;\">CURRENT PRICE</th>",
            "</tr></thead>",
            "<tbody>{}</tbody>",
            "</table>",
            "<p style=\"margin:14px 0 0 0;color:#666;\">Polymarket · generated at {}</p>",
            "</div>"
        ),
        rows,
        escape_html(timestamp)
    )
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
