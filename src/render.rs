//! Channel-specific rendering of alerts.
//!
//! Rendering is pure: the same alert and channel always produce the same
//! payload, and there is no failure mode beyond malformed alerts, which are a
//! programmer error upstream.

use serde::Serialize;
use serde_json::json;

use crate::evaluator::format_value;
use crate::router::Channel;
use crate::{Alert, Severity};

/// Hard length limit for the SMS text body
pub const SMS_MAX_LEN: usize = 160;

/// A rendered, channel-shaped notification payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RenderedMessage {
    /// Short text: title plus one-line message, truncated to the SMS limit
    Sms { text: String },

    /// Structured content for HTML templating
    Email {
        subject: String,
        html: String,
    },

    /// Structured push payload with an opaque data blob for the client app
    Push {
        title: String,
        body: String,
        data: serde_json::Value,

        /// Critical alerts must stay on screen until dismissed
        require_interaction: bool,
    },

    /// Single detailed text block for instant messaging
    Messenger { text: String },
}

fn severity_emoji(severity: Severity) -> &'static str {
    match severity {
        Severity::Low => "ℹ️",
        Severity::Medium => "⚠️",
        Severity::High => "🔥",
        Severity::Critical => "🚨",
    }
}

fn severity_color(severity: Severity) -> &'static str {
    match severity {
        Severity::Low => "#28a745",
        Severity::Medium => "#ffc107",
        Severity::High => "#fd7e14",
        Severity::Critical => "#dc3545",
    }
}

/// Render an alert for one channel
pub fn render(alert: &Alert, channel: Channel) -> RenderedMessage {
    let emoji = severity_emoji(alert.severity);
    let title = format!("{} {} - {}", emoji, alert.severity, alert.title);

    match channel {
        Channel::Sms => {
            let mut text = format!("{}\n{}", title, alert.message);
            if text.chars().count() > SMS_MAX_LEN {
                text = text.chars().take(SMS_MAX_LEN - 1).collect::<String>() + "…";
            }
            RenderedMessage::Sms { text }
        }

        Channel::Email => RenderedMessage::Email {
            subject: title,
            html: render_email_html(alert),
        },

        Channel::Push => RenderedMessage::Push {
            title,
            body: alert.message.clone(),
            data: json!({
                "alertId": alert.id.to_string(),
                "siteId": alert.site_id,
                "severity": alert.severity,
                "url": format!("/alerts/{}", alert.id),
                "timestamp": alert.created_at.to_rfc3339(),
            }),
            require_interaction: alert.severity == Severity::Critical,
        },

        Channel::Messenger => RenderedMessage::Messenger {
            text: format!(
                "{title}\n\n{message}\n\nSite: {site}\nParameter: {parameter}\nCurrent value: {value}{unit}\nThreshold: {threshold}{unit}\nTime: {time}",
                message = alert.message,
                site = alert.site_id,
                parameter = alert.parameter,
                value = format_value(alert.current_value),
                threshold = format_value(alert.threshold_value),
                unit = alert.unit,
                time = alert.created_at.format("%Y-%m-%d %H:%M UTC"),
            ),
        },
    }
}

fn render_email_html(alert: &Alert) -> String {
    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h2 style="color: {color};">{severity} Alert</h2>
  <div style="background-color: #f8f9fa; padding: 20px; border-radius: 8px;">
    <h3>{title}</h3>
    <p><strong>{message}</strong></p>
    <ul>
      <li><strong>Site:</strong> {site}</li>
      <li><strong>Parameter:</strong> {parameter}</li>
      <li><strong>Severity:</strong> {severity}</li>
      <li><strong>Current value:</strong> {value}{unit}</li>
      <li><strong>Threshold:</strong> {threshold}{unit}</li>
      <li><strong>Time:</strong> {time}</li>
    </ul>
  </div>
  <p style="color: #666; font-size: 14px;">
    This is an automated alert from your pond monitoring system.
  </p>
</div>"#,
        color = severity_color(alert.severity),
        severity = alert.severity,
        title = alert.title,
        message = alert.message,
        site = alert.site_id,
        parameter = alert.parameter,
        value = format_value(alert.current_value),
        threshold = format_value(alert.threshold_value),
        unit = alert.unit,
        time = alert.created_at.to_rfc3339(),
    )
}
