//! SMS channel adapter.
//!
//! Sends the short-text payload through an HTTP SMS provider. Phone numbers
//! are normalized before sending: separators are stripped and numbers without
//! a country code get the configured default prefixed (with the leading zero
//! of the national format removed).

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, instrument};

use super::{ChannelAdapter, DeliveryAck, SendError, http_client};
use crate::config::SmsConfig;
use crate::render::RenderedMessage;
use crate::router::Channel;

pub struct SmsAdapter {
    client: Client,
    config: SmsConfig,
}

impl SmsAdapter {
    pub fn new(config: SmsConfig, timeout: std::time::Duration) -> Self {
        Self {
            client: http_client(timeout),
            config,
        }
    }
}

/// Normalize a phone number into E.164-ish form.
///
/// Accepts digits, spaces, dashes and an optional leading `+`. A number
/// without a country code gets `default_country_code` prepended, dropping the
/// national leading zero ("0550123456" with "+213" becomes "+213550123456").
pub fn normalize_phone(raw: &str, default_country_code: &str) -> Result<String, SendError> {
    let trimmed: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();

    if trimmed.is_empty() {
        return Err(SendError::InvalidAddress(String::from("empty phone number")));
    }

    let (has_prefix, digits) = match trimmed.strip_prefix('+') {
        Some(rest) => (true, rest),
        None => (false, trimmed.as_str()),
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(SendError::InvalidAddress(format!(
            "phone number contains invalid characters: {raw}"
        )));
    }

    let normalized = if has_prefix {
        format!("+{digits}")
    } else {
        format!("{}{}", default_country_code, digits.trim_start_matches('0'))
    };

    // +country code plus subscriber number; anything shorter is garbage
    if normalized.len() < 8 || normalized.len() > 16 {
        return Err(SendError::InvalidAddress(format!(
            "phone number has implausible length: {normalized}"
        )));
    }

    Ok(normalized)
}

#[async_trait]
impl ChannelAdapter for SmsAdapter {
    fn channel(&self) -> Channel {
        Channel::Sms
    }

    #[instrument(skip(self, message))]
    async fn send(&self, address: &str, message: &RenderedMessage) -> Result<DeliveryAck, SendError> {
        let RenderedMessage::Sms { text } = message else {
            return Err(SendError::Rejected(String::from(
                "payload was not rendered for the sms channel",
            )));
        };

        let to = normalize_phone(address, &self.config.default_country_code)?;

        let payload = json!({
            "from": self.config.sender,
            "to": to,
            "body": text,
        });

        let mut request = self.client.post(&self.config.url).json(&payload);
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(SendError::from_transport)?;

        if !response.status().is_success() {
            return Err(SendError::Rejected(format!(
                "sms provider returned status {}",
                response.status()
            )));
        }

        let provider_id = response
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|body| body.get("id").and_then(|id| id.as_str()).map(String::from));

        debug!("sms delivered to {to}");
        Ok(DeliveryAck { provider_id })
    }
}
