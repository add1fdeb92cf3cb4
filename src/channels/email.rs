//! Email channel adapter.
//!
//! Delivers the rendered HTML payload through a transactional mail provider's
//! HTTP API.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, instrument};

use super::{ChannelAdapter, DeliveryAck, SendError, http_client};
use crate::config::EmailConfig;
use crate::render::RenderedMessage;
use crate::router::Channel;

pub struct EmailAdapter {
    client: Client,
    config: EmailConfig,
}

impl EmailAdapter {
    pub fn new(config: EmailConfig, timeout: std::time::Duration) -> Self {
        Self {
            client: http_client(timeout),
            config,
        }
    }
}

/// Minimal address sanity check: one `@` with something on both sides and a
/// dot in the domain. Full RFC validation is the provider's job.
fn validate_email(raw: &str) -> Result<&str, SendError> {
    let address = raw.trim();

    let valid = address
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));

    if !valid {
        return Err(SendError::InvalidAddress(format!(
            "not a valid email address: {raw}"
        )));
    }

    Ok(address)
}

#[async_trait]
impl ChannelAdapter for EmailAdapter {
    fn channel(&self) -> Channel {
        Channel::Email
    }

    #[instrument(skip(self, message))]
    async fn send(&self, address: &str, message: &RenderedMessage) -> Result<DeliveryAck, SendError> {
        let RenderedMessage::Email { subject, html } = message else {
            return Err(SendError::Rejected(String::from(
                "payload was not rendered for the email channel",
            )));
        };

        let to = validate_email(address)?;

        let payload = json!({
            "from": self.config.from,
            "to": to,
            "subject": subject,
            "html": html,
        });

        let mut request = self.client.post(&self.config.url).json(&payload);
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(SendError::from_transport)?;

        if !response.status().is_success() {
            return Err(SendError::Rejected(format!(
                "mail provider returned status {}",
                response.status()
            )));
        }

        let provider_id = response
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|body| body.get("id").and_then(|id| id.as_str()).map(String::from));

        debug!("email delivered to {to}");
        Ok(DeliveryAck { provider_id })
    }
}
