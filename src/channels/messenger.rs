//! Instant-messaging channel adapter.
//!
//! Sends the detailed text block through a business-messaging HTTP API
//! (graph-style: one endpoint, access token, recipient id in the payload).

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, instrument};

use super::{ChannelAdapter, DeliveryAck, SendError, http_client};
use crate::config::MessengerConfig;
use crate::render::RenderedMessage;
use crate::router::Channel;

pub struct MessengerAdapter {
    client: Client,
    config: MessengerConfig,
}

impl MessengerAdapter {
    pub fn new(config: MessengerConfig, timeout: std::time::Duration) -> Self {
        Self {
            client: http_client(timeout),
            config,
        }
    }
}

/// Messenger ids are the international phone number without the `+`
fn validate_messenger_id(raw: &str) -> Result<&str, SendError> {
    let id = raw.trim();

    if id.is_empty() || !id.chars().all(|c| c.is_ascii_digit()) {
        return Err(SendError::InvalidAddress(format!(
            "not a valid messenger id: {raw}"
        )));
    }

    Ok(id)
}

#[async_trait]
impl ChannelAdapter for MessengerAdapter {
    fn channel(&self) -> Channel {
        Channel::Messenger
    }

    #[instrument(skip(self, message))]
    async fn send(&self, address: &str, message: &RenderedMessage) -> Result<DeliveryAck, SendError> {
        let RenderedMessage::Messenger { text } = message else {
            return Err(SendError::Rejected(String::from(
                "payload was not rendered for the messenger channel",
            )));
        };

        let to = validate_messenger_id(address)?;

        let payload = json!({
            "messaging_product": "whatsapp",
            "to": to,
            "type": "text",
            "text": { "body": text },
        });

        let response = self
            .client
            .post(&self.config.url)
            .bearer_auth(&self.config.access_token)
            .json(&payload)
            .send()
            .await
            .map_err(SendError::from_transport)?;

        if !response.status().is_success() {
            return Err(SendError::Rejected(format!(
                "messenger provider returned status {}",
                response.status()
            )));
        }

        debug!("messenger message delivered to {to}");
        Ok(DeliveryAck::default())
    }
}
