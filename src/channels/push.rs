//! Web push channel adapter.
//!
//! The recipient address is their push subscription endpoint; the adapter
//! posts the structured payload directly to it with the configured bearer
//! token and TTL headers.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, instrument};

use super::{ChannelAdapter, DeliveryAck, SendError, http_client};
use crate::config::PushConfig;
use crate::render::RenderedMessage;
use crate::router::Channel;

pub struct PushAdapter {
    client: Client,
    config: PushConfig,
}

impl PushAdapter {
    pub fn new(config: PushConfig, timeout: std::time::Duration) -> Self {
        Self {
            client: http_client(timeout),
            config,
        }
    }
}

fn validate_endpoint(raw: &str) -> Result<&str, SendError> {
    let endpoint = raw.trim();

    if !endpoint.starts_with("https://") && !endpoint.starts_with("http://") {
        return Err(SendError::InvalidAddress(format!(
            "push endpoint is not an http(s) url: {raw}"
        )));
    }

    Ok(endpoint)
}

#[async_trait]
impl ChannelAdapter for PushAdapter {
    fn channel(&self) -> Channel {
        Channel::Push
    }

    #[instrument(skip(self, message))]
    async fn send(&self, address: &str, message: &RenderedMessage) -> Result<DeliveryAck, SendError> {
        let RenderedMessage::Push {
            title,
            body,
            data,
            require_interaction,
        } = message
        else {
            return Err(SendError::Rejected(String::from(
                "payload was not rendered for the push channel",
            )));
        };

        let endpoint = validate_endpoint(address)?;

        let payload = json!({
            "notification": {
                "title": title,
                "body": body,
                "data": data,
                "requireInteraction": require_interaction,
            }
        });

        let mut request = self
            .client
            .post(endpoint)
            .header("TTL", self.config.ttl_secs.to_string())
            .json(&payload);

        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(SendError::from_transport)?;

        if !response.status().is_success() {
            return Err(SendError::Rejected(format!(
                "push endpoint returned status {}",
                response.status()
            )));
        }

        debug!("push delivered to {endpoint}");
        Ok(DeliveryAck::default())
    }
}
