//! Notification channel adapters.
//!
//! One adapter per channel, all behind the `ChannelAdapter` trait so the
//! dispatch coordinator stays channel-agnostic. Each adapter owns its own
//! transport (an HTTP client with an intrinsic per-call timeout), its own
//! credentials and its own address validation. Adapters never retry; a failed
//! send is reported as a typed error and the caller decides what to do.

pub mod email;
pub mod messenger;
pub mod push;
pub mod sms;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::ChannelsConfig;
use crate::render::RenderedMessage;
use crate::router::Channel;

pub use email::EmailAdapter;
pub use messenger::MessengerAdapter;
pub use push::PushAdapter;
pub use sms::SmsAdapter;

/// Errors a single send attempt can fail with
#[derive(Debug, Clone)]
pub enum SendError {
    /// The recipient's address is missing or malformed for this channel
    InvalidAddress(String),

    /// The channel's transport or credentials are not configured; fails fast
    /// without consuming the timeout budget
    Unavailable(String),

    /// The provider call did not complete within the adapter's timeout
    Timeout,

    /// The provider explicitly rejected the message
    Rejected(String),
}

impl fmt::Display for SendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendError::InvalidAddress(msg) => write!(f, "invalid recipient address: {}", msg),
            SendError::Unavailable(msg) => write!(f, "channel unavailable: {}", msg),
            SendError::Timeout => write!(f, "send timed out"),
            SendError::Rejected(msg) => write!(f, "provider rejected message: {}", msg),
        }
    }
}

impl std::error::Error for SendError {}

impl SendError {
    /// Classify a reqwest failure: timeouts become `Timeout`, everything else
    /// is a rejection with the transport error as detail
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SendError::Timeout
        } else {
            SendError::Rejected(err.to_string())
        }
    }
}

/// Provider acknowledgement for a delivered message
#[derive(Debug, Clone, Default)]
pub struct DeliveryAck {
    /// Provider-assigned message id, when the provider returns one
    pub provider_id: Option<String>,
}

/// Capability every notification channel implements.
///
/// Implementations must be `Send + Sync`; one adapter instance is shared
/// across all concurrent sends on its channel.
#[async_trait]
pub trait ChannelAdapter: Send + Sync {
    /// The channel this adapter serves
    fn channel(&self) -> Channel;

    /// Deliver one rendered message to one address.
    ///
    /// The address is the recipient's raw configured contact; the adapter
    /// validates and normalizes it. The call resolves within the adapter's
    /// timeout or fails with `SendError::Timeout`.
    async fn send(&self, address: &str, message: &RenderedMessage) -> Result<DeliveryAck, SendError>;
}

/// Table of available adapters, keyed by channel.
///
/// Channels without a configured transport are simply absent; sends on them
/// fail fast with `SendError::Unavailable`.
#[derive(Clone, Default)]
pub struct Adapters {
    adapters: HashMap<Channel, Arc<dyn ChannelAdapter>>,
}

impl Adapters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the adapter table from the channel transport configuration
    pub fn from_config(config: &ChannelsConfig, timeout: Duration) -> Self {
        let mut adapters = Self::new();

        if let Some(sms) = &config.sms {
            adapters.register(Arc::new(SmsAdapter::new(sms.clone(), timeout)));
        }
        if let Some(email) = &config.email {
            adapters.register(Arc::new(EmailAdapter::new(email.clone(), timeout)));
        }
        if let Some(push) = &config.push {
            adapters.register(Arc::new(PushAdapter::new(push.clone(), timeout)));
        }
        if let Some(messenger) = &config.messenger {
            adapters.register(Arc::new(MessengerAdapter::new(messenger.clone(), timeout)));
        }

        adapters
    }

    pub fn register(&mut self, adapter: Arc<dyn ChannelAdapter>) {
        self.adapters.insert(adapter.channel(), adapter);
    }

    pub fn get(&self, channel: Channel) -> Option<Arc<dyn ChannelAdapter>> {
        self.adapters.get(&channel).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

/// Build the shared HTTP client used by the adapters
pub(crate) fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_default()
}
