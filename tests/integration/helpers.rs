//! Shared helpers for integration tests

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use pondguard::actors::AlertPipeline;
use pondguard::channels::{Adapters, ChannelAdapter, DeliveryAck, SendError};
use pondguard::config::Config;
use pondguard::dedup::AlertDeduplicator;
use pondguard::directory::{RecipientDirectory, StaticDirectory};
use pondguard::dispatch::DispatchCoordinator;
use pondguard::render::RenderedMessage;
use pondguard::router::{Channel, ChannelPreferences, ContactAddresses, Recipient};
use pondguard::store::MemoryStore;
use pondguard::{Reading, Severity};

/// Adapter that either succeeds or fails with a scripted error
pub struct RecordingAdapter {
    channel: Channel,
    fail_with: Option<fn() -> SendError>,
}

impl RecordingAdapter {
    pub fn succeeding(channel: Channel) -> Self {
        Self {
            channel,
            fail_with: None,
        }
    }

    pub fn failing(channel: Channel, fail_with: fn() -> SendError) -> Self {
        Self {
            channel,
            fail_with: Some(fail_with),
        }
    }
}

#[async_trait]
impl ChannelAdapter for RecordingAdapter {
    fn channel(&self) -> Channel {
        self.channel
    }

    async fn send(
        &self,
        _address: &str,
        _message: &RenderedMessage,
    ) -> Result<DeliveryAck, SendError> {
        match self.fail_with {
            Some(make_error) => Err(make_error()),
            None => Ok(DeliveryAck::default()),
        }
    }
}

pub fn reading(site: &str, parameter: &str, value: f64, unit: &str) -> Reading {
    Reading {
        site_id: String::from(site),
        parameter: String::from(parameter),
        value,
        unit: String::from(unit),
        timestamp: Utc::now(),
    }
}

/// A recipient with every contact address configured
pub fn full_recipient(id: &str, min_severity: Severity) -> Recipient {
    Recipient {
        id: String::from(id),
        name: Some(format!("Recipient {id}")),
        contacts: ContactAddresses {
            phone: Some(String::from("0550123456")),
            email: Some(format!("{id}@example.com")),
            push_endpoint: Some(String::from("https://push.example.com/sub/abc")),
            messenger_id: Some(String::from("213550123456")),
        },
        preference: Some(ChannelPreferences {
            min_severity,
            sms_enabled: true,
            email_enabled: true,
            push_enabled: false,
            messenger_enabled: false,
        }),
    }
}

/// Directory serving the same recipients for every site
pub struct FixedDirectory(pub Vec<Recipient>);

#[async_trait]
impl RecipientDirectory for FixedDirectory {
    async fn recipients_for_site(&self, _site_id: &str) -> Vec<Recipient> {
        self.0.clone()
    }
}

pub struct TestPipeline {
    pub pipeline: Arc<AlertPipeline>,
    pub store: Arc<MemoryStore>,
}

/// Build a pipeline over an in-memory store with the given adapters and
/// recipients
pub fn build_pipeline(adapters: Adapters, recipients: Vec<Recipient>) -> TestPipeline {
    let config = Arc::new(RwLock::new(Config::default()));
    let store = Arc::new(MemoryStore::new());
    let dedup = AlertDeduplicator::new(store.clone(), Duration::from_secs(3600));
    let coordinator = DispatchCoordinator::new(adapters, 8, Duration::from_millis(500));

    let directory: Arc<dyn RecipientDirectory> = if recipients.is_empty() {
        Arc::new(StaticDirectory::default())
    } else {
        Arc::new(FixedDirectory(recipients))
    };

    TestPipeline {
        pipeline: Arc::new(AlertPipeline::new(config, dedup, coordinator, directory)),
        store,
    }
}
