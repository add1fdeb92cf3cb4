//! Concurrent fan-out of one alert across recipients and channels.
//!
//! Every (recipient, channel) pair selected by the router becomes one send
//! attempt. All attempts for one alert run concurrently, bounded by a
//! semaphore so an alert burst cannot open unbounded connections to the
//! channel providers. Attempts fail independently: a timeout or rejection on
//! one channel never cancels or delays another. The coordinator itself only
//! fails when there is nobody to dispatch to.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Semaphore;
use tracing::{debug, instrument, warn};

use crate::channels::{Adapters, DeliveryAck, SendError};
use crate::render::render;
use crate::router::{Channel, Recipient, select_channels};
use crate::Alert;

/// Result of one send attempt
#[derive(Debug, Clone)]
pub enum AttemptOutcome {
    Delivered(DeliveryAck),
    Failed(SendError),
}

impl AttemptOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, AttemptOutcome::Delivered(_))
    }
}

/// One (recipient, channel) send attempt and how it ended
#[derive(Debug, Clone)]
pub struct DispatchAttempt {
    pub alert_id: u64,
    pub recipient_id: String,
    pub channel: Channel,
    pub outcome: AttemptOutcome,
    pub timestamp: DateTime<Utc>,
}

/// Aggregated record of every send attempt for one alert.
///
/// Partial failure is not an error: a report with failed attempts still means
/// the dispatch as a whole completed.
#[derive(Debug, Clone, Default)]
pub struct DispatchReport {
    pub alert_id: u64,
    pub attempts: Vec<DispatchAttempt>,
}

impl DispatchReport {
    pub fn succeeded(&self) -> usize {
        self.attempts.iter().filter(|a| a.outcome.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.attempts.len() - self.succeeded()
    }

    /// Some attempts failed but at least one went through
    pub fn is_degraded(&self) -> bool {
        self.failed() > 0 && self.succeeded() > 0
    }
}

/// Errors that prevent a dispatch from even starting
#[derive(Debug)]
pub enum DispatchError {
    /// No recipients resolved for the alert's site
    NoRecipients,
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::NoRecipients => write!(f, "no recipients resolved for dispatch"),
        }
    }
}

impl std::error::Error for DispatchError {}

/// Drives the concurrent fan-out for one alert at a time
pub struct DispatchCoordinator {
    adapters: Adapters,

    /// Bounds concurrent outbound sends across all channels
    permits: Arc<Semaphore>,

    /// Upper bound on any single send, on top of the adapters' own timeouts
    send_timeout: Duration,
}

impl DispatchCoordinator {
    pub fn new(adapters: Adapters, max_concurrent_sends: usize, send_timeout: Duration) -> Self {
        Self {
            adapters,
            permits: Arc::new(Semaphore::new(max_concurrent_sends.max(1))),
            send_timeout,
        }
    }

    /// Fan one alert out to all selected (recipient, channel) pairs.
    ///
    /// Returns a report containing exactly one attempt per selected pair, in
    /// no particular completion order. Only fails when `recipients` is empty;
    /// recipients whose preferences select no channels simply contribute no
    /// attempts.
    #[instrument(skip(self, alert, recipients), fields(alert_id = alert.id, severity = %alert.severity))]
    pub async fn dispatch(
        &self,
        alert: &Alert,
        recipients: &[Recipient],
    ) -> Result<DispatchReport, DispatchError> {
        if recipients.is_empty() {
            return Err(DispatchError::NoRecipients);
        }

        let pairs: Vec<(&Recipient, Channel)> = recipients
            .iter()
            .flat_map(|recipient| {
                select_channels(alert, recipient)
                    .into_iter()
                    .map(move |channel| (recipient, channel))
            })
            .collect();

        debug!("dispatching to {} (recipient, channel) pairs", pairs.len());

        let sends = pairs.into_iter().map(|(recipient, channel)| {
            let permits = self.permits.clone();

            async move {
                // Closed only on Semaphore::close, which we never call
                let _permit = permits.acquire().await;

                let outcome = self.attempt(alert, recipient, channel).await;

                if let AttemptOutcome::Failed(error) = &outcome {
                    warn!(
                        "send to {} via {channel} failed: {error}",
                        recipient.display()
                    );
                }

                DispatchAttempt {
                    alert_id: alert.id,
                    recipient_id: recipient.id.clone(),
                    channel,
                    outcome,
                    timestamp: Utc::now(),
                }
            }
        });

        let attempts = futures::future::join_all(sends).await;

        let report = DispatchReport {
            alert_id: alert.id,
            attempts,
        };

        debug!(
            "dispatch completed: {} delivered, {} failed",
            report.succeeded(),
            report.failed()
        );

        Ok(report)
    }

    async fn attempt(&self, alert: &Alert, recipient: &Recipient, channel: Channel) -> AttemptOutcome {
        // An unconfigured channel fails fast without consuming timeout budget
        let Some(adapter) = self.adapters.get(channel) else {
            return AttemptOutcome::Failed(SendError::Unavailable(format!(
                "no {channel} transport configured"
            )));
        };

        let Some(address) = recipient.contacts.address_for(channel) else {
            return AttemptOutcome::Failed(SendError::InvalidAddress(format!(
                "recipient {} has no {channel} address",
                recipient.id
            )));
        };

        let message = render(alert, channel);

        match tokio::time::timeout(self.send_timeout, adapter.send(address, &message)).await {
            Ok(Ok(ack)) => AttemptOutcome::Delivered(ack),
            Ok(Err(error)) => AttemptOutcome::Failed(error),
            Err(_) => AttemptOutcome::Failed(SendError::Timeout),
        }
    }
}
