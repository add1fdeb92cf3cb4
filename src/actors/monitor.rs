//! MonitorActor - drives readings through the alert pipeline
//!
//! One actor owns the whole evaluation flow: threshold check, deduplication,
//! alert creation and dispatch. It consumes readings from a broadcast channel
//! (many producers, possibly other subscribers) and publishes pipeline events
//! for the surrounding system.
//!
//! The pipeline itself is a plain service object (`AlertPipeline`) with
//! injected dependencies; the actor is a thin loop around it. Callers that do
//! not want the actor machinery can drive `AlertPipeline::process` directly.

use std::fmt;
use std::sync::Arc;

use tokio::sync::{RwLock, broadcast, mpsc};
use tracing::{debug, error, info, instrument, trace, warn};

use crate::config::Config;
use crate::dedup::AlertDeduplicator;
use crate::directory::RecipientDirectory;
use crate::dispatch::{DispatchCoordinator, DispatchError, DispatchReport};
use crate::evaluator;
use crate::store::StoreError;
use crate::{Alert, Reading};

use super::messages::{MonitorCommand, PipelineEvent, PipelineState};

/// Errors that mean an evaluation itself could not proceed.
///
/// These are reported to the caller synchronously; no alert is created and no
/// dispatch is attempted. Per-channel send failures are NOT errors here, they
/// end up inside the dispatch report.
#[derive(Debug)]
pub enum PipelineError {
    /// No threshold rule is configured for the reading's parameter
    MissingRule(String),

    /// The alert store failed during deduplication or creation
    Store(StoreError),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::MissingRule(parameter) => {
                write!(f, "no threshold rule configured for parameter {parameter}")
            }
            PipelineError::Store(err) => write!(f, "alert store failure: {err}"),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for PipelineError {
    fn from(err: StoreError) -> Self {
        PipelineError::Store(err)
    }
}

/// What one reading produced
#[derive(Debug)]
pub enum ProcessOutcome {
    /// The reading is within its acceptable range
    InRange,

    /// An anomaly was detected but an active alert already covers it
    Suppressed,

    /// A new alert was created; the report covers its fan-out, or is `None`
    /// when no recipients resolved for the site
    AlertRaised {
        alert: Alert,
        report: Option<DispatchReport>,
    },
}

/// The evaluation -> deduplication -> dispatch pipeline with injected
/// dependencies. No global state; construct one per deployment and share it.
pub struct AlertPipeline {
    config: Arc<RwLock<Config>>,
    dedup: AlertDeduplicator,
    coordinator: DispatchCoordinator,
    directory: Arc<dyn RecipientDirectory>,
}

impl AlertPipeline {
    pub fn new(
        config: Arc<RwLock<Config>>,
        dedup: AlertDeduplicator,
        coordinator: DispatchCoordinator,
        directory: Arc<dyn RecipientDirectory>,
    ) -> Self {
        Self {
            config,
            dedup,
            coordinator,
            directory,
        }
    }

    /// Drive one reading through the full pipeline.
    ///
    /// The threshold rule is looked up on every call so configuration changes
    /// take effect without restart.
    #[instrument(skip(self, reading), fields(site_id = %reading.site_id, parameter = %reading.parameter))]
    pub async fn process(&self, reading: &Reading) -> Result<ProcessOutcome, PipelineError> {
        let (rule, factors, max_age) = {
            let config = self.config.read().await;
            (
                config.rule_for(&reading.parameter),
                config.escalation,
                config.max_reading_age(),
            )
        };

        // A stale reading is an anomaly in itself; skip threshold evaluation
        let candidate = match evaluator::check_staleness(reading, max_age) {
            Some(stale) => Some(stale),
            None => {
                let Some(rule) = rule else {
                    return Err(PipelineError::MissingRule(reading.parameter.clone()));
                };

                evaluator::evaluate(reading, &rule, factors)
                    .map(|breach| breach.into_new_alert(reading, &rule))
            }
        };

        let Some(candidate) = candidate else {
            trace!("reading within range: {}", reading.value);
            return Ok(ProcessOutcome::InRange);
        };

        let Some(alert) = self.dedup.create_if_new(candidate).await? else {
            return Ok(ProcessOutcome::Suppressed);
        };

        info!(
            "alert {} created: {} ({})",
            alert.id, alert.title, alert.severity
        );

        let recipients = self.directory.recipients_for_site(&alert.site_id).await;

        let report = match self.coordinator.dispatch(&alert, &recipients).await {
            Ok(report) => Some(report),
            Err(DispatchError::NoRecipients) => {
                warn!("no recipients configured for site {}", alert.site_id);
                None
            }
        };

        Ok(ProcessOutcome::AlertRaised { alert, report })
    }
}

/// Actor wrapping the pipeline in a reading/command loop
pub struct MonitorActor {
    pipeline: AlertPipeline,
    reading_rx: broadcast::Receiver<Reading>,
    command_rx: mpsc::Receiver<MonitorCommand>,
    event_tx: broadcast::Sender<PipelineEvent>,
    state: PipelineState,
}

impl MonitorActor {
    pub fn new(
        pipeline: AlertPipeline,
        reading_rx: broadcast::Receiver<Reading>,
        command_rx: mpsc::Receiver<MonitorCommand>,
        event_tx: broadcast::Sender<PipelineEvent>,
    ) -> Self {
        Self {
            pipeline,
            reading_rx,
            command_rx,
            event_tx,
            state: PipelineState::default(),
        }
    }

    /// Run the actor's main loop
    #[instrument(skip(self))]
    pub async fn run(mut self) {
        debug!("starting monitor actor");

        loop {
            tokio::select! {
                result = self.reading_rx.recv() => {
                    match result {
                        Ok(reading) => {
                            if !self.state.muted {
                                self.handle_reading(reading).await;
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!("monitor actor lagged, skipped {skipped} readings");
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            warn!("reading channel closed, shutting down");
                            break;
                        }
                    }
                }

                Some(cmd) = self.command_rx.recv() => {
                    match cmd {
                        MonitorCommand::GetState { respond_to } => {
                            let _ = respond_to.send(self.state.clone());
                        }

                        MonitorCommand::Mute => {
                            debug!("muting alert pipeline");
                            self.state.muted = true;
                        }

                        MonitorCommand::Unmute => {
                            debug!("unmuting alert pipeline");
                            self.state.muted = false;
                        }

                        MonitorCommand::Shutdown => {
                            debug!("received shutdown command");
                            break;
                        }
                    }
                }

                else => {
                    warn!("command channel closed, shutting down");
                    break;
                }
            }
        }

        debug!("monitor actor stopped");
    }

    async fn handle_reading(&mut self, reading: Reading) {
        self.state.readings_evaluated += 1;

        match self.pipeline.process(&reading).await {
            Ok(ProcessOutcome::InRange) => {}

            Ok(ProcessOutcome::Suppressed) => {
                self.state.alerts_suppressed += 1;
            }

            Ok(ProcessOutcome::AlertRaised { alert, report }) => {
                self.state.alerts_created += 1;

                let _ = self.event_tx.send(PipelineEvent::AlertCreated(alert));

                if let Some(report) = report {
                    let _ = self.event_tx.send(PipelineEvent::DispatchCompleted(report));
                }
            }

            Err(PipelineError::MissingRule(parameter)) => {
                self.state.readings_without_rule += 1;
                debug!("skipping reading, no threshold rule for {parameter}");
            }

            Err(err) => {
                error!("pipeline failure: {err}");
            }
        }
    }
}

/// Handle for controlling the monitor actor
#[derive(Clone)]
pub struct MonitorHandle {
    sender: mpsc::Sender<MonitorCommand>,
    events: broadcast::Sender<PipelineEvent>,
}

impl MonitorHandle {
    /// Spawn a new monitor actor driving the given pipeline
    pub fn spawn(pipeline: AlertPipeline, reading_rx: broadcast::Receiver<Reading>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(32);
        let (event_tx, _) = broadcast::channel(64);

        let actor = MonitorActor::new(pipeline, reading_rx, cmd_rx, event_tx.clone());
        tokio::spawn(actor.run());

        Self {
            sender: cmd_tx,
            events: event_tx,
        }
    }

    /// Subscribe to pipeline events
    pub fn subscribe(&self) -> broadcast::Receiver<PipelineEvent> {
        self.events.subscribe()
    }

    /// Get the pipeline's counters
    pub async fn get_state(&self) -> Option<PipelineState> {
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.sender
            .send(MonitorCommand::GetState { respond_to: tx })
            .await
            .ok()?;

        rx.await.ok()
    }

    /// Stop evaluating readings
    pub async fn mute(&self) {
        let _ = self.sender.send(MonitorCommand::Mute).await;
    }

    /// Resume evaluating readings
    pub async fn unmute(&self) {
        let _ = self.sender.send(MonitorCommand::Unmute).await;
    }

    /// Shutdown the monitor actor
    pub async fn shutdown(&self) {
        let _ = self.sender.send(MonitorCommand::Shutdown).await;
    }
}
