//! Message types for pipeline communication.
//!
//! Commands are request/response messages sent to the monitor actor via mpsc;
//! events are broadcast to every interested subscriber. All messages are
//! cloneable for the multi-subscriber pattern.

use tokio::sync::oneshot;

use crate::Alert;
use crate::dispatch::DispatchReport;

/// Events published by the pipeline for the surrounding system.
///
/// The broadcast channel may lag for slow subscribers; alert state always
/// lives in the store, so dropped events only affect live observers.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    /// A new (non-duplicate) alert was created and persisted
    AlertCreated(Alert),

    /// Fan-out for an alert finished; every attempt has settled
    DispatchCompleted(DispatchReport),
}

/// Commands that can be sent to the monitor actor
#[derive(Debug)]
pub enum MonitorCommand {
    /// Get the pipeline's counters
    GetState {
        respond_to: oneshot::Sender<PipelineState>,
    },

    /// Stop evaluating readings (maintenance windows)
    Mute,

    /// Resume evaluating readings
    Unmute,

    /// Gracefully shut down the actor
    Shutdown,
}

/// Counters describing what the pipeline has done so far
#[derive(Debug, Clone, Default)]
pub struct PipelineState {
    pub readings_evaluated: u64,

    /// Readings skipped because no threshold rule exists for their parameter
    pub readings_without_rule: u64,

    pub alerts_created: u64,

    /// Anomalies suppressed by the deduplication window
    pub alerts_suppressed: u64,

    pub muted: bool,
}
