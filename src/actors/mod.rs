//! Actor-based pipeline around the alert core.
//!
//! ## Architecture
//!
//! ```text
//! Reading producers (ingestion, simulator)
//!        |
//!        | broadcast<Reading>
//!        v
//!   MonitorActor ──> AlertPipeline (evaluate -> dedup -> dispatch)
//!        |
//!        | broadcast<PipelineEvent>
//!        v
//! Subscribers (logging, API layer, tests)
//! ```
//!
//! Commands (mute, state queries, shutdown) go to the actor through an mpsc
//! channel with oneshot replies.

pub mod messages;
pub mod monitor;

pub use messages::{MonitorCommand, PipelineEvent, PipelineState};
pub use monitor::{AlertPipeline, MonitorActor, MonitorHandle, PipelineError, ProcessOutcome};
