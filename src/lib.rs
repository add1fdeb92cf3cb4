pub mod actors;
pub mod channels;
pub mod config;
pub mod dedup;
pub mod directory;
pub mod dispatch;
pub mod evaluator;
pub mod render;
pub mod router;
pub mod simulator;
pub mod store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ordered alert severity levels.
///
/// The ordering is used both for escalation (how far a reading is outside its
/// threshold) and for recipient filtering (minimum severity preferences).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Numeric rank within the hierarchy (LOW=0 .. CRITICAL=3)
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Low => 0,
            Severity::Medium => 1,
            Severity::High => 2,
            Severity::Critical => 3,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        };
        write!(f, "{label}")
    }
}

/// One timestamped parameter measurement from a monitored site.
///
/// Readings are produced externally (sensor ingestion or the simulator) and
/// are immutable once recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reading {
    /// Identifier of the monitored site (pond)
    pub site_id: String,

    /// Parameter name, e.g. "temperature", "ph", "dissolved_oxygen"
    pub parameter: String,

    pub value: f64,

    /// Unit the value was measured in, e.g. "mg/L". No conversion is
    /// performed anywhere in the pipeline; rules must use the same unit.
    pub unit: String,

    pub timestamp: DateTime<Utc>,
}

/// What kind of condition an alert describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// A reading crossed a configured threshold bound
    ThresholdExceeded,

    /// No recent reading arrived for a sensor (stale data)
    SensorMalfunction,
}

/// Lifecycle state of an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    Active,
    Acknowledged,
    Resolved,
}

/// A confirmed anomaly for one (site, parameter) pair.
///
/// Created by the evaluation + deduplication stage; resolution and
/// acknowledgement are driven by the surrounding system through the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: u64,
    pub site_id: String,
    pub parameter: String,
    pub kind: AlertKind,
    pub severity: Severity,
    pub title: String,
    pub message: String,

    /// Value of the reading that triggered the alert
    pub current_value: f64,

    /// The threshold bound that was crossed (min or max)
    pub threshold_value: f64,

    pub unit: String,
    pub status: AlertStatus,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Alert {
    pub fn is_active(&self) -> bool {
        matches!(self.status, AlertStatus::Active | AlertStatus::Acknowledged)
    }
}

/// Alert data before the store has assigned an id and creation timestamp
#[derive(Debug, Clone)]
pub struct NewAlert {
    pub site_id: String,
    pub parameter: String,
    pub kind: AlertKind,
    pub severity: Severity,
    pub title: String,
    pub message: String,
    pub current_value: f64,
    pub threshold_value: f64,
    pub unit: String,
}
