use std::time::Duration;

use tracing::trace;

use crate::Severity;
use crate::router::Recipient;

/// Configured acceptable range for one parameter.
///
/// Rules are looked up by parameter name and never mutated by the pipeline.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ThresholdRule {
    pub parameter: String,
    pub min: f64,
    pub max: f64,
    pub unit: String,
}

/// Escalation factors deciding when a breach is HIGH instead of MEDIUM.
///
/// A reading below `min * below_min` or above `max * above_max` escalates to
/// HIGH. Operators can tune these per deployment.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct EscalationFactors {
    #[serde(default = "default_below_min_factor")]
    pub below_min: f64,

    #[serde(default = "default_above_max_factor")]
    pub above_max: f64,
}

impl Default for EscalationFactors {
    fn default() -> Self {
        Self {
            below_min: default_below_min_factor(),
            above_max: default_above_max_factor(),
        }
    }
}

fn default_below_min_factor() -> f64 {
    0.8
}

fn default_above_max_factor() -> f64 {
    1.2
}

/// Fan-out limits for the dispatch coordinator
#[derive(Debug, Clone, Copy, serde::Deserialize)]
pub struct DispatchConfig {
    /// Maximum concurrent outbound sends across all channels
    #[serde(default = "default_max_concurrent_sends")]
    pub max_concurrent_sends: usize,

    /// Per-send timeout in seconds
    #[serde(default = "default_send_timeout_secs")]
    pub send_timeout_secs: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_concurrent_sends: default_max_concurrent_sends(),
            send_timeout_secs: default_send_timeout_secs(),
        }
    }
}

impl DispatchConfig {
    pub fn send_timeout(&self) -> Duration {
        Duration::from_secs(self.send_timeout_secs)
    }
}

fn default_max_concurrent_sends() -> usize {
    8
}

fn default_send_timeout_secs() -> u64 {
    10
}

/// SMS provider transport configuration
#[derive(Debug, Clone, serde::Deserialize)]
pub struct SmsConfig {
    /// Provider message endpoint
    pub url: String,

    /// Sender number the provider sends from
    pub sender: String,

    pub token: Option<String>,

    /// Country code applied to phone numbers without one
    #[serde(default = "default_country_code")]
    pub default_country_code: String,
}

fn default_country_code() -> String {
    String::from("+213")
}

/// Transactional email provider configuration
#[derive(Debug, Clone, serde::Deserialize)]
pub struct EmailConfig {
    /// Provider send endpoint
    pub url: String,

    /// From address
    pub from: String,

    pub token: Option<String>,
}

/// Web push configuration
#[derive(Debug, Clone, serde::Deserialize)]
pub struct PushConfig {
    /// Bearer token presented to push endpoints
    pub token: Option<String>,

    /// Message TTL in seconds
    #[serde(default = "default_push_ttl_secs")]
    pub ttl_secs: u64,
}

fn default_push_ttl_secs() -> u64 {
    86400
}

/// Instant-messaging provider configuration
#[derive(Debug, Clone, serde::Deserialize)]
pub struct MessengerConfig {
    /// Provider message endpoint
    pub url: String,

    pub access_token: String,
}

/// Transport configuration per notification channel.
///
/// A channel with no configuration here is unavailable: every send attempt on
/// it fails fast instead of timing out.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct ChannelsConfig {
    pub sms: Option<SmsConfig>,
    pub email: Option<EmailConfig>,
    pub push: Option<PushConfig>,
    pub messenger: Option<MessengerConfig>,
}

/// A recipient entry in the config file, with the sites it is subscribed to
#[derive(Debug, Clone, serde::Deserialize)]
pub struct RecipientEntry {
    /// Sites this recipient should be notified about
    pub site_ids: Vec<String>,

    #[serde(flatten)]
    pub recipient: Recipient,
}

/// A monitored site driven by the reading simulator
#[derive(Debug, Clone, serde::Deserialize)]
pub struct SiteConfig {
    pub id: String,
    pub display: Option<String>,

    /// Seconds between simulated readings
    #[serde(default = "default_site_interval")]
    pub interval: u64,
}

fn default_site_interval() -> u64 {
    30
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    /// Threshold rules; defaults are used for parameters not listed here
    pub thresholds: Option<Vec<ThresholdRule>>,

    #[serde(default)]
    pub escalation: EscalationFactors,

    /// Suppression window in seconds for duplicate alerts (default 1 hour)
    #[serde(default = "default_suppression_window_secs")]
    pub suppression_window_secs: u64,

    /// Readings older than this are treated as a sensor malfunction
    #[serde(default = "default_max_reading_age_secs")]
    pub max_reading_age_secs: u64,

    #[serde(default)]
    pub dispatch: DispatchConfig,

    #[serde(default)]
    pub channels: ChannelsConfig,

    pub recipients: Option<Vec<RecipientEntry>>,

    pub sites: Option<Vec<SiteConfig>>,
}

fn default_suppression_window_secs() -> u64 {
    3600
}

fn default_max_reading_age_secs() -> u64 {
    3600
}

impl Default for Config {
    fn default() -> Self {
        Self {
            thresholds: None,
            escalation: EscalationFactors::default(),
            suppression_window_secs: default_suppression_window_secs(),
            max_reading_age_secs: default_max_reading_age_secs(),
            dispatch: DispatchConfig::default(),
            channels: ChannelsConfig::default(),
            recipients: None,
            sites: None,
        }
    }
}

impl Config {
    pub fn suppression_window(&self) -> Duration {
        Duration::from_secs(self.suppression_window_secs)
    }

    pub fn max_reading_age(&self) -> Duration {
        Duration::from_secs(self.max_reading_age_secs)
    }

    /// Look up the threshold rule for a parameter.
    ///
    /// Config-provided rules take precedence over the built-in defaults. This
    /// is re-evaluated on every lookup so a reloaded config takes effect
    /// without restarting the pipeline.
    pub fn rule_for(&self, parameter: &str) -> Option<ThresholdRule> {
        if let Some(rules) = &self.thresholds
            && let Some(rule) = rules.iter().find(|rule| rule.parameter == parameter)
        {
            return Some(rule.clone());
        }

        default_rules()
            .iter()
            .find(|rule| rule.parameter == parameter)
            .cloned()
    }
}

/// Built-in threshold rules for common water-quality parameters
pub fn default_rules() -> Vec<ThresholdRule> {
    vec![
        ThresholdRule {
            parameter: String::from("temperature"),
            min: 20.0,
            max: 30.0,
            unit: String::from("°C"),
        },
        ThresholdRule {
            parameter: String::from("ph"),
            min: 6.5,
            max: 8.5,
            unit: String::from("pH"),
        },
        ThresholdRule {
            parameter: String::from("dissolved_oxygen"),
            min: 5.0,
            max: 15.0,
            unit: String::from("mg/L"),
        },
        ThresholdRule {
            parameter: String::from("ammonia"),
            min: 0.0,
            max: 0.5,
            unit: String::from("mg/L"),
        },
        ThresholdRule {
            parameter: String::from("nitrite"),
            min: 0.0,
            max: 0.1,
            unit: String::from("mg/L"),
        },
        ThresholdRule {
            parameter: String::from("turbidity"),
            min: 0.0,
            max: 10.0,
            unit: String::from("NTU"),
        },
    ]
}

/// Default severity floor for recipients without preferences
pub fn default_min_severity() -> Severity {
    Severity::Medium
}

pub fn read_config_file(path: &str) -> anyhow::Result<Config> {
    let file_content = std::fs::read_to_string(path)?;
    serde_json::from_str(&file_content)
        .map_err(|_| anyhow::anyhow!("Invalid configuration file provided!"))
        .inspect(|config: &Config| trace!("loaded config: {config:?}"))
}
