//! Threshold evaluation for incoming readings.
//!
//! Evaluation is a pure function of a reading, its threshold rule and the
//! configured escalation factors. It has no side effects and no knowledge of
//! suppression or dispatch.

use chrono::Utc;

use crate::config::{EscalationFactors, ThresholdRule};
use crate::{AlertKind, NewAlert, Reading, Severity};

/// Which bound of the rule was crossed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreachedBound {
    Min,
    Max,
}

/// Outcome of evaluating a reading that is outside its acceptable range
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdBreach {
    pub bound: BreachedBound,
    pub severity: Severity,

    /// The bound value that was crossed
    pub threshold_value: f64,

    pub message: String,
}

/// Compare a reading against a rule.
///
/// Returns `None` when the value lies within `[rule.min, rule.max]`. A value
/// below `min * factors.below_min` (or above `max * factors.above_max`)
/// escalates to HIGH, otherwise the breach is MEDIUM.
///
/// Comparisons use the rule's stored unit; no unit conversion is performed.
pub fn evaluate(
    reading: &Reading,
    rule: &ThresholdRule,
    factors: EscalationFactors,
) -> Option<ThresholdBreach> {
    let value = reading.value;

    if value < rule.min {
        let severity = if value < rule.min * factors.below_min {
            Severity::High
        } else {
            Severity::Medium
        };

        return Some(ThresholdBreach {
            bound: BreachedBound::Min,
            severity,
            threshold_value: rule.min,
            message: format!(
                "{} is too low: {}{} (minimum: {}{})",
                display_parameter(&rule.parameter),
                format_value(value),
                rule.unit,
                format_value(rule.min),
                rule.unit
            ),
        });
    }

    if value > rule.max {
        let severity = if value > rule.max * factors.above_max {
            Severity::High
        } else {
            Severity::Medium
        };

        return Some(ThresholdBreach {
            bound: BreachedBound::Max,
            severity,
            threshold_value: rule.max,
            message: format!(
                "{} is too high: {}{} (maximum: {}{})",
                display_parameter(&rule.parameter),
                format_value(value),
                rule.unit,
                format_value(rule.max),
                rule.unit
            ),
        });
    }

    None
}

impl ThresholdBreach {
    /// Build the alert payload for this breach
    pub fn into_new_alert(self, reading: &Reading, rule: &ThresholdRule) -> NewAlert {
        NewAlert {
            site_id: reading.site_id.clone(),
            parameter: reading.parameter.clone(),
            kind: AlertKind::ThresholdExceeded,
            severity: self.severity,
            title: format!("{} Alert", display_parameter(&rule.parameter)),
            message: self.message,
            current_value: reading.value,
            threshold_value: self.threshold_value,
            unit: rule.unit.clone(),
        }
    }
}

/// Check whether a reading is too old to be trusted.
///
/// Returns a sensor-malfunction alert when the reading's timestamp is older
/// than `max_age`. Stale data bypasses threshold evaluation entirely.
pub fn check_staleness(reading: &Reading, max_age: std::time::Duration) -> Option<NewAlert> {
    let age = Utc::now().signed_duration_since(reading.timestamp);
    let max_age = chrono::Duration::from_std(max_age).ok()?;

    if age <= max_age {
        return None;
    }

    Some(NewAlert {
        site_id: reading.site_id.clone(),
        parameter: reading.parameter.clone(),
        kind: AlertKind::SensorMalfunction,
        severity: Severity::High,
        title: format!("{} Sensor Malfunction", display_parameter(&reading.parameter)),
        message: format!(
            "No recent {} data for site {}. Last reading was {} minutes ago.",
            display_parameter(&reading.parameter),
            reading.site_id,
            age.num_minutes()
        ),
        current_value: reading.value,
        threshold_value: 0.0,
        unit: reading.unit.clone(),
    })
}

/// Render a measurement value, keeping a trailing `.0` on whole numbers so
/// messages read "3.0mg/L" rather than "3mg/L"
pub(crate) fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

/// Human-readable form of a snake_case parameter name ("dissolved_oxygen" ->
/// "Dissolved Oxygen")
fn display_parameter(parameter: &str) -> String {
    parameter
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
