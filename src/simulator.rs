//! Randomized reading generator for running the pipeline without sensors.
//!
//! Each site gets one task producing a reading per parameter on its
//! configured interval. Values are drawn around the middle of the parameter's
//! acceptable range, with an occasional excursion outside it so alerts
//! actually fire during demos and soak tests.

use rand::Rng;
use tokio::sync::broadcast;
use tracing::{debug, instrument, trace};

use crate::Reading;
use crate::config::{SiteConfig, ThresholdRule, default_rules};

/// Chance that a generated value lies outside the acceptable range
const ANOMALY_PROBABILITY: f64 = 0.08;

/// Generate one plausible reading for a parameter.
///
/// Normal values sit within the middle 80% of the rule's range; anomalous
/// values overshoot a bound by up to half the range width, enough to
/// sometimes cross the HIGH escalation factor.
pub fn generate_value(rule: &ThresholdRule, rng: &mut impl Rng) -> f64 {
    let width = rule.max - rule.min;

    if rng.gen_bool(ANOMALY_PROBABILITY) {
        let overshoot = rng.gen_range(0.0..width * 0.5);
        if rng.gen_bool(0.5) {
            rule.min - overshoot
        } else {
            rule.max + overshoot
        }
    } else {
        rng.gen_range(rule.min + width * 0.1..rule.max - width * 0.1)
    }
}

/// Produce one reading per default parameter for a site
pub fn generate_readings(site_id: &str, rng: &mut impl Rng) -> Vec<Reading> {
    default_rules()
        .iter()
        .map(|rule| Reading {
            site_id: site_id.to_string(),
            parameter: rule.parameter.clone(),
            value: round2(generate_value(rule, rng)),
            unit: rule.unit.clone(),
            timestamp: chrono::Utc::now(),
        })
        .collect()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Run the simulation loop for one site, publishing readings until every
/// receiver is gone
#[instrument(skip(site, reading_tx), fields(site_id = %site.id))]
pub async fn run_site(site: SiteConfig, reading_tx: broadcast::Sender<Reading>) {
    let display_name = site.display.clone().unwrap_or_else(|| site.id.clone());
    debug!("starting simulator for {} with interval {}s", display_name, site.interval);

    let mut interval = tokio::time::interval(std::time::Duration::from_secs(site.interval.max(1)));

    loop {
        interval.tick().await;

        let readings = {
            let mut rng = rand::thread_rng();
            generate_readings(&site.id, &mut rng)
        };

        trace!("generated {} readings for {}", readings.len(), display_name);

        for reading in readings {
            if reading_tx.send(reading).is_err() {
                debug!("no subscribers left, stopping simulator for {}", display_name);
                return;
            }
        }
    }
}
