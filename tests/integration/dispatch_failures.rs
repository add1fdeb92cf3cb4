//! Failure isolation across channels during fan-out

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use pondguard::actors::ProcessOutcome;
use pondguard::channels::{Adapters, SendError};
use pondguard::dispatch::{AttemptOutcome, DispatchCoordinator};
use pondguard::router::Channel;
use pondguard::{Alert, AlertKind, AlertStatus, Severity};

use super::helpers::{RecordingAdapter, build_pipeline, full_recipient, reading};

#[tokio::test]
async fn one_timing_out_channel_degrades_but_does_not_fail_dispatch() {
    // 2 recipients x 2 channels; SMS always times out, email succeeds
    let mut adapters = Adapters::new();
    adapters.register(Arc::new(RecordingAdapter::failing(Channel::Sms, || {
        SendError::Timeout
    })));
    adapters.register(Arc::new(RecordingAdapter::succeeding(Channel::Email)));

    let test = build_pipeline(
        adapters,
        vec![
            full_recipient("user-1", Severity::Low),
            full_recipient("user-2", Severity::Low),
        ],
    );

    let started = Instant::now();
    let outcome = test
        .pipeline
        .process(&reading("pond-1", "dissolved_oxygen", 3.0, "mg/L"))
        .await
        .unwrap();

    let ProcessOutcome::AlertRaised { report, .. } = outcome else {
        panic!("expected an alert");
    };
    let report = report.unwrap();

    assert_eq!(report.attempts.len(), 4);
    assert_eq!(report.succeeded(), 2);
    assert_eq!(report.failed(), 2);
    assert!(report.is_degraded());

    for attempt in &report.attempts {
        match attempt.channel {
            Channel::Sms => assert!(matches!(
                attempt.outcome,
                AttemptOutcome::Failed(SendError::Timeout)
            )),
            Channel::Email => assert!(attempt.outcome.is_success()),
            _ => panic!("unexpected channel {}", attempt.channel),
        }
    }

    // The failing channel fails immediately here; the whole dispatch settles
    // well inside the configured send timeout
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn unavailable_channel_fails_every_attempt_without_blocking() {
    // Email only; SMS has no transport configured
    let mut adapters = Adapters::new();
    adapters.register(Arc::new(RecordingAdapter::succeeding(Channel::Email)));

    let test = build_pipeline(adapters, vec![full_recipient("user-1", Severity::Low)]);

    let ProcessOutcome::AlertRaised { report, .. } = test
        .pipeline
        .process(&reading("pond-1", "dissolved_oxygen", 3.0, "mg/L"))
        .await
        .unwrap()
    else {
        panic!("expected an alert");
    };
    let report = report.unwrap();

    assert_eq!(report.attempts.len(), 2);

    let sms = report
        .attempts
        .iter()
        .find(|a| a.channel == Channel::Sms)
        .unwrap();
    assert!(matches!(
        sms.outcome,
        AttemptOutcome::Failed(SendError::Unavailable(_))
    ));

    let email = report
        .attempts
        .iter()
        .find(|a| a.channel == Channel::Email)
        .unwrap();
    assert!(email.outcome.is_success());
}

#[tokio::test]
async fn critical_alert_reaches_every_configured_address() {
    let mut adapters = Adapters::new();
    for channel in Channel::ALL {
        adapters.register(Arc::new(RecordingAdapter::succeeding(channel)));
    }

    let coordinator = DispatchCoordinator::new(adapters, 8, Duration::from_millis(500));

    let alert = Alert {
        id: 9,
        site_id: String::from("pond-1"),
        parameter: String::from("ammonia"),
        kind: AlertKind::ThresholdExceeded,
        severity: Severity::Critical,
        title: String::from("Ammonia Alert"),
        message: String::from("Ammonia is too high: 2.0mg/L (maximum: 0.5mg/L)"),
        current_value: 2.0,
        threshold_value: 0.5,
        unit: String::from("mg/L"),
        status: AlertStatus::Active,
        created_at: Utc::now(),
        resolved_at: None,
    };

    // Preferences only enable sms + email, but CRITICAL overrides them and
    // goes out on every channel with a configured address
    let report = coordinator
        .dispatch(&alert, &[full_recipient("user-1", Severity::Low)])
        .await
        .unwrap();

    assert_eq!(report.attempts.len(), 4);
    assert_eq!(report.succeeded(), 4);

    let mut channels: Vec<_> = report.attempts.iter().map(|a| a.channel).collect();
    channels.sort();
    assert_eq!(channels, Channel::ALL.to_vec());
}
