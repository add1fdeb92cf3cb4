//! Concurrent evaluation must never duplicate alerts for one (site, parameter)

use std::sync::Arc;

use pondguard::actors::ProcessOutcome;
use pondguard::channels::Adapters;
use pondguard::router::Channel;
use pondguard::store::AlertStore;
use pondguard::Severity;

use super::helpers::{RecordingAdapter, build_pipeline, full_recipient, reading};

#[tokio::test]
async fn concurrent_anomalies_for_one_parameter_raise_exactly_one_alert() {
    let mut adapters = Adapters::new();
    adapters.register(Arc::new(RecordingAdapter::succeeding(Channel::Sms)));
    adapters.register(Arc::new(RecordingAdapter::succeeding(Channel::Email)));

    let test = build_pipeline(adapters, vec![full_recipient("user-1", Severity::Low)]);

    let tasks: Vec<_> = (0..16)
        .map(|i| {
            let pipeline = test.pipeline.clone();
            tokio::spawn(async move {
                pipeline
                    .process(&reading("pond-1", "dissolved_oxygen", 3.0 + i as f64 * 0.01, "mg/L"))
                    .await
            })
        })
        .collect();

    let mut raised = 0;
    let mut suppressed = 0;
    for task in tasks {
        match task.await.unwrap().unwrap() {
            ProcessOutcome::AlertRaised { .. } => raised += 1,
            ProcessOutcome::Suppressed => suppressed += 1,
            ProcessOutcome::InRange => panic!("all readings were anomalous"),
        }
    }

    assert_eq!(raised, 1);
    assert_eq!(suppressed, 15);
    assert_eq!(test.store.list_active("pond-1").await.unwrap().len(), 1);
}

#[tokio::test]
async fn distinct_site_parameter_pairs_do_not_serialize_each_other() {
    let mut adapters = Adapters::new();
    adapters.register(Arc::new(RecordingAdapter::succeeding(Channel::Email)));

    let test = build_pipeline(adapters, vec![full_recipient("user-1", Severity::Low)]);

    let anomalies = [
        ("pond-1", "dissolved_oxygen", 3.0, "mg/L"),
        ("pond-1", "ph", 9.2, "pH"),
        ("pond-2", "dissolved_oxygen", 3.0, "mg/L"),
        ("pond-2", "ammonia", 0.7, "mg/L"),
    ];

    let tasks: Vec<_> = anomalies
        .into_iter()
        .map(|(site, parameter, value, unit)| {
            let pipeline = test.pipeline.clone();
            tokio::spawn(async move { pipeline.process(&reading(site, parameter, value, unit)).await })
        })
        .collect();

    for task in tasks {
        let outcome = task.await.unwrap().unwrap();
        assert!(matches!(outcome, ProcessOutcome::AlertRaised { .. }));
    }

    assert_eq!(test.store.list_active("pond-1").await.unwrap().len(), 2);
    assert_eq!(test.store.list_active("pond-2").await.unwrap().len(), 2);
}
