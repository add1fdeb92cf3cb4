use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use pondguard::{
    actors::{AlertPipeline, MonitorHandle, PipelineEvent},
    channels::Adapters,
    config::read_config_file,
    dedup::AlertDeduplicator,
    directory::StaticDirectory,
    dispatch::DispatchCoordinator,
    simulator,
    store::{AlertStore, MemoryStore},
};
use tokio::{spawn, sync::RwLock, sync::broadcast};
use tracing::{debug, error, info, level_filters::LevelFilter, trace, warn};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

/// How long resolved alerts are kept before being purged
const ALERT_RETENTION: Duration = Duration::from_secs(30 * 24 * 3600);

#[derive(Debug, Clone, Parser)]
struct Args {
    /// Config file
    #[arg(short)]
    file: String,
}

fn init() {
    let filter = filter::Targets::new().with_targets(vec![
        ("pondguard", LevelFilter::TRACE),
        ("monitor", LevelFilter::TRACE),
    ]);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_ansi(false),
        )
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init();
    dotenv::dotenv().ok();

    let args = Args::parse();
    trace!("started with args: {args:?}");

    let config = read_config_file(&args.file)?;

    let store = Arc::new(MemoryStore::new());
    let dedup = AlertDeduplicator::new(store.clone(), config.suppression_window());
    let adapters = Adapters::from_config(&config.channels, config.dispatch.send_timeout());

    if adapters.is_empty() {
        warn!("no notification channels configured, alerts will not be delivered");
    }

    let coordinator = DispatchCoordinator::new(
        adapters,
        config.dispatch.max_concurrent_sends,
        config.dispatch.send_timeout(),
    );

    let directory = Arc::new(StaticDirectory::new(
        config.recipients.as_deref().unwrap_or(&[]),
    ));

    let sites = config.sites.clone().unwrap_or_default();
    if sites.is_empty() {
        warn!("no sites configured, nothing to simulate");
    }

    let config = Arc::new(RwLock::new(config));
    let pipeline = AlertPipeline::new(config, dedup, coordinator, directory);

    let (reading_tx, reading_rx) = broadcast::channel(256);
    let handle = MonitorHandle::spawn(pipeline, reading_rx);

    spawn(log_pipeline_events(handle.clone()));
    spawn(purge_old_alerts(store));

    for site in sites {
        spawn(simulator::run_site(site, reading_tx.clone()));
    }

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    handle.shutdown().await;

    Ok(())
}

/// Log every pipeline event for observability
async fn log_pipeline_events(handle: MonitorHandle) {
    let mut events = handle.subscribe();

    loop {
        match events.recv().await {
            Ok(PipelineEvent::AlertCreated(alert)) => {
                info!(
                    "[{}] alert {} for {}/{}: {}",
                    alert.severity, alert.id, alert.site_id, alert.parameter, alert.message
                );
            }
            Ok(PipelineEvent::DispatchCompleted(report)) => {
                info!(
                    "alert {} dispatched: {} delivered, {} failed",
                    report.alert_id,
                    report.succeeded(),
                    report.failed()
                );
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!("event logger lagged, skipped {skipped} events");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

/// Daily retention pass over resolved alerts
async fn purge_old_alerts(store: Arc<MemoryStore>) {
    let mut interval = tokio::time::interval(Duration::from_secs(24 * 3600));
    interval.tick().await;

    loop {
        interval.tick().await;

        let cutoff = chrono::Utc::now()
            - chrono::Duration::from_std(ALERT_RETENTION).unwrap_or(chrono::Duration::days(30));

        match store.purge_resolved_before(cutoff).await {
            Ok(purged) => debug!("purged {purged} old resolved alerts"),
            Err(e) => error!("alert purge failed: {e}"),
        }
    }
}
