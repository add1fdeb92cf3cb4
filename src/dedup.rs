//! Alert deduplication with per-key mutual exclusion.
//!
//! A sensor oscillating around a threshold bound would otherwise produce an
//! alert storm: every reading outside the range is a fresh anomaly. The
//! deduplicator enforces "at most one active alert per (site, parameter)
//! inside the suppression window" by serializing check-then-create per key.
//!
//! The lock is keyed by (site, parameter), so evaluations for different pairs
//! never contend with each other.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use crate::store::{AlertStore, StoreResult};
use crate::{Alert, NewAlert};

type PairKey = (String, String);

/// Suppresses redundant alert creation for an already-active condition
pub struct AlertDeduplicator {
    store: Arc<dyn AlertStore>,

    /// How long a previous active alert suppresses new ones
    window: chrono::Duration,

    /// One lock per (site, parameter) pair, created lazily
    locks: Mutex<HashMap<PairKey, Arc<Mutex<()>>>>,
}

impl AlertDeduplicator {
    pub fn new(store: Arc<dyn AlertStore>, window: Duration) -> Self {
        let window = chrono::Duration::from_std(window).unwrap_or_else(|_| chrono::Duration::hours(1));

        Self {
            store,
            window,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Create the alert unless an active one for the same (site, parameter)
    /// pair already exists inside the suppression window.
    ///
    /// Returns `Ok(None)` when the alert was suppressed. The store check and
    /// the create are one critical section per key: two concurrent
    /// evaluations of the same pair cannot both create an alert.
    #[instrument(skip(self, candidate), fields(site_id = %candidate.site_id, parameter = %candidate.parameter))]
    pub async fn create_if_new(&self, candidate: NewAlert) -> StoreResult<Option<Alert>> {
        let lock = self
            .pair_lock(&candidate.site_id, &candidate.parameter)
            .await;
        let _guard = lock.lock().await;

        let since = Utc::now() - self.window;

        if let Some(existing) = self
            .store
            .find_active_since(&candidate.site_id, &candidate.parameter, since)
            .await?
        {
            debug!(
                "suppressing duplicate alert, alert {} is still active",
                existing.id
            );
            return Ok(None);
        }

        let alert = self.store.create(candidate).await?;
        Ok(Some(alert))
    }

    async fn pair_lock(&self, site_id: &str, parameter: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry((site_id.to_string(), parameter.to_string()))
            .or_default()
            .clone()
    }
}
