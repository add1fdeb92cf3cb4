//! Alert store trait definition

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::error::StoreResult;
use crate::{Alert, NewAlert};

/// Trait for alert persistence backends.
///
/// Implementations must be `Send + Sync` as they are shared across async
/// tasks. The deduplicator holds the only write path used by the pipeline
/// (`create` after `find_active_since`); lifecycle operations are for the
/// surrounding system.
#[async_trait]
pub trait AlertStore: Send + Sync {
    /// Persist a new alert, assigning its id and creation timestamp
    async fn create(&self, alert: NewAlert) -> StoreResult<Alert>;

    /// Find an unresolved alert for a (site, parameter) pair created at or
    /// after `since`.
    ///
    /// Used by the deduplicator to suppress repeat alerts inside the
    /// suppression window.
    async fn find_active_since(
        &self,
        site_id: &str,
        parameter: &str,
        since: DateTime<Utc>,
    ) -> StoreResult<Option<Alert>>;

    /// All unresolved alerts for a site, newest first
    async fn list_active(&self, site_id: &str) -> StoreResult<Vec<Alert>>;

    /// Mark an alert as acknowledged
    async fn acknowledge(&self, alert_id: u64) -> StoreResult<Alert>;

    /// Mark an alert as resolved
    async fn resolve(&self, alert_id: u64) -> StoreResult<Alert>;

    /// Delete resolved alerts older than the given timestamp.
    ///
    /// Returns the number of alerts deleted. Called periodically for
    /// retention enforcement.
    async fn purge_resolved_before(&self, before: DateTime<Utc>) -> StoreResult<usize>;
}
