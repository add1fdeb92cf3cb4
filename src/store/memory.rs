//! In-memory alert store (no persistence)
//!
//! Keeps alerts in a map guarded by an async `RwLock`. Useful for tests and
//! for deployments where alert history is only consumed live.
//!
//! ## Limitations
//!
//! - **No persistence**: all alerts are lost on restart
//! - **Unbounded until purged**: retention relies on `purge_resolved_before`

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use super::backend::AlertStore;
use super::error::{StoreError, StoreResult};
use crate::{Alert, AlertStatus, NewAlert};

/// In-memory alert store
#[derive(Debug, Default)]
pub struct MemoryStore {
    alerts: RwLock<HashMap<u64, Alert>>,
    next_id: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            alerts: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }
}

#[async_trait]
impl AlertStore for MemoryStore {
    async fn create(&self, alert: NewAlert) -> StoreResult<Alert> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        let alert = Alert {
            id,
            site_id: alert.site_id,
            parameter: alert.parameter,
            kind: alert.kind,
            severity: alert.severity,
            title: alert.title,
            message: alert.message,
            current_value: alert.current_value,
            threshold_value: alert.threshold_value,
            unit: alert.unit,
            status: AlertStatus::Active,
            created_at: Utc::now(),
            resolved_at: None,
        };

        debug!(
            "created alert {} for {}/{}",
            alert.id, alert.site_id, alert.parameter
        );

        self.alerts.write().await.insert(id, alert.clone());
        Ok(alert)
    }

    async fn find_active_since(
        &self,
        site_id: &str,
        parameter: &str,
        since: DateTime<Utc>,
    ) -> StoreResult<Option<Alert>> {
        let alerts = self.alerts.read().await;

        Ok(alerts
            .values()
            .filter(|alert| {
                alert.site_id == site_id
                    && alert.parameter == parameter
                    && alert.is_active()
                    && alert.created_at >= since
            })
            .max_by_key(|alert| alert.created_at)
            .cloned())
    }

    async fn list_active(&self, site_id: &str) -> StoreResult<Vec<Alert>> {
        let alerts = self.alerts.read().await;

        let mut active: Vec<_> = alerts
            .values()
            .filter(|alert| alert.site_id == site_id && alert.is_active())
            .cloned()
            .collect();

        active.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(active)
    }

    async fn acknowledge(&self, alert_id: u64) -> StoreResult<Alert> {
        let mut alerts = self.alerts.write().await;

        let alert = alerts
            .get_mut(&alert_id)
            .ok_or(StoreError::NotFound(alert_id))?;

        alert.status = AlertStatus::Acknowledged;
        Ok(alert.clone())
    }

    async fn resolve(&self, alert_id: u64) -> StoreResult<Alert> {
        let mut alerts = self.alerts.write().await;

        let alert = alerts
            .get_mut(&alert_id)
            .ok_or(StoreError::NotFound(alert_id))?;

        alert.status = AlertStatus::Resolved;
        alert.resolved_at = Some(Utc::now());
        Ok(alert.clone())
    }

    async fn purge_resolved_before(&self, before: DateTime<Utc>) -> StoreResult<usize> {
        let mut alerts = self.alerts.write().await;

        let stale: Vec<u64> = alerts
            .values()
            .filter(|alert| {
                alert.status == AlertStatus::Resolved
                    && alert.resolved_at.is_some_and(|at| at < before)
            })
            .map(|alert| alert.id)
            .collect();

        for id in &stale {
            alerts.remove(id);
        }

        debug!("purged {} resolved alerts", stale.len());
        Ok(stale.len())
    }
}
