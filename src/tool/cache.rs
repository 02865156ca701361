//! Status cache for the external tool.
//!
//! One slot, one lock. `refresh` recomputes and replaces the snapshot
//! wholesale; `read` returns the current snapshot, computing it first only
//! when the slot is still unset. Both hold the same mutex for the whole
//! computation, so refreshes serialize and nobody observes a half-built
//! snapshot. A refresh is bounded by two probe timeouts (locate + version).

use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use super::locator::ToolDiscovery;
use super::status::ToolStatus;

/// Process-lifetime cache of the tool's install status.
pub struct StatusCache {
    discovery: Arc<dyn ToolDiscovery>,
    slot: Mutex<Option<ToolStatus>>,
}

impl fmt::Debug for StatusCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusCache").finish_non_exhaustive()
    }
}

impl StatusCache {
    pub fn new(discovery: Arc<dyn ToolDiscovery>) -> Self {
        Self {
            discovery,
            slot: Mutex::new(None),
        }
    }

    /// Recompute the snapshot and replace the cached one.
    pub async fn refresh(&self) -> ToolStatus {
        let mut slot = self.slot.lock().await;
        let status = self.compute(slot.as_ref()).await;
        *slot = Some(status.clone());
        status
    }

    /// Cached snapshot, computed once if nothing has been cached yet.
    pub async fn read(&self) -> ToolStatus {
        let mut slot = self.slot.lock().await;
        if let Some(status) = slot.as_ref() {
            return status.clone();
        }
        let status = self.compute(None).await;
        *slot = Some(status.clone());
        status
    }

    /// Cached snapshot without triggering a computation.
    pub async fn peek(&self) -> Option<ToolStatus> {
        self.slot.lock().await.clone()
    }

    /// Spawn the one-shot startup refresh. Returns immediately.
    pub fn warm_up(self: &Arc<Self>) -> JoinHandle<()> {
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            let status = cache.refresh().await;
            tracing::info!(
                installed = status.is_installed(),
                version = %status.version(),
                path = %status.path(),
                "tool_status_warm_up_complete"
            );
        })
    }

    async fn compute(&self, previous: Option<&ToolStatus>) -> ToolStatus {
        let status = match self.discovery.locate().await {
            Some(path) => {
                let version = self.discovery.version(&path).await.unwrap_or_default();
                ToolStatus::installed(path, version, checked_at(previous))
            }
            None => ToolStatus::not_installed(checked_at(previous)),
        };

        tracing::info!(
            installed = status.is_installed(),
            version = %status.version(),
            path = %status.path(),
            "tool_status_refreshed"
        );
        status
    }
}

/// Current time, never earlier than the previous snapshot's.
fn checked_at(previous: Option<&ToolStatus>) -> DateTime<Utc> {
    let now = Utc::now();
    match previous {
        Some(prev) if prev.last_checked_utc() > now => prev.last_checked_utc(),
        _ => now,
    }
}
