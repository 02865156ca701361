//! Adapter service - the four operations behind the API.
//!
//! Owns the status cache and the installer; one instance is built at startup
//! and shared by every request handler.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::fixer::{FixerReport, FixerRequest, MetadataFixer};
use crate::tool::{
    StatusCache, SystemDiscovery, ToolInstaller, ToolStatus, UnavailableInstaller, UpdateOutcome,
};
use crate::types::ToolConfig;

/// Response of `download_or_update_cli`: the refreshed status plus what the
/// install attempt did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateReport {
    #[serde(flatten)]
    pub status: ToolStatus,
    pub update: UpdateOutcome,
}

pub struct AdapterService {
    cache: Arc<StatusCache>,
    installer: Arc<dyn ToolInstaller>,
    fixer: MetadataFixer,
}

impl fmt::Debug for AdapterService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterService")
            .field("cache", &self.cache)
            .field("fixer", &self.fixer)
            .finish_non_exhaustive()
    }
}

impl AdapterService {
    pub fn new(cache: Arc<StatusCache>, installer: Arc<dyn ToolInstaller>) -> Self {
        Self {
            cache,
            installer,
            fixer: MetadataFixer,
        }
    }

    /// Service backed by real discovery and no installer.
    pub fn from_config(config: &ToolConfig) -> Self {
        let discovery = SystemDiscovery::new(config);
        tracing::info!(
            exe = %discovery.exe_name(),
            bundled = %discovery.bundled_path().display(),
            timeout_ms = config.probe_timeout.as_millis() as u64,
            "tool_discovery_configured"
        );
        Self::new(
            Arc::new(StatusCache::new(Arc::new(discovery))),
            Arc::new(UnavailableInstaller),
        )
    }

    pub fn cache(&self) -> &Arc<StatusCache> {
        &self.cache
    }

    /// Fire-and-forget startup refresh.
    pub fn start_warm_up(&self) -> JoinHandle<()> {
        self.cache.warm_up()
    }

    /// Cached status; computed once if the cache is still empty.
    pub async fn check_status(&self) -> ToolStatus {
        self.cache.read().await
    }

    /// Freshly computed status.
    pub async fn refresh_status(&self) -> ToolStatus {
        self.cache.refresh().await
    }

    /// Install or upgrade, then refresh regardless of the outcome.
    pub async fn download_or_update(&self) -> UpdateReport {
        let result = self.installer.install_or_update().await;
        match &result {
            Ok(path) => tracing::info!(path = %path.display(), "tool_install_completed"),
            Err(e) if e.is_not_implemented() => {
                tracing::warn!(error = %e, "tool_install_unavailable")
            }
            Err(e) => tracing::error!(error = %e, "tool_install_failed"),
        }

        let update = UpdateOutcome::from_result(&result);
        let status = self.cache.refresh().await;
        UpdateReport { status, update }
    }

    pub fn run_fixer(&self, request: &FixerRequest) -> FixerReport {
        self.fixer.run(request)
    }

    pub fn fixer_available(&self) -> bool {
        self.fixer.is_available()
    }
}
