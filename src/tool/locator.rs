//! Tool discovery: where is the binary, and what version does it report.
//!
//! Lookup order, first match wins:
//! 1. bundled copy under the extension directory (regular file check only)
//! 2. bare executable name resolved through `PATH`, confirmed by a clean
//!    `--version` exit within the probe bound
//!
//! Nothing here returns an error. A missing file, a failed spawn, a timeout or
//! a non-zero exit all read as "not found" (or "no version").

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;

use super::probe::{probe_version, ProbeOutcome};
use crate::types::ToolConfig;

/// Discovery seam used by the status cache.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ToolDiscovery: Send + Sync {
    /// Absolute path of a bundled binary, or the bare name when it resolves
    /// through `PATH`. `None` when the tool is unavailable.
    async fn locate(&self) -> Option<String>;

    /// Trimmed `--version` output of `target`, `None` if the probe failed.
    async fn version(&self, target: &str) -> Option<String>;
}

/// Discovery against the real filesystem and process table.
#[derive(Debug, Clone)]
pub struct SystemDiscovery {
    exe_name: String,
    bundled_path: PathBuf,
    probe_timeout: Duration,
}

impl SystemDiscovery {
    pub fn new(config: &ToolConfig) -> Self {
        Self {
            exe_name: config.exe_name.clone(),
            bundled_path: config.bundled_path(),
            probe_timeout: config.probe_timeout,
        }
    }

    pub fn exe_name(&self) -> &str {
        &self.exe_name
    }

    pub fn bundled_path(&self) -> &PathBuf {
        &self.bundled_path
    }

    fn bundled(&self) -> Option<String> {
        // is_file() follows symlinks and rejects directories
        if self.bundled_path.is_file() {
            Some(self.bundled_path.to_string_lossy().into_owned())
        } else {
            None
        }
    }
}

#[async_trait]
impl ToolDiscovery for SystemDiscovery {
    async fn locate(&self) -> Option<String> {
        if let Some(path) = self.bundled() {
            tracing::debug!(path = %path, "tool_found_bundled");
            return Some(path);
        }

        let outcome = probe_version(&self.exe_name, self.probe_timeout).await;
        if outcome.succeeded() {
            tracing::debug!(exe = %self.exe_name, "tool_found_on_path");
            return Some(self.exe_name.clone());
        }

        tracing::debug!(
            exe = %self.exe_name,
            bundled = %self.bundled_path.display(),
            outcome = ?outcome,
            "tool_not_found"
        );
        None
    }

    async fn version(&self, target: &str) -> Option<String> {
        match probe_version(target, self.probe_timeout).await {
            outcome @ ProbeOutcome::Exited { code: Some(0), .. } => {
                outcome.version_text().map(str::to_string)
            }
            outcome => {
                tracing::debug!(target = %target, outcome = ?outcome, "tool_version_probe_failed");
                None
            }
        }
    }
}
