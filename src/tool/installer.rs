//! Download/update seam for the external tool.
//!
//! The adapter always refreshes the status cache after an install attempt,
//! whether it succeeded or not. No installer ships yet:
//! [`UnavailableInstaller`] reports `NotImplemented` so callers can tell the
//! capability is missing instead of mistaking a plain refresh for an update.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::types::{Error, Result};

/// Fetches or upgrades the tool into its bundled location.
#[async_trait]
pub trait ToolInstaller: Send + Sync {
    /// Install the tool, or upgrade an existing copy. Returns the installed path.
    async fn install_or_update(&self) -> Result<PathBuf>;
}

/// Installer used until a download source is wired in.
#[derive(Debug, Clone, Default)]
pub struct UnavailableInstaller;

#[async_trait]
impl ToolInstaller for UnavailableInstaller {
    async fn install_or_update(&self) -> Result<PathBuf> {
        Err(Error::not_implemented(
            "downloading or updating sd-prompt-reader is not available",
        ))
    }
}

/// Result of an install attempt, reported next to the refreshed status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateOutcome {
    /// Whether an install or upgrade actually ran to completion.
    pub performed: bool,
    /// Machine-readable error code when `performed` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Human-readable reason when `performed` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UpdateOutcome {
    pub fn from_result(result: &Result<PathBuf>) -> Self {
        match result {
            Ok(_) => Self {
                performed: true,
                code: None,
                error: None,
            },
            Err(e) => Self {
                performed: false,
                code: Some(e.code().to_string()),
                error: Some(e.to_string()),
            },
        }
    }

    pub fn is_not_implemented(&self) -> bool {
        self.code.as_deref() == Some("NOT_IMPLEMENTED")
    }
}
