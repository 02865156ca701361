//! Configuration structures.
//!
//! Configuration is loaded from an optional JSON file; the binary then applies
//! command-line flags and environment variables on top.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::{Error, Result};

/// Base name of the external metadata tool, without platform suffix.
pub const TOOL_BASE_NAME: &str = "sd-prompt-reader";

/// Extension directory, relative to the install root, holding a bundled copy.
pub const DEFAULT_EXTENSION_DIR: &str = "src/Extensions/UniversalMetadataAdapter";

/// Global adapter configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// External tool discovery.
    #[serde(default)]
    pub tool: ToolConfig,

    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from a JSON file. Missing sections fall back to defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&raw)
    }

    /// Parse configuration from JSON text.
    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make discovery meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.tool.exe_name.trim().is_empty() {
            return Err(Error::config("tool.exe_name cannot be empty"));
        }
        if self.tool.probe_timeout.is_zero() {
            return Err(Error::config("tool.probe_timeout must be positive"));
        }
        Ok(())
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP bind address.
    pub listen_addr: String,

    /// Whether to run the startup warm-up refresh.
    pub warm_up: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:7801".to_string(),
            warm_up: true,
        }
    }
}

/// External tool discovery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Executable name, including the platform suffix (`.exe` on Windows).
    pub exe_name: String,

    /// Root the extension directory is resolved against. Defaults to the
    /// process working directory.
    pub install_root: Option<PathBuf>,

    /// Directory holding a bundled copy of the tool, relative to `install_root`.
    pub extension_dir: PathBuf,

    /// Upper bound for each `--version` invocation.
    #[serde(with = "humantime_serde")]
    pub probe_timeout: Duration,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            exe_name: format!("{}{}", TOOL_BASE_NAME, std::env::consts::EXE_SUFFIX),
            install_root: None,
            extension_dir: PathBuf::from(DEFAULT_EXTENSION_DIR),
            probe_timeout: Duration::from_secs(2),
        }
    }
}

impl ToolConfig {
    /// Absolute location where a bundled copy of the tool would live.
    pub fn bundled_path(&self) -> PathBuf {
        let root = match &self.install_root {
            Some(root) if root.is_absolute() => root.clone(),
            Some(root) => current_dir().join(root),
            None => current_dir(),
        };
        root.join(&self.extension_dir).join(&self.exe_name)
    }
}

fn current_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Tracing log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable JSON log formatting.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}
