//! External tool infrastructure: probing, discovery, status cache, installer.

pub mod cache;
pub mod installer;
pub mod locator;
pub mod probe;
pub mod status;

pub use cache::StatusCache;
pub use installer::{ToolInstaller, UnavailableInstaller, UpdateOutcome};
pub use locator::{SystemDiscovery, ToolDiscovery};
pub use probe::{probe_version, run_probe, ProbeOutcome};
pub use status::ToolStatus;
