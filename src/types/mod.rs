//! Core types for the metadata adapter.
//!
//! - **Config**: server, tool discovery and observability settings
//! - **Errors**: application error type with thiserror derives
//! - **IDs**: per-request identifiers

mod config;
mod errors;
mod ids;

pub use config::{
    Config, ObservabilityConfig, ServerConfig, ToolConfig, DEFAULT_EXTENSION_DIR, TOOL_BASE_NAME,
};
pub use errors::{Error, Result};
pub use ids::RequestId;
