//! # Metadata Adapter
//!
//! Discovery and status caching for the `sd-prompt-reader` metadata tool:
//! - Locates the tool (bundled copy first, then `PATH`) with bounded probes
//! - Caches `{installed, version, path, last_checked_utc}` behind one lock
//! - Exposes check / refresh / download-or-update / run-fixer over HTTP
//!
//! ## Architecture
//!
//! ```text
//!   HTTP requests →  api::server ─→ api::router ─→ AdapterService
//!                                                    │
//!                                 ┌──────────────────┼───────────────┐
//!                                 │                  │               │
//!                           StatusCache        ToolInstaller   MetadataFixer
//!                                 │
//!                           ToolDiscovery ─→ probe (bounded subprocess)
//! ```

// Enforce strict safety at compile time
#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]

pub mod api;
pub mod fixer;
pub mod service;
pub mod timefmt;
pub mod tool;
pub mod types;

// Internal utilities
pub mod observability;

pub use service::{AdapterService, UpdateReport};
pub use tool::{StatusCache, ToolStatus};
pub use types::{Config, Error, Result};
