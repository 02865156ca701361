//! HTTP API surface.
//!
//! The router maps operation names onto [`AdapterService`](crate::service::AdapterService);
//! the server exposes them over axum for the browser tab; the client is what
//! the CLI uses to talk to a running server.

pub mod client;
pub mod router;
pub mod server;

pub use client::StatusClient;
pub use router::{route_request, Capability, DispatchResponse, METHODS, SERVICE_NAME};
pub use server::ApiServer;
