//! Application error types.
//!
//! All errors use `thiserror` for automatic Error trait derivation. Failures of
//! the external tool itself never show up here: the locator and the version
//! probe fold them into `installed=false` / empty version instead.

use thiserror::Error;

/// Application result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error enum for the metadata adapter.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed request body or parameter (HTTP 400).
    #[error("validation error: {0}")]
    Validation(String),

    /// Unknown operation or resource (HTTP 404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Capability exists in the contract but has no implementation yet (HTTP 501).
    #[error("not implemented: {0}")]
    NotImplemented(String),

    /// Internal errors (HTTP 500).
    #[error("internal error: {0}")]
    Internal(String),

    /// Timeout (HTTP 504).
    #[error("timeout: {0}")]
    Timeout(String),

    /// Configuration could not be loaded or is inconsistent.
    #[error("config error: {0}")]
    Config(String),

    /// Serialization/deserialization errors.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Outbound HTTP errors (status client).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Stable machine-readable code, used in API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Validation(_) => "VALIDATION",
            Error::NotFound(_) => "NOT_FOUND",
            Error::NotImplemented(_) => "NOT_IMPLEMENTED",
            Error::Internal(_) => "INTERNAL",
            Error::Timeout(_) => "TIMEOUT",
            Error::Config(_) => "CONFIG",
            Error::Serialization(_) => "SERIALIZATION",
            Error::Io(_) => "IO",
            Error::Http(_) => "HTTP",
        }
    }

    /// Whether this error reports a capability gap rather than a fault.
    pub fn is_not_implemented(&self) -> bool {
        matches!(self, Error::NotImplemented(_))
    }
}

// Convenience constructors
impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn not_implemented(msg: impl Into<String>) -> Self {
        Self::NotImplemented(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
