//! Observability utilities.

use std::sync::OnceLock;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::types::ObservabilityConfig;

static TRACING_INIT: OnceLock<()> = OnceLock::new();

/// Environment switch for JSON logs, checked in addition to the config flag.
pub const LOG_FORMAT_ENV: &str = "METADATA_ADAPTER_LOG_FORMAT";

/// Initialize tracing subscriber once for the process.
///
/// `RUST_LOG` wins over the configured level. JSON output is enabled by
/// `json_logs` or by `METADATA_ADAPTER_LOG_FORMAT=json`.
pub fn init_tracing(config: &ObservabilityConfig) {
    TRACING_INIT.get_or_init(|| {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
        let json = wants_json(config, std::env::var(LOG_FORMAT_ENV).ok().as_deref());

        let result = if json {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .try_init()
        } else {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().compact())
                .try_init()
        };

        if let Err(err) = result {
            eprintln!("tracing init skipped: {err}");
        }
    });
}

fn wants_json(config: &ObservabilityConfig, env_format: Option<&str>) -> bool {
    config.json_logs || env_format.is_some_and(|v| v.eq_ignore_ascii_case("json"))
}
