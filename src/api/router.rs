//! Method router: maps operation names onto the adapter service.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::fixer::FixerRequest;
use crate::service::AdapterService;
use crate::types::{Error, Result};

/// Service prefix the operations are registered under.
pub const SERVICE_NAME: &str = "universal_metadata_adapter";

pub const CHECK_CLI_STATUS: &str = "check_cli_status";
pub const REFRESH_CLI_STATUS: &str = "refresh_cli_status";
pub const DOWNLOAD_OR_UPDATE_CLI: &str = "download_or_update_cli";
pub const RUN_METADATA_FIXER: &str = "run_metadata_fixer";

/// All exposed operations, in registration order.
pub const METHODS: [&str; 4] = [
    CHECK_CLI_STATUS,
    REFRESH_CLI_STATUS,
    DOWNLOAD_OR_UPDATE_CLI,
    RUN_METADATA_FIXER,
];

/// Whether the operation behind a response is actually implemented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Available,
    NotImplemented,
}

/// Result from dispatching a request.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchResponse {
    pub body: Value,
    pub capability: Capability,
}

impl DispatchResponse {
    fn available(body: Value) -> Self {
        Self {
            body,
            capability: Capability::Available,
        }
    }
}

/// Read-only operations may also be reached with GET.
pub fn allows_get(method: &str) -> bool {
    method == CHECK_CLI_STATUS
}

/// Route a request to the matching operation.
pub async fn route_request(
    service: &AdapterService,
    method: &str,
    body: Value,
) -> Result<DispatchResponse> {
    match method {
        CHECK_CLI_STATUS => {
            let status = service.check_status().await;
            Ok(DispatchResponse::available(serde_json::to_value(status)?))
        }

        REFRESH_CLI_STATUS => {
            let status = service.refresh_status().await;
            Ok(DispatchResponse::available(serde_json::to_value(status)?))
        }

        DOWNLOAD_OR_UPDATE_CLI => {
            let report = service.download_or_update().await;
            let capability = if report.update.is_not_implemented() {
                Capability::NotImplemented
            } else {
                Capability::Available
            };
            Ok(DispatchResponse {
                body: serde_json::to_value(report)?,
                capability,
            })
        }

        RUN_METADATA_FIXER => {
            let request: FixerRequest = parse_body(body)?;
            let report = service.run_fixer(&request);
            let capability = if service.fixer_available() {
                Capability::Available
            } else {
                Capability::NotImplemented
            };
            Ok(DispatchResponse {
                body: serde_json::to_value(report)?,
                capability,
            })
        }

        _ => Err(Error::not_found(format!(
            "Unknown {} method: {}",
            SERVICE_NAME, method
        ))),
    }
}

/// Decode an optional request body; `null` means "use defaults".
pub fn parse_body<T: DeserializeOwned + Default>(body: Value) -> Result<T> {
    if body.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(body).map_err(|e| Error::validation(format!("Invalid request body: {}", e)))
}
