//! Minimal HTTP client for a running adapter, used by the remote CLI commands.

use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::api::router::{
    CHECK_CLI_STATUS, DOWNLOAD_OR_UPDATE_CLI, REFRESH_CLI_STATUS, RUN_METADATA_FIXER, SERVICE_NAME,
};
use crate::fixer::{FixerReport, FixerRequest};
use crate::service::UpdateReport;
use crate::tool::ToolStatus;
use crate::types::{Error, Result};

/// Client bound to one adapter base URL (e.g. `http://127.0.0.1:7801`).
#[derive(Debug, Clone)]
pub struct StatusClient {
    base_url: String,
    http: reqwest::Client,
}

impl StatusClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn endpoint(&self, method: &str) -> String {
        format!("{}/api/{}/{}", self.base_url, SERVICE_NAME, method)
    }

    /// Cached status of the remote adapter.
    pub async fn check(&self) -> Result<ToolStatus> {
        self.call(self.http.get(self.endpoint(CHECK_CLI_STATUS))).await
    }

    /// Force the remote adapter to recompute.
    pub async fn refresh(&self) -> Result<ToolStatus> {
        self.call(self.http.post(self.endpoint(REFRESH_CLI_STATUS))).await
    }

    /// Ask the remote adapter to install or upgrade the tool.
    pub async fn download_or_update(&self) -> Result<UpdateReport> {
        self.call(self.http.post(self.endpoint(DOWNLOAD_OR_UPDATE_CLI))).await
    }

    pub async fn run_fixer(&self, request: &FixerRequest) -> Result<FixerReport> {
        self.call(self.http.post(self.endpoint(RUN_METADATA_FIXER)).json(request))
            .await
    }

    async fn call<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T> {
        let response = request
            .send()
            .await
            .map_err(classify)?
            .error_for_status()?;
        response.json::<T>().await.map_err(classify)
    }
}

/// Client-side deadline hits become `Timeout`; everything else stays `Http`.
fn classify(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::timeout(format!("adapter did not answer in time: {}", err))
    } else {
        Error::Http(err)
    }
}
