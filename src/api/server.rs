//! HTTP server: axum router and graceful shutdown.
//!
//! Every operation lives at `/api/universal_metadata_adapter/{method}`.
//! Responses carry an `x-request-id` header; operations whose capability is
//! not implemented yet also carry `x-capability-status: not-implemented`
//! while keeping their regular body shape.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::api::router::{self, Capability, SERVICE_NAME};
use crate::service::AdapterService;
use crate::types::{Error, RequestId, Result};

pub const REQUEST_ID_HEADER: &str = "x-request-id";
pub const CAPABILITY_HEADER: &str = "x-capability-status";

/// HTTP server wrapping the adapter service.
#[derive(Debug)]
pub struct ApiServer {
    service: Arc<AdapterService>,
    addr: SocketAddr,
    cancel: CancellationToken,
}

impl ApiServer {
    pub fn new(service: Arc<AdapterService>, addr: SocketAddr) -> Self {
        Self {
            service,
            addr,
            cancel: CancellationToken::new(),
        }
    }

    /// Build the axum router for the four operations.
    pub fn router(service: Arc<AdapterService>) -> Router {
        Router::new()
            .route(
                &format!("/api/{}/{{method}}", SERVICE_NAME),
                get(handle_get).post(handle_post),
            )
            .with_state(service)
    }

    /// Bind and serve until cancelled.
    pub async fn serve(&self) -> Result<()> {
        let listener = TcpListener::bind(self.addr).await.map_err(|e| {
            tracing::error!(addr = %self.addr, error = %e, "api_bind_failed");
            Error::Io(e)
        })?;
        self.serve_on(listener).await
    }

    /// Serve on an already bound listener until cancelled.
    pub async fn serve_on(&self, listener: TcpListener) -> Result<()> {
        let local = listener.local_addr()?;
        tracing::info!("API server listening on http://{}/api/{}/", local, SERVICE_NAME);

        axum::serve(listener, Self::router(self.service.clone()))
            .with_graceful_shutdown(self.cancel.clone().cancelled_owned())
            .await?;

        tracing::info!("API server shutting down");
        Ok(())
    }

    /// Request graceful shutdown.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

async fn handle_get(
    State(service): State<Arc<AdapterService>>,
    Path(method): Path<String>,
) -> Response {
    let request_id = RequestId::new();
    if !router::allows_get(&method) && router::METHODS.contains(&method.as_str()) {
        let body = serde_json::json!({
            "error": {
                "code": "METHOD_NOT_ALLOWED",
                "message": format!("{} requires POST", method),
            }
        });
        return with_request_id(
            (StatusCode::METHOD_NOT_ALLOWED, Json(body)).into_response(),
            &request_id,
        );
    }
    dispatch(service, method, Value::Null, request_id).await
}

async fn handle_post(
    State(service): State<Arc<AdapterService>>,
    Path(method): Path<String>,
    body: Bytes,
) -> Response {
    let request_id = RequestId::new();
    let body = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Null
    } else {
        match serde_json::from_slice(&body) {
            Ok(value) => value,
            Err(e) => {
                let err = Error::validation(format!("Invalid JSON body: {}", e));
                return error_response(&err, &request_id);
            }
        }
    };
    dispatch(service, method, body, request_id).await
}

async fn dispatch(
    service: Arc<AdapterService>,
    method: String,
    body: Value,
    request_id: RequestId,
) -> Response {
    let span = tracing::info_span!("api_request", request_id = %request_id, method = %method);
    let result = router::route_request(&service, &method, body)
        .instrument(span.clone())
        .await;

    span.in_scope(|| match result {
        Ok(response) => {
            tracing::debug!(capability = ?response.capability, "api_request_completed");
            let mut http = Json(response.body).into_response();
            if response.capability == Capability::NotImplemented {
                http.headers_mut().insert(
                    HeaderName::from_static(CAPABILITY_HEADER),
                    HeaderValue::from_static("not-implemented"),
                );
            }
            with_request_id(http, &request_id)
        }
        Err(e) => {
            tracing::warn!(code = e.code(), error = %e, "api_request_failed");
            error_response(&e, &request_id)
        }
    })
}

fn error_response(err: &Error, request_id: &RequestId) -> Response {
    let body = serde_json::json!({
        "error": {
            "code": err.code(),
            "message": err.to_string(),
        }
    });
    with_request_id((http_status(err), Json(body)).into_response(), request_id)
}

fn with_request_id(mut response: Response, request_id: &RequestId) -> Response {
    if let Ok(value) = HeaderValue::from_str(request_id.as_str()) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }
    response
}

/// HTTP status for an application error.
pub fn http_status(err: &Error) -> StatusCode {
    match err {
        Error::Validation(_) | Error::Serialization(_) => StatusCode::BAD_REQUEST,
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::NotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
        Error::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        Error::Internal(_) | Error::Config(_) | Error::Io(_) | Error::Http(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
