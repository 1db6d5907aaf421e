//! Gateway client and the transport seam it drives.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::http::HttpTransport;
use super::log::{CallLog, GatewayCallRecord};
use crate::config::GatewayConfig;
use crate::error::GatewayError;

/// HTTP method of a gateway call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl Method {
    /// Retrieval and deletion calls carry no body.
    pub fn sends_body(&self) -> bool {
        matches!(self, Self::Post)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One outbound request, relative to the configured base address.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayRequest {
    pub endpoint: String,
    pub method: Method,
    pub payload: Value,
}

/// A response as received: status plus the parsed body, uninterpreted.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayResponse {
    pub status: u16,
    pub body: Value,
}

impl GatewayResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// Shorthand for a 200 response.
    pub fn ok(body: Value) -> Self {
        Self::new(200, body)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Return the body, or a `Status` error for non-2xx responses.
    pub fn into_success(self, endpoint: &str) -> Result<Value, GatewayError> {
        if self.is_success() {
            Ok(self.body)
        } else {
            Err(GatewayError::Status {
                endpoint: endpoint.to_string(),
                status: self.status,
                body: self.body,
            })
        }
    }
}

/// Moves a request to the remote service and back.
///
/// Implementations return the parsed body whatever the status code; only
/// connection failures, timeouts and unparseable bodies are errors.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &GatewayRequest) -> Result<GatewayResponse, GatewayError>;
}

/// Authenticated client for the remote service.
///
/// Cloning is cheap; clones share the transport and the call log.
#[derive(Clone)]
pub struct GatewayClient {
    transport: Arc<dyn Transport>,
    log: CallLog,
}

impl GatewayClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            log: CallLog::new(),
        }
    }

    /// Build a client backed by the `reqwest` transport.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let transport = HttpTransport::new(config)?;
        Ok(Self::new(Arc::new(transport)))
    }

    /// Diagnostic log of every call made through this client.
    pub fn log(&self) -> &CallLog {
        &self.log
    }

    /// Issue one request. Exactly one record is appended to the call log
    /// before this returns, whether the call succeeded or not.
    pub async fn call(
        &self,
        endpoint: &str,
        payload: Value,
        method: Method,
    ) -> Result<GatewayResponse, GatewayError> {
        let request = GatewayRequest {
            endpoint: endpoint.to_string(),
            method,
            payload,
        };

        debug!(endpoint = %request.endpoint, method = %request.method, "Gateway call");
        let result = self.transport.send(&request).await;

        let record = match &result {
            Ok(response) => {
                debug!(
                    endpoint = %request.endpoint,
                    status = response.status,
                    "Gateway call completed"
                );
                GatewayCallRecord::completed(request, response)
            }
            Err(e) => {
                debug!(endpoint = %request.endpoint, error = %e, "Gateway call failed");
                GatewayCallRecord::failed(request, e)
            }
        };
        self.log.record(record);

        result
    }
}

impl std::fmt::Debug for GatewayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayClient")
            .field("calls", &self.log.len())
            .finish_non_exhaustive()
    }
}
