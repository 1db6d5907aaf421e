//! `reqwest`-backed transport.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use super::client::{GatewayRequest, GatewayResponse, Method, Transport};
use crate::config::GatewayConfig;
use crate::error::GatewayError;

/// Header carrying the application identifier.
pub const APP_ID_HEADER: &str = "X-Generated-App-ID";

/// Sends gateway requests over HTTPS with bearer authentication.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    api_key: SecretString,
    app_id: String,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::Transport {
                endpoint: config.base_url.clone(),
                reason: format!("Failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            app_id: config.app_id.clone(),
            timeout: config.timeout,
        })
    }

    fn url_for(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    fn map_send_error(&self, endpoint: &str, err: reqwest::Error) -> GatewayError {
        if err.is_timeout() {
            return GatewayError::Timeout {
                endpoint: endpoint.to_string(),
                timeout: self.timeout,
            };
        }
        GatewayError::Transport {
            endpoint: endpoint.to_string(),
            reason: err.to_string(),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &GatewayRequest) -> Result<GatewayResponse, GatewayError> {
        let endpoint = request.endpoint.as_str();
        let url = self.url_for(endpoint);

        let builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Delete => self.client.delete(&url),
        }
        .bearer_auth(self.api_key.expose_secret())
        .header(APP_ID_HEADER, &self.app_id)
        .header(CONTENT_TYPE, "application/json");

        let builder = if request.method.sends_body() {
            builder.json(&request.payload)
        } else {
            builder
        };

        let response = builder
            .send()
            .await
            .map_err(|e| self.map_send_error(endpoint, e))?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.map_send_error(endpoint, e))?;

        let body = parse_body(endpoint, status.is_success(), &bytes)?;
        Ok(GatewayResponse::new(status.as_u16(), body))
    }
}

/// Parse a response body. An empty body (common for deletions) is `null`.
///
/// Error responses often come from a proxy as HTML or plain text; those are
/// kept as a JSON string so the status still reaches the caller. A success
/// response must be JSON.
fn parse_body(endpoint: &str, success: bool, bytes: &[u8]) -> Result<Value, GatewayError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    match serde_json::from_slice(bytes) {
        Ok(value) => Ok(value),
        Err(_) if !success => Ok(Value::String(String::from_utf8_lossy(bytes).into_owned())),
        Err(e) => Err(GatewayError::Parse {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        }),
    }
}
