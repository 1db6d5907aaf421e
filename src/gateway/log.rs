//! Append-only diagnostic log of gateway calls.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Value, json};

use super::client::{GatewayRequest, GatewayResponse, Method};
use crate::error::GatewayError;

/// One gateway invocation, successful or not.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GatewayCallRecord {
    pub timestamp: DateTime<Utc>,
    pub endpoint: String,
    pub method: Method,
    pub request: Value,
    /// HTTP status, absent when no response was received.
    pub status: Option<u16>,
    /// Response body, or `{"error": ...}` for failed calls.
    pub response: Value,
}

impl GatewayCallRecord {
    pub(crate) fn completed(request: GatewayRequest, response: &GatewayResponse) -> Self {
        Self {
            timestamp: Utc::now(),
            endpoint: request.endpoint,
            method: request.method,
            request: request.payload,
            status: Some(response.status),
            response: response.body.clone(),
        }
    }

    pub(crate) fn failed(request: GatewayRequest, error: &GatewayError) -> Self {
        Self {
            timestamp: Utc::now(),
            endpoint: request.endpoint,
            method: request.method,
            request: request.payload,
            status: None,
            response: json!({ "error": error.to_string() }),
        }
    }
}

/// Shared, append-only call log. Clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    records: Arc<RwLock<Vec<GatewayCallRecord>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, record: GatewayCallRecord) {
        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
    }

    /// Snapshot of all records in call order.
    pub fn records(&self) -> Vec<GatewayCallRecord> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pretty JSON rendering for the debug view.
    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(&self.records()).unwrap_or_else(|_| "[]".to_string())
    }
}
