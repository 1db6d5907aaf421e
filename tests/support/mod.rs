//! Shared fixtures: an in-memory stand-in for the remote service.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::Notify;

use page_chat::config::WorkflowConfig;
use page_chat::error::GatewayError;
use page_chat::gateway::{GatewayClient, GatewayRequest, GatewayResponse, Method, Transport};
use page_chat::workflow::Workflow;

type Scripted = Result<GatewayResponse, GatewayError>;

/// Transport that answers from per-route queues and records every request.
///
/// A route with no queued answer fails with a transport error, so unexpected
/// calls show up in assertions instead of hanging.
#[derive(Default)]
pub struct FakeService {
    routes: Mutex<HashMap<(Method, String), VecDeque<Scripted>>>,
    gates: Mutex<HashMap<(Method, String), Arc<Notify>>>,
    requests: Mutex<Vec<GatewayRequest>>,
}

impl FakeService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue an answer for `method endpoint`.
    pub fn on(self: &Arc<Self>, method: Method, endpoint: &str, answer: Scripted) -> Arc<Self> {
        self.routes
            .lock()
            .unwrap()
            .entry((method, endpoint.to_string()))
            .or_default()
            .push_back(answer);
        Arc::clone(self)
    }

    pub fn ok(self: &Arc<Self>, method: Method, endpoint: &str, body: Value) -> Arc<Self> {
        self.on(method, endpoint, Ok(GatewayResponse::ok(body)))
    }

    pub fn fail(self: &Arc<Self>, method: Method, endpoint: &str) -> Arc<Self> {
        self.on(
            method,
            endpoint,
            Err(GatewayError::Transport {
                endpoint: endpoint.to_string(),
                reason: "connection reset by peer".to_string(),
            }),
        )
    }

    /// Make calls to `method endpoint` wait until the returned handle is
    /// notified.
    pub fn hold(self: &Arc<Self>, method: Method, endpoint: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates
            .lock()
            .unwrap()
            .insert((method, endpoint.to_string()), Arc::clone(&gate));
        gate
    }

    pub fn requests(&self) -> Vec<GatewayRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// `"METHOD /endpoint"` for every request, in order.
    pub fn calls(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| format!("{} {}", r.method, r.endpoint))
            .collect()
    }
}

#[async_trait]
impl Transport for FakeService {
    async fn send(&self, request: &GatewayRequest) -> Result<GatewayResponse, GatewayError> {
        self.requests.lock().unwrap().push(request.clone());
        let key = (request.method, request.endpoint.clone());

        let gate = self.gates.lock().unwrap().get(&key).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let answer = self
            .routes
            .lock()
            .unwrap()
            .get_mut(&key)
            .and_then(VecDeque::pop_front);
        answer.unwrap_or_else(|| {
            Err(GatewayError::Transport {
                endpoint: request.endpoint.clone(),
                reason: "no scripted answer".to_string(),
            })
        })
    }
}

pub const PAGE_URL: &str = "https://example.com";
pub const SUMMARY: &str = "A short test page.";
pub const GREETING: &str = "Hi! This page is a short test page.";

/// Queue the five answers of a successful pipeline run.
pub fn script_pipeline(service: &Arc<FakeService>, agent_id: &str, greeting: &str) {
    service
        .ok(Method::Post, "/input_data", json!({"object_name": "url_content"}))
        .ok(Method::Post, "/apply_prompt", json!({}))
        .ok(Method::Get, "/return_data/url_summary", json!({"text_value": SUMMARY}))
        .ok(Method::Post, "/create-agent", json!({"agent_id": agent_id}))
        .ok(Method::Post, "/chat", json!({"response": greeting}));
}

/// Queue successful deletions of both pipeline objects.
pub fn script_deletions(service: &Arc<FakeService>) {
    service
        .ok(Method::Delete, "/objects/url_content", Value::Null)
        .ok(Method::Delete, "/objects/url_summary", Value::Null);
}

pub fn client(service: &Arc<FakeService>) -> GatewayClient {
    GatewayClient::new(Arc::clone(service) as Arc<dyn Transport>)
}

pub fn workflow(service: &Arc<FakeService>) -> Workflow {
    Workflow::new(client(service), WorkflowConfig::default())
}

/// A workflow that has completed scenario A and is `Ready`.
pub async fn ready_workflow(service: &Arc<FakeService>) -> Workflow {
    script_pipeline(service, "a1", GREETING);
    let workflow = workflow(service);
    workflow.run(PAGE_URL).await.expect("pipeline should succeed");
    workflow
}
