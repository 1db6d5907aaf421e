//! Typed calls for the six operations of the remote service.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::client::{GatewayClient, Method};
use crate::error::GatewayError;

pub const INPUT_DATA: &str = "/input_data";
pub const APPLY_PROMPT: &str = "/apply_prompt";
pub const CREATE_AGENT: &str = "/create-agent";
pub const CHAT: &str = "/chat";

pub fn return_data_path(object_name: &str) -> String {
    format!("/return_data/{object_name}")
}

pub fn object_path(object_name: &str) -> String {
    format!("/objects/{object_name}")
}

/// Body of an ingest call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestRequest {
    pub created_object_name: String,
    pub data_type: String,
    pub input_data: Vec<String>,
}

impl IngestRequest {
    pub fn url(object_name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            created_object_name: object_name.into(),
            data_type: "urls".to_string(),
            input_data: vec![url.into()],
        }
    }
}

/// One input binding of a prompt application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptInput {
    pub input_object_name: String,
    pub mode: String,
}

/// Body of a summarize call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplyPromptRequest {
    pub created_object_names: Vec<String>,
    pub prompt_string: String,
    pub inputs: Vec<PromptInput>,
}

impl ApplyPromptRequest {
    /// Summarize `input` into `output`, combining all of the input's events.
    pub fn summary(input: &str, output: impl Into<String>) -> Self {
        Self {
            created_object_names: vec![output.into()],
            prompt_string: format!(
                "Please provide a comprehensive summary of this content: {{{input}}}"
            ),
            inputs: vec![PromptInput {
                input_object_name: input.to_string(),
                mode: "combine_events".to_string(),
            }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateAgentRequest {
    pub instructions: String,
    pub agent_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub agent_id: String,
    pub message: String,
}

impl GatewayClient {
    /// Submit a URL as a named content object. Returns the response body.
    pub async fn ingest_url(&self, request: &IngestRequest) -> Result<Value, GatewayError> {
        self.post(INPUT_DATA, request).await
    }

    /// Derive named objects by applying a prompt to existing objects.
    pub async fn apply_prompt(&self, request: &ApplyPromptRequest) -> Result<Value, GatewayError> {
        self.post(APPLY_PROMPT, request).await
    }

    /// Fetch the `text_value` of a named object.
    pub async fn return_data(&self, object_name: &str) -> Result<String, GatewayError> {
        let endpoint = return_data_path(object_name);
        let body = self
            .call(&endpoint, json!({}), Method::Get)
            .await?
            .into_success(&endpoint)?;
        required_str(&body, &endpoint, "text_value")
    }

    /// Create an agent and return its id.
    pub async fn create_agent(&self, request: &CreateAgentRequest) -> Result<String, GatewayError> {
        let body = self.post(CREATE_AGENT, request).await?;
        required_str(&body, CREATE_AGENT, "agent_id")
    }

    /// Send one message to an agent and return its reply.
    pub async fn chat(&self, request: &ChatRequest) -> Result<String, GatewayError> {
        let body = self.post(CHAT, request).await?;
        required_str(&body, CHAT, "response")
    }

    /// Delete a named object.
    pub async fn delete_object(&self, object_name: &str) -> Result<(), GatewayError> {
        let endpoint = object_path(object_name);
        self.call(&endpoint, json!({}), Method::Delete)
            .await?
            .into_success(&endpoint)?;
        Ok(())
    }

    async fn post<T: Serialize>(&self, endpoint: &str, body: &T) -> Result<Value, GatewayError> {
        let payload = serde_json::to_value(body).map_err(|e| GatewayError::Parse {
            endpoint: endpoint.to_string(),
            reason: format!("Failed to encode request: {e}"),
        })?;
        self.call(endpoint, payload, Method::Post)
            .await?
            .into_success(endpoint)
    }
}

fn required_str(body: &Value, endpoint: &str, field: &str) -> Result<String, GatewayError> {
    body.get(field)
        .and_then(Value::as_str)
        .map(ToOwned::to_owned)
        .ok_or_else(|| GatewayError::MissingField {
            endpoint: endpoint.to_string(),
            field: field.to_string(),
        })
}
