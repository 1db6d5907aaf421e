//! Ingestion pipeline: URL → content → summary → agent → greeting.
//!
//! Each step consumes the previous step's typed output, so the steps run
//! strictly in order. Objects are reported to the caller's tracker the moment
//! they exist, so a later failure never orphans an earlier object.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::WorkflowConfig;
use crate::error::{Step, WorkflowError};
use crate::gateway::{
    ApplyPromptRequest, ChatRequest, CreateAgentRequest, GatewayClient, IngestRequest,
};

/// Priming instruction sent to a freshly created agent.
pub const GREETING_PROMPT: &str = "Please greet the user and briefly mention what you learned \
                                   from the website content they provided.";

/// Content object created from the submitted URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentObject {
    pub name: String,
    pub source_url: String,
}

/// Summary object derived from a content object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryObject {
    pub name: String,
    pub source_url: String,
}

/// Text of a fetched summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryText {
    pub text: String,
    pub source_url: String,
}

/// Identifier of the live conversational agent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentHandle(String);

impl AgentHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AgentHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The agent's first reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Greeting {
    pub text: String,
}

/// A completed pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutput {
    pub agent: AgentHandle,
    pub greeting: Greeting,
}

/// The five ingestion steps, bound to a gateway and a set of object names.
pub struct IngestionPipeline<'a> {
    gateway: &'a GatewayClient,
    config: &'a WorkflowConfig,
}

impl<'a> IngestionPipeline<'a> {
    pub fn new(gateway: &'a GatewayClient, config: &'a WorkflowConfig) -> Self {
        Self { gateway, config }
    }

    /// Run every step in order. `track` is called with each created object's
    /// name as soon as the creating call succeeds.
    pub async fn run(
        &self,
        url: &str,
        mut track: impl FnMut(&str),
    ) -> Result<PipelineOutput, WorkflowError> {
        let content = self.submit(url).await?;
        track(&content.name);

        let summary = self.summarize(&content).await?;
        track(&summary.name);

        let text = self.fetch_summary(&summary).await?;
        let agent = self.create_agent(&text).await?;
        let greeting = self.greet(&agent).await?;

        Ok(PipelineOutput { agent, greeting })
    }

    /// Step 1: submit the URL as a content object.
    pub async fn submit(&self, url: &str) -> Result<ContentObject, WorkflowError> {
        let request = IngestRequest::url(&self.config.content_object, url);
        self.gateway
            .ingest_url(&request)
            .await
            .map_err(|e| WorkflowError::at_step(Step::Submit, e))?;

        info!(object = %self.config.content_object, url, "URL submitted");
        Ok(ContentObject {
            name: self.config.content_object.clone(),
            source_url: url.to_string(),
        })
    }

    /// Step 2: derive a summary object from the content.
    pub async fn summarize(&self, content: &ContentObject) -> Result<SummaryObject, WorkflowError> {
        let request = ApplyPromptRequest::summary(&content.name, &self.config.summary_object);
        self.gateway
            .apply_prompt(&request)
            .await
            .map_err(|e| WorkflowError::at_step(Step::Summarize, e))?;

        info!(object = %self.config.summary_object, "Summary requested");
        Ok(SummaryObject {
            name: self.config.summary_object.clone(),
            source_url: content.source_url.clone(),
        })
    }

    /// Step 3: fetch the summary's text.
    pub async fn fetch_summary(
        &self,
        summary: &SummaryObject,
    ) -> Result<SummaryText, WorkflowError> {
        let text = self
            .gateway
            .return_data(&summary.name)
            .await
            .map_err(|e| WorkflowError::at_step(Step::FetchSummary, e))?;

        info!(object = %summary.name, chars = text.chars().count(), "Summary fetched");
        Ok(SummaryText {
            text,
            source_url: summary.source_url.clone(),
        })
    }

    /// Step 4: create an agent seeded with the summary.
    pub async fn create_agent(&self, summary: &SummaryText) -> Result<AgentHandle, WorkflowError> {
        let request = CreateAgentRequest {
            instructions: build_agent_instructions(summary),
            agent_name: self.config.agent_name.clone(),
        };
        let agent_id = self
            .gateway
            .create_agent(&request)
            .await
            .map_err(|e| WorkflowError::at_step(Step::CreateAgent, e))?;

        info!(agent_id = %agent_id, "Agent created");
        Ok(AgentHandle::new(agent_id))
    }

    /// Step 5: ask the agent to introduce itself.
    pub async fn greet(&self, agent: &AgentHandle) -> Result<Greeting, WorkflowError> {
        let request = ChatRequest {
            agent_id: agent.as_str().to_string(),
            message: GREETING_PROMPT.to_string(),
        };
        let text = self
            .gateway
            .chat(&request)
            .await
            .map_err(|e| WorkflowError::at_step(Step::Greet, e))?;

        info!(agent_id = %agent, "Greeting received");
        Ok(Greeting { text })
    }
}

/// Build the agent's system instructions around the summary text.
fn build_agent_instructions(summary: &SummaryText) -> String {
    format!(
        "You are a helpful assistant that can discuss and answer questions about the following \
         content that was just summarized from a website ({}): {}. Be conversational and helpful, \
         and reference the content when relevant to user questions.",
        summary.source_url, summary.text
    )
}
