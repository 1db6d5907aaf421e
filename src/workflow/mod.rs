//! URL-to-chat workflow.
//!
//! A [`Workflow`] owns one session at a time:
//! 1. `run(url)` drives the [`IngestionPipeline`] and tracks what it creates
//! 2. `send(text)` exchanges messages with the agent once `Ready`
//! 3. `teardown()` releases tracked objects and returns to `Idle`

pub mod chat;
pub mod message;
pub mod orchestrator;
pub mod pipeline;
pub mod state;
pub mod teardown;
pub mod tracker;

pub use message::{CHAT_APOLOGY, INGEST_APOLOGY, Message, Role};
pub use orchestrator::{SessionContext, Workflow};
pub use pipeline::{
    AgentHandle, ContentObject, Greeting, IngestionPipeline, PipelineOutput, SummaryObject,
    SummaryText,
};
pub use state::{StateTransition, WorkflowState};
pub use tracker::{ReleaseFailure, ReleaseReport, ResourceTracker};
