//! Error types for page-chat.

use std::time::Duration;

use crate::workflow::WorkflowState;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Workflow error: {0}")]
    Workflow(#[from] WorkflowError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Errors raised while talking to the remote content/agent service.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Request to {endpoint} failed: {reason}")]
    Transport { endpoint: String, reason: String },

    #[error("Request to {endpoint} timed out after {timeout:?}")]
    Timeout { endpoint: String, timeout: Duration },

    #[error("Invalid response from {endpoint}: {reason}")]
    Parse { endpoint: String, reason: String },

    #[error("{endpoint} returned status {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: serde_json::Value,
    },

    #[error("Response from {endpoint} is missing field '{field}'")]
    MissingField { endpoint: String, field: String },
}

/// Pipeline steps, used to say where an ingestion run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Submit,
    Summarize,
    FetchSummary,
    CreateAgent,
    Greet,
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Submit => "submit",
            Self::Summarize => "summarize",
            Self::FetchSummary => "fetch_summary",
            Self::CreateAgent => "create_agent",
            Self::Greet => "greet",
        };
        write!(f, "{s}")
    }
}

/// Workflow-level errors.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("A URL is already being processed")]
    Busy,

    #[error("No URL given")]
    EmptyUrl,

    #[error("Cannot transition from {from} to {to}")]
    InvalidTransition {
        from: WorkflowState,
        to: WorkflowState,
    },

    #[error("Ingestion failed at step {step}: {source}")]
    IngestionFailed {
        step: Step,
        #[source]
        source: GatewayError,
    },

    #[error("Agent creation failed at step {step}: {source}")]
    AgentCreationFailed {
        step: Step,
        #[source]
        source: GatewayError,
    },

    #[error("Chat turn failed: {0}")]
    ChatTurnFailed(#[source] GatewayError),
}

impl WorkflowError {
    /// Wrap a gateway failure in the error kind owned by `step`.
    pub fn at_step(step: Step, source: GatewayError) -> Self {
        match step {
            Step::Submit | Step::Summarize | Step::FetchSummary => {
                Self::IngestionFailed { step, source }
            }
            Step::CreateAgent | Step::Greet => Self::AgentCreationFailed { step, source },
        }
    }

    /// The pipeline step this error came from, if any.
    pub fn step(&self) -> Option<Step> {
        match self {
            Self::IngestionFailed { step, .. } | Self::AgentCreationFailed { step, .. } => {
                Some(*step)
            }
            _ => None,
        }
    }
}

/// Result type alias for page-chat.
pub type Result<T> = std::result::Result<T, Error>;
