//! Workflow state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    /// No URL submitted; nothing tracked.
    #[default]
    Idle,
    /// The ingestion pipeline is running.
    Processing,
    /// An agent is live and chat is allowed.
    Ready,
    /// A pipeline step failed; resources may still be tracked.
    Failed,
}

impl WorkflowState {
    /// Check if this state allows transitioning to another state.
    pub fn can_transition_to(&self, target: WorkflowState) -> bool {
        use WorkflowState::*;

        matches!(
            (self, target),
            (Idle, Processing) |
            (Processing, Ready) | (Processing, Failed) |
            (Ready, Idle) | (Failed, Idle)
        )
    }

    /// Chat is only permitted in `Ready`.
    pub fn allows_chat(&self) -> bool {
        matches!(self, Self::Ready)
    }

    /// A new URL may be submitted from any state but `Processing`.
    pub fn accepts_url(&self) -> bool {
        !matches!(self, Self::Processing)
    }
}

impl std::fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Processing => "processing",
            Self::Ready => "ready",
            Self::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

/// A state transition event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTransition {
    pub from: WorkflowState,
    pub to: WorkflowState,
    pub timestamp: DateTime<Utc>,
    pub reason: Option<String>,
}
