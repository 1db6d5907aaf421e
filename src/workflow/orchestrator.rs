//! Session owner: ties the gateway, tracker, pipeline and chat together.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use serde::Serialize;
use tracing::{error, info, warn};

use super::message::{INGEST_APOLOGY, Message};
use super::pipeline::{AgentHandle, IngestionPipeline};
use super::state::{StateTransition, WorkflowState};
use super::tracker::ResourceTracker;
use crate::config::WorkflowConfig;
use crate::error::WorkflowError;
use crate::gateway::{CallLog, GatewayClient};

/// Transition history is capped to this many entries.
const MAX_TRANSITIONS: usize = 200;

/// Everything that belongs to the current session.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionContext {
    pub state: WorkflowState,
    pub agent: Option<AgentHandle>,
    pub messages: Vec<Message>,
    #[serde(serialize_with = "serialize_tracker")]
    pub tracker: ResourceTracker,
    pub transitions: Vec<StateTransition>,
    /// Bumped every time a conversation ends.
    pub epoch: u64,
}

impl SessionContext {
    /// Move to `target`, recording the transition.
    pub fn transition_to(
        &mut self,
        target: WorkflowState,
        reason: Option<String>,
    ) -> Result<(), WorkflowError> {
        if !self.state.can_transition_to(target) {
            return Err(WorkflowError::InvalidTransition {
                from: self.state,
                to: target,
            });
        }

        self.transitions.push(StateTransition {
            from: self.state,
            to: target,
            timestamp: Utc::now(),
            reason,
        });
        if self.transitions.len() > MAX_TRANSITIONS {
            let drain_count = self.transitions.len() - MAX_TRANSITIONS;
            self.transitions.drain(..drain_count);
        }

        self.state = target;
        Ok(())
    }

    /// Chat is permitted iff the state is `Ready` and an agent is set.
    pub fn can_send(&self) -> bool {
        self.state.allows_chat() && self.agent.is_some()
    }

    /// Drop messages and agent and return to `Idle`. Tracked names stay.
    pub(crate) fn end_conversation(&mut self, reason: &str) -> Result<(), WorkflowError> {
        self.messages.clear();
        self.agent = None;
        self.epoch += 1;
        if self.state != WorkflowState::Idle {
            self.transition_to(WorkflowState::Idle, Some(reason.to_string()))?;
        }
        Ok(())
    }

    /// Drop messages, agent and tracked names and return to `Idle`.
    pub(crate) fn reset(&mut self, reason: &str) -> Result<(), WorkflowError> {
        self.tracker.clear();
        self.end_conversation(reason)
    }
}

fn serialize_tracker<S: serde::Serializer>(
    tracker: &ResourceTracker,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(tracker.names())
}

/// The URL-to-chat workflow.
///
/// All operations take `&self`; wrap in an `Arc` to share it with a front
/// end. The session lock is never held across a network call, so snapshots
/// can be read while a run or a chat turn is in flight.
pub struct Workflow {
    pub(crate) gateway: GatewayClient,
    config: WorkflowConfig,
    session: RwLock<SessionContext>,
    /// Held for the whole of `run` and `teardown`.
    pub(crate) lifecycle: tokio::sync::Mutex<()>,
    /// Serializes chat turns.
    pub(crate) turn: tokio::sync::Mutex<()>,
}

impl Workflow {
    pub fn new(gateway: GatewayClient, config: WorkflowConfig) -> Self {
        Self {
            gateway,
            config,
            session: RwLock::new(SessionContext::default()),
            lifecycle: tokio::sync::Mutex::new(()),
            turn: tokio::sync::Mutex::new(()),
        }
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    pub fn state(&self) -> WorkflowState {
        self.read().state
    }

    pub fn agent(&self) -> Option<AgentHandle> {
        self.read().agent.clone()
    }

    pub fn messages(&self) -> Vec<Message> {
        self.read().messages.clone()
    }

    /// Names of remote objects currently tracked, in creation order.
    pub fn tracked_resources(&self) -> Vec<String> {
        self.read().tracker.names().to_vec()
    }

    pub fn can_send(&self) -> bool {
        self.read().can_send()
    }

    /// Copy of the whole session.
    pub fn snapshot(&self) -> SessionContext {
        self.read().clone()
    }

    /// Every gateway call made by this workflow, across sessions.
    pub fn call_log(&self) -> &CallLog {
        self.gateway.log()
    }

    /// Turn `url` into a ready agent.
    ///
    /// Rejected with `Busy` while another run or a teardown is in flight. A
    /// `Ready` or `Failed` session is torn down first. On failure the session
    /// ends in `Failed` with an apology message and keeps its tracked objects.
    pub async fn run(&self, url: &str) -> Result<AgentHandle, WorkflowError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(WorkflowError::EmptyUrl);
        }
        let Ok(_lifecycle) = self.lifecycle.try_lock() else {
            return Err(WorkflowError::Busy);
        };

        let has_previous = {
            let mut session = self.write();
            if !session.state.accepts_url() {
                return Err(WorkflowError::Busy);
            }
            session.end_conversation("superseded by a new URL")?;
            session.transition_to(WorkflowState::Processing, Some(format!("submitted {url}")))?;
            !session.tracker.is_empty()
        };
        info!(url, "Processing URL");

        let guard = ProcessingGuard::new(&self.session);

        if has_previous {
            let report = self.release_tracked().await;
            if !report.is_clean() {
                warn!(
                    failed = report.failures.len(),
                    "Some objects from the previous session could not be released"
                );
            }
        }

        let pipeline = IngestionPipeline::new(&self.gateway, &self.config);
        let result = pipeline
            .run(url, |name| self.write().tracker.track(name))
            .await;
        guard.disarm();

        let mut session = self.write();
        match result {
            Ok(output) => {
                session.messages.push(Message::agent(output.greeting.text));
                session.agent = Some(output.agent.clone());
                session.transition_to(WorkflowState::Ready, None)?;
                info!(agent_id = %output.agent, "Chat ready");
                Ok(output.agent)
            }
            Err(e) => {
                error!(url, error = %e, "Error processing URL");
                session.messages.push(Message::agent(INGEST_APOLOGY));
                session.transition_to(WorkflowState::Failed, Some(e.to_string()))?;
                Err(e)
            }
        }
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, SessionContext> {
        self.session.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, SessionContext> {
        self.session.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for Workflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workflow")
            .field("config", &self.config)
            .field("session", &*self.read())
            .finish_non_exhaustive()
    }
}

/// Fails the session if a run is dropped before it finishes.
struct ProcessingGuard<'a> {
    session: &'a RwLock<SessionContext>,
    armed: bool,
}

impl<'a> ProcessingGuard<'a> {
    fn new(session: &'a RwLock<SessionContext>) -> Self {
        Self {
            session,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut session = self.session.write().unwrap_or_else(PoisonError::into_inner);
        if session.state == WorkflowState::Processing {
            session.messages.push(Message::agent(INGEST_APOLOGY));
            if session
                .transition_to(WorkflowState::Failed, Some("run abandoned".to_string()))
                .is_ok()
            {
                warn!("URL processing was abandoned before it finished");
            }
        }
    }
}
