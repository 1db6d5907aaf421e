//! Chat session: message exchange with the live agent.

use tracing::{debug, warn};

use super::message::{CHAT_APOLOGY, Message};
use super::orchestrator::Workflow;
use super::pipeline::AgentHandle;
use crate::error::WorkflowError;
use crate::gateway::{ChatRequest, GatewayClient};

impl Workflow {
    /// Send one user message and wait for the agent's reply.
    ///
    /// A no-op (returns `None`, appends nothing, calls nothing) unless the
    /// session is `Ready` with an agent, or when `text` is blank. Otherwise the
    /// user message is appended before the network call and the reply (or an
    /// apology if the turn failed) after it. A failed turn leaves the state
    /// alone. Turns are serialized, so messages land in call order.
    pub async fn send(&self, text: &str) -> Option<Message> {
        if text.trim().is_empty() {
            return None;
        }
        let _turn = self.turn.lock().await;

        let (agent, epoch) = {
            let mut session = self.write();
            if !session.can_send() {
                debug!(state = %session.state, "Ignoring message, chat is not ready");
                return None;
            }
            let agent = session.agent.clone()?;
            session.messages.push(Message::user(text));
            (agent, session.epoch)
        };

        let reply = match chat_turn(&self.gateway, &agent, text).await {
            Ok(reply) => Message::agent(reply),
            Err(e) => {
                warn!(agent_id = %agent, error = %e, "Error sending message");
                Message::agent(CHAT_APOLOGY)
            }
        };

        let mut session = self.write();
        if !session.can_send() || session.epoch != epoch {
            debug!(agent_id = %agent, "Session ended during chat turn, dropping reply");
            return None;
        }
        session.messages.push(reply.clone());
        Some(reply)
    }
}

/// One round trip to the agent.
pub async fn chat_turn(
    gateway: &GatewayClient,
    agent: &AgentHandle,
    text: &str,
) -> Result<String, WorkflowError> {
    let request = ChatRequest {
        agent_id: agent.as_str().to_string(),
        message: text.to_string(),
    };
    gateway
        .chat(&request)
        .await
        .map_err(WorkflowError::ChatTurnFailed)
}
