//! The seam between the conversation core and the external agent.

use async_trait::async_trait;

use crate::error::AgentError;
use crate::types::Turn;

/// A language-model-driven agent that answers a conversation.
///
/// Implementations receive the full ordered history, system turn first, and
/// return the assistant's reply text. Tool use, if any, happens inside the
/// implementation.
#[async_trait]
pub trait AgentClient: Send + Sync {
    async fn complete(&self, session_key: &str, messages: &[Turn]) -> Result<String, AgentError>;

    /// Make sure the agent can take a turn, e.g. by loading its tools.
    ///
    /// Called before the session is touched; a failure aborts the turn.
    async fn prepare(&self) -> Result<(), AgentError> {
        Ok(())
    }

    /// Short human-readable name for logs.
    fn describe(&self) -> String {
        "agent".to_string()
    }
}
