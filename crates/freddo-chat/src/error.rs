//! Error types for the conversational core and its agent seam.

use freddo_core::error::FreddoError;

/// Errors from the chat engine.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("message exceeds maximum length of {0} characters")]
    MessageTooLong(usize),
    #[error("invalid role: {0}")]
    InvalidRole(String),
    #[error("session not found: {0}")]
    SessionNotFound(String),
    /// The agent could not be readied before the turn began.
    #[error("agent unavailable: {0}")]
    AgentUnavailable(AgentError),
}

impl From<ChatError> for FreddoError {
    fn from(err: ChatError) -> Self {
        FreddoError::Chat(err.to_string())
    }
}

/// Failures of the external agent round trip.
///
/// Raised during a turn, these are recoverable: the orchestrator turns them
/// into an apology reply and keeps the session usable. Raised by
/// [`AgentClient::prepare`](crate::AgentClient::prepare) they abort the turn
/// as [`ChatError::AgentUnavailable`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AgentError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("upstream returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("malformed upstream response: {0}")]
    MalformedResponse(String),
    #[error("toolbox error: {0}")]
    Toolbox(String),
    #[error("tool loop did not finish after {0} rounds")]
    ToolLoopExhausted(usize),
    #[error("agent did not answer within {0} seconds")]
    Timeout(u64),
}

impl From<AgentError> for FreddoError {
    fn from(err: AgentError) -> Self {
        FreddoError::Agent(err.to_string())
    }
}
