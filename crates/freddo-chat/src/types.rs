//! Shared data types for sessions, turns and chat replies.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use freddo_core::config::FreddoConfig;
use serde::{Deserialize, Serialize};

use crate::error::ChatError;
use crate::format::{FormatMismatch, ResponseFormat};

/// Author of a turn in the conversation history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ChatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "system" => Ok(Role::System),
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            other => Err(ChatError::InvalidRole(other.to_string())),
        }
    }
}

/// One `{role, content}` entry of the history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Tag describing the most recent slot update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LastAction {
    SetRecipe,
    SetUser,
    SetStore,
}

/// Slots extracted from the conversation so far.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    pub current_user_id: Option<i64>,
    /// Always an exact catalog name when set.
    pub current_recipe: Option<String>,
    pub current_store_id: Option<i64>,
    pub last_action: Option<LastAction>,
}

/// A single conversation.
///
/// `history[0]` is the system turn for the whole lifetime of the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub key: String,
    pub history: Vec<Turn>,
    pub context: SessionContext,
    /// Creation time, epoch seconds.
    pub created_at: i64,
    /// Time of the last turn, epoch seconds.
    pub last_active_at: i64,
}

impl Session {
    /// Create a session holding only the system turn.
    pub fn new(key: impl Into<String>, system_prompt: &str, now: i64) -> Self {
        Self {
            key: key.into(),
            history: vec![Turn::new(Role::System, system_prompt)],
            context: SessionContext::default(),
            created_at: now,
            last_active_at: now,
        }
    }

    /// Append a turn to the history.
    pub fn push_turn(&mut self, role: Role, content: impl Into<String>) {
        self.history.push(Turn::new(role, content));
    }

    /// The last turn, if it was written by the assistant.
    pub fn trailing_assistant_turn(&self) -> Option<&Turn> {
        self.history.last().filter(|t| t.role == Role::Assistant)
    }
}

/// How a chat turn ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TurnOutcome {
    /// The agent answered and the answer was appended to the history.
    Replied,
    /// The agent failed; nothing was appended after the user turn.
    UpstreamFailed { detail: String },
}

/// Result of [`ChatOrchestrator::handle`](crate::ChatOrchestrator::handle).
#[derive(Debug, Clone)]
pub struct ChatReply {
    /// Text to show the user: the agent's answer or an apology.
    pub text: String,
    pub outcome: TurnOutcome,
    /// Listing format the answer was recognised as, when validated.
    pub format: Option<ResponseFormat>,
    /// Set when the answer looked like a listing but broke its format.
    pub format_issue: Option<FormatMismatch>,
    /// Context after this turn.
    pub context: SessionContext,
}

impl ChatReply {
    pub fn is_success(&self) -> bool {
        self.outcome == TurnOutcome::Replied
    }
}

/// Runtime settings for the orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub session_ttl: Option<Duration>,
    pub max_message_chars: usize,
    pub validate_format: bool,
    pub agent_timeout: Duration,
}

impl OrchestratorConfig {
    pub fn from_config(config: &FreddoConfig) -> Self {
        let ttl = config.chat.session_ttl_secs;
        Self {
            session_ttl: (ttl > 0).then(|| Duration::from_secs(ttl)),
            max_message_chars: config.chat.max_message_chars,
            validate_format: config.chat.validate_format,
            agent_timeout: Duration::from_secs(config.agent.timeout_secs),
        }
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self::from_config(&FreddoConfig::default())
    }
}
