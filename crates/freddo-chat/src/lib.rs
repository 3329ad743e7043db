//! Conversational core for the Freddo recipe assistant.
//!
//! Keeps per-session history and context slots, extracts slots from free
//! text, and drives one external agent round trip per user utterance.

pub mod agent;
pub mod catalog;
pub mod error;
pub mod format;
pub mod orchestrator;
pub mod prompt;
pub mod slots;
pub mod store;
pub mod sweeper;
pub mod types;

pub use agent::AgentClient;
pub use catalog::RecipeCatalog;
pub use error::{AgentError, ChatError};
pub use format::{FormatMismatch, ResponseFormat};
pub use orchestrator::ChatOrchestrator;
pub use store::{SessionHandle, SessionStore};
pub use sweeper::spawn_session_sweeper;
pub use types::{
    ChatReply, LastAction, OrchestratorConfig, Role, Session, SessionContext, Turn, TurnOutcome,
};
