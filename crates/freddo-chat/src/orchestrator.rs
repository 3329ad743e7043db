//! Chat orchestrator: central coordinator wiring slots, sessions and the agent.
//!
//! One call to [`ChatOrchestrator::handle`] is one conversational turn: update
//! the context slots, record the user turn, make a single round trip to the
//! external agent, and record its reply.

use std::sync::Arc;

use chrono::Local;

use crate::agent::AgentClient;
use crate::catalog::RecipeCatalog;
use crate::error::{AgentError, ChatError};
use crate::format;
use crate::prompt::build_system_prompt;
use crate::slots;
use crate::store::SessionStore;
use crate::types::{ChatReply, OrchestratorConfig, Role, Session, TurnOutcome};

/// Prefix of the reply returned when the agent fails.
pub const APOLOGY_PREFIX: &str = "Sorry, I encountered an error: ";

/// Central chat orchestrator.
pub struct ChatOrchestrator {
    store: SessionStore,
    catalog: RecipeCatalog,
    agent: Arc<dyn AgentClient>,
    config: OrchestratorConfig,
}

impl ChatOrchestrator {
    /// Create an orchestrator whose sessions start with the system prompt
    /// rendered for `catalog`.
    pub fn new(
        catalog: RecipeCatalog,
        agent: Arc<dyn AgentClient>,
        config: OrchestratorConfig,
    ) -> Self {
        let store = SessionStore::new(build_system_prompt(&catalog), config.session_ttl);
        Self {
            store,
            catalog,
            agent,
            config,
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn catalog(&self) -> &RecipeCatalog {
        &self.catalog
    }

    /// Handle one user utterance for `session_key`.
    ///
    /// Validation failures and an agent that cannot be readied return an
    /// error and leave the session untouched.
    /// Agent failures are not errors: the reply carries an apology and
    /// [`TurnOutcome::UpstreamFailed`], the user turn stays in the history and
    /// no assistant turn is added.
    pub async fn handle(&self, session_key: &str, utterance: &str) -> Result<ChatReply, ChatError> {
        if utterance.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if utterance.chars().count() > self.config.max_message_chars {
            return Err(ChatError::MessageTooLong(self.config.max_message_chars));
        }

        if let Err(err) = self.agent.prepare().await {
            tracing::error!(session = session_key, error = %err, "Agent not ready");
            return Err(ChatError::AgentUnavailable(err));
        }

        let handle = self.store.get_or_create(session_key);
        // Held for the whole turn so turns on one key never interleave.
        let mut session = handle.lock().await;

        let trailing = session.trailing_assistant_turn().map(|t| t.content.clone());
        let action = slots::update_context(
            &mut session.context,
            utterance,
            trailing.as_deref(),
            &self.catalog,
        );
        if let Some(action) = action {
            tracing::info!(session = session_key, ?action, "Context updated");
        }

        session.push_turn(Role::User, utterance);
        session.last_active_at = Local::now().timestamp();

        let result = self.call_agent(&session).await;
        session.last_active_at = Local::now().timestamp();

        let reply = match result {
            Ok(text) => {
                session.push_turn(Role::Assistant, text.clone());
                let (format, format_issue) = self.check_format(session_key, &text);
                ChatReply {
                    text,
                    outcome: TurnOutcome::Replied,
                    format,
                    format_issue,
                    context: session.context.clone(),
                }
            }
            Err(err) => {
                tracing::warn!(session = session_key, error = %err, "Agent call failed");
                let detail = err.to_string();
                ChatReply {
                    text: format!("{}{}", APOLOGY_PREFIX, detail),
                    outcome: TurnOutcome::UpstreamFailed { detail },
                    format: None,
                    format_issue: None,
                    context: session.context.clone(),
                }
            }
        };

        tracing::debug!(
            session = session_key,
            history_len = session.history.len(),
            context = ?session.context,
            "Turn finished"
        );
        Ok(reply)
    }

    /// Copy of a session, if it exists.
    pub async fn snapshot(&self, session_key: &str) -> Option<Session> {
        self.store.snapshot(session_key).await
    }

    /// Forget a session.
    pub fn reset(&self, session_key: &str) -> Result<(), ChatError> {
        if self.store.evict(session_key) {
            Ok(())
        } else {
            Err(ChatError::SessionNotFound(session_key.to_string()))
        }
    }

    /// Drop idle sessions. Returns how many were removed.
    pub fn evict_expired(&self) -> usize {
        self.store.evict_expired()
    }

    pub fn session_count(&self) -> usize {
        self.store.len()
    }

    // -- Private helpers --

    async fn call_agent(&self, session: &Session) -> Result<String, AgentError> {
        let timeout = self.config.agent_timeout;
        tracing::debug!(
            session = %session.key,
            agent = %self.agent.describe(),
            messages = session.history.len(),
            "Calling agent"
        );
        match tokio::time::timeout(timeout, self.agent.complete(&session.key, &session.history))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(AgentError::Timeout(timeout.as_secs())),
        }
    }

    fn check_format(
        &self,
        session_key: &str,
        text: &str,
    ) -> (Option<format::ResponseFormat>, Option<format::FormatMismatch>) {
        if !self.config.validate_format {
            return (None, None);
        }
        match format::validate(text, &self.catalog) {
            Ok(fmt) => (Some(fmt), None),
            Err(mismatch) => {
                tracing::warn!(session = session_key, %mismatch, "Agent reply broke its format");
                (Some(mismatch.expected), Some(mismatch))
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
