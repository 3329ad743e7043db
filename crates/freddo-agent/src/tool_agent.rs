//! Tool-calling agent: the hosted model answers, calling toolbox tools as
//! needed until it produces a text reply.

use std::time::Duration;

use async_trait::async_trait;
use freddo_chat::{AgentClient, AgentError, Turn};
use freddo_core::FreddoConfig;
use reqwest::Client;
use tokio::sync::OnceCell;

use crate::model::{ChatModelClient, ToolCall, WireMessage};
use crate::toolbox::{ToolSpec, ToolboxClient};

/// [`AgentClient`] backed by a chat model and a toolbox server.
///
/// The toolset is fetched by [`AgentClient::prepare`] before the first turn
/// and reused afterwards. A failed fetch is retried on the next turn.
pub struct ToolCallingAgent {
    model: ChatModelClient,
    toolbox: ToolboxClient,
    toolset: Option<String>,
    tools: OnceCell<Vec<ToolSpec>>,
    max_rounds: usize,
}

impl ToolCallingAgent {
    pub fn new(
        model: ChatModelClient,
        toolbox: ToolboxClient,
        toolset: Option<String>,
        max_rounds: usize,
    ) -> Self {
        Self {
            model,
            toolbox,
            toolset: toolset.filter(|t| !t.is_empty()),
            tools: OnceCell::new(),
            max_rounds: max_rounds.max(1),
        }
    }

    /// Build the agent from the `[agent]` and `[toolbox]` sections.
    ///
    /// The API key is read from the environment variable named by
    /// `agent.api_key_env`; a missing key is logged and requests go out
    /// unauthenticated.
    pub fn from_config(config: &FreddoConfig) -> Result<Self, AgentError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.agent.timeout_secs.max(1)))
            .build()
            .map_err(|e| AgentError::Transport(format!("failed to build HTTP client: {e}")))?;

        let mut model = ChatModelClient::new(
            client.clone(),
            config.agent.endpoint.clone(),
            config.agent.model.clone(),
        );
        match std::env::var(&config.agent.api_key_env) {
            Ok(key) if !key.is_empty() => model = model.with_api_key(key),
            _ => tracing::warn!(
                env = %config.agent.api_key_env,
                "Model API key not set; requests will be unauthenticated"
            ),
        }

        let toolbox = ToolboxClient::new(client, config.toolbox.url.clone());
        Ok(Self::new(
            model,
            toolbox,
            Some(config.toolbox.toolset.clone()),
            config.agent.max_tool_rounds,
        ))
    }

    async fn tools(&self) -> Result<&[ToolSpec], AgentError> {
        let tools = self
            .tools
            .get_or_try_init(|| self.toolbox.load_toolset(self.toolset.as_deref()))
            .await?;
        Ok(tools.as_slice())
    }

    async fn run_tool(&self, call: &ToolCall) -> String {
        let result = match call.function.parsed_arguments() {
            Ok(args) => self.toolbox.invoke(&call.function.name, &args).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!(tool = %call.function.name, error = %e, "Tool call failed");
                format!("error: {e}")
            }
        }
    }
}

#[async_trait]
impl AgentClient for ToolCallingAgent {
    async fn prepare(&self) -> Result<(), AgentError> {
        self.tools().await.map(|_| ())
    }

    async fn complete(&self, session_key: &str, messages: &[Turn]) -> Result<String, AgentError> {
        let tools = self.tools().await?;
        let mut wire: Vec<WireMessage> = messages.iter().map(WireMessage::from).collect();

        for round in 0..self.max_rounds {
            let reply = self.model.complete(&wire, tools).await?;

            if reply.tool_calls.is_empty() {
                let text = reply.content.unwrap_or_default();
                if text.trim().is_empty() {
                    return Err(AgentError::MalformedResponse(
                        "model returned an empty reply".to_string(),
                    ));
                }
                tracing::debug!(session = session_key, rounds = round + 1, "Agent replied");
                return Ok(text);
            }

            let calls = reply.tool_calls.clone();
            wire.push(reply);
            for call in &calls {
                tracing::debug!(
                    session = session_key,
                    tool = %call.function.name,
                    round,
                    "Invoking tool"
                );
                let output = self.run_tool(call).await;
                wire.push(WireMessage::tool_result(call.id.clone(), output));
            }
        }

        Err(AgentError::ToolLoopExhausted(self.max_rounds))
    }

    fn describe(&self) -> String {
        format!("{} via {}", self.model.model(), self.toolbox.base_url())
    }
}
