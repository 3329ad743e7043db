//! Client for a hosted chat model behind an OpenAI-compatible
//! chat completions endpoint.

use freddo_chat::{AgentError, Turn};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::toolbox::ToolSpec;

/// A message in the model's wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl WireMessage {
    pub fn text(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: Some(content.into()),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    pub fn tool_result(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: "tool".to_string(),
            content: Some(content.into()),
            tool_calls: Vec::new(),
            tool_call_id: Some(call_id.into()),
        }
    }
}

impl From<&Turn> for WireMessage {
    fn from(turn: &Turn) -> Self {
        WireMessage::text(turn.role.as_str(), turn.content.clone())
    }
}

/// A tool call requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type", default = "function_kind")]
    pub kind: String,
    pub function: FunctionCall,
}

fn function_kind() -> String {
    "function".to_string()
}

/// Name and JSON-encoded arguments of a tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub arguments: String,
}

impl FunctionCall {
    /// Arguments as a JSON object. Blank arguments are an empty object.
    pub fn parsed_arguments(&self) -> Result<Value, AgentError> {
        if self.arguments.trim().is_empty() {
            return Ok(json!({}));
        }
        serde_json::from_str(&self.arguments).map_err(|e| {
            AgentError::MalformedResponse(format!(
                "arguments for tool {} are not JSON: {e}",
                self.name
            ))
        })
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [WireMessage],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Value>,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: WireMessage,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// HTTP client for one chat completions endpoint.
#[derive(Clone)]
pub struct ChatModelClient {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl ChatModelClient {
    pub fn new(client: Client, endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            model: model.into(),
            api_key: None,
        }
    }

    /// Sends the key as a bearer token on every request.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Ask the model for the next assistant message.
    pub async fn complete(
        &self,
        messages: &[WireMessage],
        tools: &[ToolSpec],
    ) -> Result<WireMessage, AgentError> {
        let body = CompletionRequest {
            model: &self.model,
            messages,
            tools: tools.iter().map(tool_declaration).collect(),
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AgentError::Transport(format!("model request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read error body".to_string());
            return Err(map_http_error(status, body));
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| AgentError::MalformedResponse(format!("invalid completion: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or_else(|| AgentError::MalformedResponse("completion has no choices".to_string()))
    }
}

fn tool_declaration(tool: &ToolSpec) -> Value {
    json!({
        "type": "function",
        "function": {
            "name": tool.name,
            "description": tool.description,
            "parameters": tool.parameters_schema(),
        }
    })
}

fn map_http_error(status: StatusCode, body: String) -> AgentError {
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|wrapper| wrapper.error.message)
        .unwrap_or(body);
    AgentError::Status {
        status: status.as_u16(),
        message,
    }
}
