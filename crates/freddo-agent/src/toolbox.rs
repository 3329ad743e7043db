//! Client for the remote toolbox server.
//!
//! The toolbox publishes a manifest of database-backed tools and invokes them
//! by name:
//! - `GET  {base}/api/toolset/{name}` returns the manifest.
//! - `POST {base}/api/tool/{tool}/invoke` runs a tool with a JSON object of
//!   arguments and returns `{"result": ...}`.

use std::collections::BTreeMap;

use freddo_chat::AgentError;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Map, Value};

/// One tool parameter as published in the manifest.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ToolParameter {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub description: String,
}

/// One tool as published in the manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ToolParameter>,
}

impl ToolSpec {
    /// JSON schema describing the tool's arguments.
    pub fn parameters_schema(&self) -> Value {
        let mut properties = Map::new();
        for p in &self.parameters {
            properties.insert(
                p.name.clone(),
                json!({ "type": json_schema_type(&p.kind), "description": p.description }),
            );
        }
        let required: Vec<&str> = self.parameters.iter().map(|p| p.name.as_str()).collect();
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

fn json_schema_type(kind: &str) -> &str {
    match kind {
        "float" => "number",
        "string" | "integer" | "number" | "boolean" | "array" | "object" => kind,
        _ => "string",
    }
}

#[derive(Deserialize)]
struct Manifest {
    #[serde(default, rename = "serverVersion")]
    server_version: Option<String>,
    #[serde(default)]
    tools: BTreeMap<String, ManifestTool>,
}

#[derive(Deserialize)]
struct ManifestTool {
    #[serde(default)]
    description: String,
    #[serde(default)]
    parameters: Vec<ToolParameter>,
}

#[derive(Deserialize)]
struct InvokeResponse {
    result: Value,
}

/// HTTP client for one toolbox server.
#[derive(Clone)]
pub struct ToolboxClient {
    client: Client,
    base_url: String,
}

impl ToolboxClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the tool manifest. `None` or an empty name loads the default toolset.
    pub async fn load_toolset(&self, toolset: Option<&str>) -> Result<Vec<ToolSpec>, AgentError> {
        let url = format!("{}/api/toolset/{}", self.base_url, toolset.unwrap_or(""));
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AgentError::Toolbox(format!("failed to load toolset: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::Toolbox(format!(
                "toolset request returned {}: {}",
                status.as_u16(),
                body
            )));
        }

        let manifest: Manifest = response
            .json()
            .await
            .map_err(|e| AgentError::Toolbox(format!("invalid toolset manifest: {e}")))?;

        let tools: Vec<ToolSpec> = manifest
            .tools
            .into_iter()
            .map(|(name, tool)| ToolSpec {
                name,
                description: tool.description,
                parameters: tool.parameters,
            })
            .collect();

        tracing::info!(
            url = %url,
            server_version = manifest.server_version.as_deref().unwrap_or("unknown"),
            tools = tools.len(),
            "Toolset loaded"
        );
        Ok(tools)
    }

    /// Invoke `tool` with `args` and return its result as text.
    pub async fn invoke(&self, tool: &str, args: &Value) -> Result<String, AgentError> {
        let url = format!("{}/api/tool/{}/invoke", self.base_url, tool);
        let response = self
            .client
            .post(&url)
            .json(args)
            .send()
            .await
            .map_err(|e| AgentError::Toolbox(format!("tool {tool} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::Toolbox(format!(
                "tool {tool} returned {}: {}",
                status.as_u16(),
                body
            )));
        }

        let parsed: InvokeResponse = response
            .json()
            .await
            .map_err(|e| AgentError::Toolbox(format!("tool {tool} returned invalid JSON: {e}")))?;

        Ok(match parsed.result {
            Value::String(s) => s,
            other => other.to_string(),
        })
    }
}
