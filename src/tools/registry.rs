use async_trait::async_trait;
use jsonschema::{Draft, JSONSchema};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::error::{GennyError, Result};
use crate::models::{ToolRequest, ToolResult};

const TRUNCATION_MARKER: &str = "\n[... truncated]";

/// One external capability the model may call.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON schema for the arguments object.
    fn parameters_schema(&self) -> Value;

    async fn call(&self, arguments: &Map<String, Value>) -> anyhow::Result<String>;
}

#[derive(Debug, Clone)]
pub struct ToolSettings {
    pub timeout: Duration,
    pub max_result_chars: usize,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(crate::config::defaults::default_tool_timeout()),
            max_result_chars: crate::config::defaults::default_max_result_chars(),
        }
    }
}

pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    settings: ToolSettings,
}

impl ToolRegistry {
    pub fn new(settings: ToolSettings) -> Self {
        Self {
            tools: HashMap::new(),
            settings,
        }
    }

    /// Later registrations under the same name replace earlier ones.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    /// Tools sorted by name, so declarations are stable between requests.
    pub fn list(&self) -> Vec<&Arc<dyn Tool>> {
        let mut tools: Vec<&Arc<dyn Tool>> = self.tools.values().collect();
        tools.sort_by(|a, b| a.name().cmp(b.name()));
        tools
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn settings(&self) -> &ToolSettings {
        &self.settings
    }

    /// Function declarations in the chat-completions `tools` format.
    pub fn schemas(&self) -> Vec<Value> {
        self.list()
            .iter()
            .map(|tool| {
                json!({
                    "type": "function",
                    "function": {
                        "name": tool.name(),
                        "description": tool.description(),
                        "parameters": tool.parameters_schema(),
                    }
                })
            })
            .collect()
    }

    pub fn validate_arguments(&self, tool_name: &str, arguments: &Map<String, Value>) -> std::result::Result<(), String> {
        let tool = self
            .tools
            .get(tool_name)
            .ok_or_else(|| format!("Tool '{}' not found", tool_name))?;

        let schema_value = tool.parameters_schema();
        let schema = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(&schema_value)
            .map_err(|e| format!("Invalid tool schema: {}", e))?;

        let instance = Value::Object(arguments.clone());
        if let Err(errors) = schema.validate(&instance) {
            let error_messages: Vec<String> = errors
                .map(|e| format!("{}: {}", e.instance_path, e))
                .collect();
            return Err(error_messages.join("; "));
        }

        Ok(())
    }

    /// Runs one request. Unknown tools, invalid arguments, tool failures
    /// and timeouts all come back as `ToolExecution`.
    pub async fn invoke(&self, request: &ToolRequest) -> Result<ToolResult> {
        let fail = |message: String| GennyError::ToolExecution {
            name: request.name.clone(),
            message,
        };

        let tool = self
            .tools
            .get(&request.name)
            .ok_or_else(|| fail(format!("Tool '{}' not found", request.name)))?;

        self.validate_arguments(&request.name, &request.arguments)
            .map_err(|e| fail(format!("invalid arguments: {}", e)))?;

        tracing::debug!(tool = %request.name, id = %request.id, "invoking tool");

        let output = match timeout(self.settings.timeout, tool.call(&request.arguments)).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => return Err(fail(format!("{:#}", e))),
            Err(_) => {
                return Err(fail(format!(
                    "timed out after {} seconds",
                    self.settings.timeout.as_secs()
                )))
            }
        };

        Ok(ToolResult::success(
            request.id.clone(),
            cap_chars(&output, self.settings.max_result_chars),
        ))
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new(ToolSettings::default())
    }
}

/// Cuts `text` to at most `max_chars` characters, marker included.
pub fn cap_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let marker_len = TRUNCATION_MARKER.chars().count();
    if max_chars <= marker_len {
        return text.chars().take(max_chars).collect();
    }
    let mut capped: String = text.chars().take(max_chars - marker_len).collect();
    capped.push_str(TRUNCATION_MARKER);
    capped
}
