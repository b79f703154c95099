use serde_json::{Map, Value};
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::{GennyError, Result};
use crate::models::{Content, ToolRequest, Turn};

use super::ModelResponse;

fn first_message(response_json: &Value) -> Result<&Value> {
    let choices = response_json
        .get("choices")
        .and_then(|c| c.as_array())
        .ok_or_else(|| GennyError::Other("No choices in response".to_string()))?;

    let first_choice = choices
        .first()
        .ok_or_else(|| GennyError::Other("Empty choices array".to_string()))?;

    first_choice
        .get("message")
        .ok_or_else(|| GennyError::Other("No message in response".to_string()))
}

/// Parse a non-streaming API response and extract tool calls if present
pub fn parse_tool_calls(response_json: &Value) -> Result<Option<Vec<Value>>> {
    let message = first_message(response_json)?;

    if let Some(tool_calls) = message.get("tool_calls").and_then(|tc| tc.as_array()) {
        if !tool_calls.is_empty() {
            return Ok(Some(tool_calls.clone()));
        }
    }

    Ok(None)
}

/// Message content as either a string or a list of typed blocks.
pub fn extract_content(response_json: &Value) -> Result<Option<Content>> {
    let message = first_message(response_json)?;

    Ok(message
        .get("content")
        .filter(|c| !c.is_null())
        .and_then(|c| serde_json::from_value::<Content>(c.clone()).ok()))
}

/// Builds the assistant turn from a chat-completions response. Tool calls
/// that cannot be executed as sent still become requests so every id can
/// be answered; the reason is recorded in `malformed`.
pub fn parse_model_response(response_json: &Value) -> Result<ModelResponse> {
    let content = extract_content(response_json)?;
    let mut requests = Vec::new();
    let mut malformed = HashMap::new();

    for call in parse_tool_calls(response_json)?.unwrap_or_default() {
        let id = call
            .get("id")
            .and_then(|i| i.as_str())
            .filter(|i| !i.is_empty())
            .map(str::to_string);
        let id = match id {
            Some(id) => id,
            None => {
                let generated = format!("call_{}", Uuid::new_v4().simple());
                malformed.insert(
                    generated.clone(),
                    "Tool call missing required 'id' field".to_string(),
                );
                requests.push(ToolRequest::new(generated, "", Map::new()));
                continue;
            }
        };

        let function = call.get("function");
        let name = function
            .and_then(|f| f.get("name"))
            .and_then(|n| n.as_str())
            .unwrap_or_default()
            .to_string();
        if name.is_empty() {
            malformed.insert(
                id.clone(),
                format!("Tool call {} missing required 'function.name' field", id),
            );
            requests.push(ToolRequest::new(id, name, Map::new()));
            continue;
        }

        let arguments = match function.and_then(|f| f.get("arguments")) {
            // Most providers send a JSON-encoded string, a few send an object
            Some(Value::String(raw)) if raw.trim().is_empty() => Ok(Map::new()),
            Some(Value::String(raw)) => match serde_json::from_str::<Value>(raw) {
                Ok(Value::Object(map)) => Ok(map),
                Ok(other) => Err(format!("arguments must be a JSON object, got {}", other)),
                Err(e) => Err(format!("failed to parse arguments for tool '{}': {}", name, e)),
            },
            Some(Value::Object(map)) => Ok(map.clone()),
            Some(Value::Null) | None => Ok(Map::new()),
            Some(other) => Err(format!("arguments must be a JSON object, got {}", other)),
        };

        match arguments {
            Ok(arguments) => requests.push(ToolRequest::new(id, name, arguments)),
            Err(reason) => {
                tracing::warn!(tool = %name, %reason, "malformed tool call");
                malformed.insert(id.clone(), reason);
                requests.push(ToolRequest::new(id, name, Map::new()));
            }
        }
    }

    Ok(ModelResponse {
        turn: Turn::assistant_with_requests(content, requests),
        malformed,
    })
}
