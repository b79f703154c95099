use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{Content, Turn};

#[derive(Serialize)]
pub struct RequestBody {
    pub model: String,
    pub messages: Vec<Message>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Value>>,
}

/// Chat-completions message as it travels over the wire.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Message {
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub tool_type: String,
    pub function: FunctionCall,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded arguments object.
    pub arguments: String,
}

impl From<&Turn> for Message {
    fn from(turn: &Turn) -> Self {
        let tool_calls = if turn.tool_requests.is_empty() {
            None
        } else {
            Some(
                turn.tool_requests
                    .iter()
                    .map(|req| ToolCall {
                        id: req.id.clone(),
                        tool_type: "function".to_string(),
                        function: FunctionCall {
                            name: req.name.clone(),
                            arguments: req.arguments_json(),
                        },
                    })
                    .collect(),
            )
        };

        Message {
            role: turn.role.as_str().to_string(),
            content: turn.content.clone(),
            tool_calls,
            tool_call_id: turn.tool_call_id.clone(),
        }
    }
}

pub fn to_wire(turns: &[Turn]) -> Vec<Message> {
    turns.iter().map(Message::from).collect()
}
