use genny::api::models::{to_wire, Message};
use genny::api::response::{extract_content, parse_model_response, parse_tool_calls};
use genny::models::{Content, ContentBlock, Role, ToolRequest, ToolResult, Turn};
use serde_json::{json, Map};

#[test]
fn test_extract_content_with_content() {
    let response = json!({
        "choices": [{
            "message": {
                "content": "Hello, world!",
                "role": "assistant"
            }
        }]
    });

    let content = extract_content(&response).unwrap();
    assert_eq!(content, Some(Content::Text("Hello, world!".to_string())));
}

#[test]
fn test_extract_content_without_content() {
    let response = json!({
        "choices": [{
            "message": {
                "role": "assistant",
                "content": null
            }
        }]
    });

    let content = extract_content(&response).unwrap();
    assert_eq!(content, None);
}

#[test]
fn test_extract_content_blocks() {
    let response = json!({
        "choices": [{
            "message": {
                "role": "assistant",
                "content": [
                    {"type": "text", "text": "Part one. "},
                    {"type": "image_url", "image_url": {"url": "https://example.com/a.png"}},
                    {"type": "text", "text": "Part two."}
                ]
            }
        }]
    });

    let content = extract_content(&response).unwrap().unwrap();
    match &content {
        Content::Blocks(blocks) => {
            assert_eq!(blocks.len(), 3);
            assert!(matches!(blocks[1], ContentBlock::ImageUrl { .. }));
        }
        other => panic!("expected blocks, got {:?}", other),
    }
    assert_eq!(content.to_plain_text(), "Part one. Part two.");
}

#[test]
fn test_extract_content_empty_choices() {
    let response = json!({
        "choices": []
    });

    let result = extract_content(&response);
    assert!(result.is_err());
}

#[test]
fn test_parse_tool_calls_with_tools() {
    let response = json!({
        "choices": [{
            "message": {
                "role": "assistant",
                "tool_calls": [
                    {
                        "id": "call_123",
                        "type": "function",
                        "function": {
                            "name": "web_search",
                            "arguments": "{\"query\": \"Stanford acceptance rate\"}"
                        }
                    }
                ]
            }
        }]
    });

    let tool_calls = parse_tool_calls(&response).unwrap();
    let calls = tool_calls.unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0]["id"], "call_123");
}

#[test]
fn test_parse_tool_calls_empty_array() {
    let response = json!({
        "choices": [{
            "message": {
                "role": "assistant",
                "tool_calls": []
            }
        }]
    });

    let tool_calls = parse_tool_calls(&response).unwrap();
    assert!(tool_calls.is_none());
}

#[test]
fn test_parse_model_response_plain_answer() {
    let response = json!({
        "choices": [{
            "message": {"role": "assistant", "content": "4"}
        }]
    });

    let parsed = parse_model_response(&response).unwrap();
    assert_eq!(parsed.turn.role, Role::Assistant);
    assert_eq!(parsed.turn.text(), "4");
    assert!(!parsed.turn.has_tool_requests());
    assert!(parsed.malformed.is_empty());
}

#[test]
fn test_parse_model_response_with_requests() {
    let response = json!({
        "choices": [{
            "message": {
                "role": "assistant",
                "content": null,
                "tool_calls": [
                    {
                        "id": "call_1",
                        "type": "function",
                        "function": {"name": "web_search", "arguments": "{\"query\": \"MIT deadline\"}"}
                    },
                    {
                        "id": "call_2",
                        "type": "function",
                        "function": {"name": "web_search", "arguments": {"query": "Yale deadline"}}
                    }
                ]
            }
        }]
    });

    let parsed = parse_model_response(&response).unwrap();
    let requests = &parsed.turn.tool_requests;
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].id, "call_1");
    assert_eq!(requests[0].arguments["query"], "MIT deadline");
    assert_eq!(requests[1].arguments["query"], "Yale deadline");
    assert!(parsed.turn.content.is_none());
    assert!(parsed.malformed.is_empty());
}

#[test]
fn test_parse_model_response_malformed_calls() {
    let response = json!({
        "choices": [{
            "message": {
                "role": "assistant",
                "tool_calls": [
                    {
                        "id": "call_bad_json",
                        "type": "function",
                        "function": {"name": "web_search", "arguments": "{not json"}
                    },
                    {
                        "id": "call_no_name",
                        "type": "function",
                        "function": {"arguments": "{}"}
                    },
                    {
                        "type": "function",
                        "function": {"name": "web_search", "arguments": "{}"}
                    }
                ]
            }
        }]
    });

    let parsed = parse_model_response(&response).unwrap();
    assert_eq!(parsed.turn.tool_requests.len(), 3);
    assert_eq!(parsed.malformed.len(), 3);
    assert!(parsed.malformed["call_bad_json"].contains("failed to parse arguments"));
    assert!(parsed.malformed["call_no_name"].contains("function.name"));

    let generated = &parsed.turn.tool_requests[2].id;
    assert!(generated.starts_with("call_"));
    assert!(parsed.malformed[generated].contains("'id'"));
}

#[test]
fn test_wire_messages_carry_tool_traffic() {
    let mut args = Map::new();
    args.insert("query".to_string(), json!("Harvard SAT range"));
    let turns = vec![
        Turn::system("prompt"),
        Turn::user("question"),
        Turn::assistant_with_requests(None, vec![ToolRequest::new("call_1", "web_search", args)]),
        Turn::tool_result(ToolResult::success("call_1", "results")),
    ];

    let wire: Vec<Message> = to_wire(&turns);
    assert_eq!(wire[0].role, "system");
    assert_eq!(wire[2].role, "assistant");
    let calls = wire[2].tool_calls.as_ref().unwrap();
    assert_eq!(calls[0].tool_type, "function");
    assert_eq!(calls[0].function.arguments, "{\"query\":\"Harvard SAT range\"}");
    assert_eq!(wire[3].role, "tool");
    assert_eq!(wire[3].tool_call_id.as_deref(), Some("call_1"));

    let encoded = serde_json::to_value(&wire[1]).unwrap();
    assert_eq!(encoded, json!({"role": "user", "content": "question"}));
}
