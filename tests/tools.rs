use async_trait::async_trait;
use genny::error::GennyError;
use genny::models::ToolRequest;
use genny::tools::{
    cap_chars, format_hits, SearchHit, SearchProvider, Tool, ToolRegistry, ToolSettings, WebSearchTool, WEB_SEARCH_TOOL,
};
use serde_json::{json, Map, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Returns `count` canned hits and remembers the queries it saw.
struct FakeSearch {
    count: usize,
    queries: Mutex<Vec<(String, usize)>>,
}

impl FakeSearch {
    fn new(count: usize) -> Arc<Self> {
        Arc::new(Self {
            count,
            queries: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl SearchProvider for FakeSearch {
    async fn search(&self, query: &str, max_results: usize) -> anyhow::Result<Vec<SearchHit>> {
        self.queries.lock().unwrap().push((query.to_string(), max_results));
        Ok((1..=self.count)
            .map(|i| SearchHit {
                title: format!("Result {}", i),
                url: format!("https://example.edu/{}", i),
                content: format!("Snippet {} about {}", i, query),
            })
            .collect())
    }
}

struct SlowTool;

#[async_trait]
impl Tool for SlowTool {
    fn name(&self) -> &str {
        "slow"
    }

    fn description(&self) -> &str {
        "never finishes in time"
    }

    fn parameters_schema(&self) -> Value {
        json!({"type": "object", "properties": {}})
    }

    async fn call(&self, _arguments: &Map<String, Value>) -> anyhow::Result<String> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok("late".to_string())
    }
}

fn args(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}

fn registry_with_search(provider: Arc<FakeSearch>, settings: ToolSettings) -> ToolRegistry {
    let mut registry = ToolRegistry::new(settings);
    registry.register(Arc::new(WebSearchTool::new(provider, 3)));
    registry
}

#[test]
fn test_schemas_use_function_format() {
    let registry = registry_with_search(FakeSearch::new(1), ToolSettings::default());
    let schemas = registry.schemas();

    assert_eq!(schemas.len(), 1);
    assert_eq!(schemas[0]["type"], "function");
    assert_eq!(schemas[0]["function"]["name"], WEB_SEARCH_TOOL);
    assert_eq!(schemas[0]["function"]["parameters"]["required"], json!(["query"]));
}

#[test]
fn test_validate_arguments() {
    let registry = registry_with_search(FakeSearch::new(1), ToolSettings::default());

    assert!(registry
        .validate_arguments(WEB_SEARCH_TOOL, &args(json!({"query": "Duke"})))
        .is_ok());

    let missing = registry.validate_arguments(WEB_SEARCH_TOOL, &args(json!({})));
    assert!(missing.unwrap_err().contains("query"));

    let wrong_type = registry.validate_arguments(WEB_SEARCH_TOOL, &args(json!({"query": 5})));
    assert!(wrong_type.is_err());

    assert!(registry.validate_arguments("calculator", &Map::new()).is_err());
}

#[tokio::test]
async fn test_search_formats_and_limits_hits() {
    let provider = FakeSearch::new(5);
    let registry = registry_with_search(provider.clone(), ToolSettings::default());
    let request = ToolRequest::new("call_1", WEB_SEARCH_TOOL, args(json!({"query": "Rice University"})));

    let result = registry.invoke(&request).await.unwrap();

    assert!(!result.is_error);
    assert_eq!(result.request_id, "call_1");
    assert!(result.content.starts_with("[1] Result 1\nURL: https://example.edu/1\nSnippet 1 about Rice University"));
    assert!(result.content.contains("[3] Result 3"));
    assert!(!result.content.contains("[4]"));
    assert_eq!(
        provider.queries.lock().unwrap().clone(),
        vec![("Rice University".to_string(), 3)]
    );
}

#[tokio::test]
async fn test_search_output_is_capped() {
    let settings = ToolSettings {
        timeout: Duration::from_secs(5),
        max_result_chars: 60,
    };
    let registry = registry_with_search(FakeSearch::new(3), settings);
    let request = ToolRequest::new("call_1", WEB_SEARCH_TOOL, args(json!({"query": "Brown"})));

    let result = registry.invoke(&request).await.unwrap();

    assert_eq!(result.content.chars().count(), 60);
    assert!(result.content.ends_with("[... truncated]"));
}

#[tokio::test]
async fn test_blank_query_rejected() {
    let registry = registry_with_search(FakeSearch::new(1), ToolSettings::default());
    let request = ToolRequest::new("call_1", WEB_SEARCH_TOOL, args(json!({"query": "   "})));

    let err = registry.invoke(&request).await.unwrap_err();
    assert!(err.to_string().contains("Missing required argument: query"));
}

#[tokio::test]
async fn test_unknown_tool_is_execution_error() {
    let registry = ToolRegistry::default();
    let request = ToolRequest::new("call_1", "calculator", Map::new());

    let err = registry.invoke(&request).await.unwrap_err();
    match err {
        GennyError::ToolExecution { name, message } => {
            assert_eq!(name, "calculator");
            assert!(message.contains("not found"));
        }
        other => panic!("expected tool error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_slow_tool_times_out() {
    let mut registry = ToolRegistry::new(ToolSettings {
        timeout: Duration::from_millis(50),
        max_result_chars: 100,
    });
    registry.register(Arc::new(SlowTool));

    let err = registry
        .invoke(&ToolRequest::new("call_1", "slow", Map::new()))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("timed out"));
}

#[test]
fn test_cap_chars() {
    assert_eq!(cap_chars("short", 100), "short");

    let long = "x".repeat(200);
    let capped = cap_chars(&long, 50);
    assert_eq!(capped.chars().count(), 50);
    assert!(capped.ends_with("\n[... truncated]"));

    assert_eq!(cap_chars(&long, 5), "xxxxx");
    assert_eq!(cap_chars("héllo wörld", 11), "héllo wörld");
}

#[test]
fn test_format_hits_empty() {
    assert_eq!(format_hits("Caltech", &[]), "No results found for: Caltech");
}
