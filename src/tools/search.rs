use anyhow::{anyhow, Context};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::Duration;

use super::registry::Tool;

pub const WEB_SEARCH_TOOL: &str = "web_search";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SearchHit {
    #[serde(default)]
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub content: String,
}

/// Backend answering free-text queries with ranked snippets.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str, max_results: usize) -> anyhow::Result<Vec<SearchHit>>;
}

pub struct WebSearchTool {
    provider: Arc<dyn SearchProvider>,
    max_results: usize,
}

impl WebSearchTool {
    pub fn new(provider: Arc<dyn SearchProvider>, max_results: usize) -> Self {
        Self {
            provider,
            max_results: max_results.max(1),
        }
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        WEB_SEARCH_TOOL
    }

    fn description(&self) -> &str {
        "Search the web for current information such as admission statistics, deadlines, policy changes and news. Returns the top results with titles, URLs and snippets."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                }
            },
            "required": ["query"]
        })
    }

    async fn call(&self, arguments: &Map<String, Value>) -> anyhow::Result<String> {
        let query = arguments
            .get("query")
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .ok_or_else(|| anyhow!("Missing required argument: query"))?;

        let mut hits = self.provider.search(query, self.max_results).await?;
        // Providers do not always honour the requested count.
        hits.truncate(self.max_results);

        Ok(format_hits(query, &hits))
    }
}

pub fn format_hits(query: &str, hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return format!("No results found for: {}", query);
    }
    hits.iter()
        .enumerate()
        .map(|(i, hit)| {
            let title = if hit.title.is_empty() { "Untitled" } else { &hit.title };
            format!("[{}] {}\nURL: {}\n{}", i + 1, title, hit.url, hit.content.trim())
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Tavily search API client.
pub struct TavilyClient {
    http: reqwest::Client,
    endpoint: String,
}

#[derive(Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

impl TavilyClient {
    pub fn new(api_key: &str, endpoint: &str, request_timeout: Duration) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .context("Invalid search API key")?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(request_timeout)
            .build()?;

        Ok(Self {
            http,
            endpoint: endpoint.to_string(),
        })
    }
}

#[async_trait]
impl SearchProvider for TavilyClient {
    async fn search(&self, query: &str, max_results: usize) -> anyhow::Result<Vec<SearchHit>> {
        let body = json!({
            "query": query,
            "max_results": max_results,
            "search_depth": "basic",
        });

        let response = self.http.post(&self.endpoint).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("search API returned {}: {}", status.as_u16(), text));
        }

        let parsed: TavilyResponse = response
            .json()
            .await
            .context("Failed to parse search response")?;
        tracing::debug!(query, hits = parsed.results.len(), "search completed");
        Ok(parsed.results)
    }
}
