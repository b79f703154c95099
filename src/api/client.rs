use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
use std::time::Duration;

use crate::api::models::{to_wire, Message, RequestBody};
use crate::api::response::{extract_content, parse_model_response};
use crate::api::{ModelProvider, ModelResponse};
use crate::error::{GennyError, Result};
use crate::ingest::Transcriber;
use crate::models::{Content, ContentBlock, ImageUrl, Turn};

/// Client for any OpenAI-compatible chat-completions endpoint.
pub struct ChatClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
}

impl ChatClient {
    pub fn new(api_key: &str, endpoint: &str, model: &str, request_timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|e| GennyError::ConfigError(format!("Invalid authorization header: {}", e)))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(request_timeout)
            .build()?;

        Ok(Self {
            http,
            endpoint: endpoint.to_string(),
            model: model.to_string(),
        })
    }

    async fn post(&self, request_body: &RequestBody) -> Result<Value> {
        tracing::debug!(
            model = %request_body.model,
            messages = request_body.messages.len(),
            tools = request_body.tools.as_ref().map_or(0, Vec::len),
            "sending chat completion request"
        );

        let response = self
            .http
            .post(&self.endpoint)
            .json(request_body)
            .send()
            .await
            .map_err(map_send_error)?;

        let status = response.status();
        tracing::debug!(status = %status, "chat completion response");

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(GennyError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let response_text = response.text().await.map_err(map_send_error)?;
        tracing::trace!(body = %response_text, "raw response");
        Ok(serde_json::from_str(&response_text)?)
    }
}

fn map_send_error(err: reqwest::Error) -> GennyError {
    if err.is_timeout() {
        GennyError::Timeout
    } else {
        GennyError::NetworkError(err)
    }
}

#[async_trait]
impl ModelProvider for ChatClient {
    async fn complete(&self, turns: &[Turn], tools: &[Value]) -> Result<ModelResponse> {
        let request_body = RequestBody {
            model: self.model.clone(),
            messages: to_wire(turns),
            stream: false,
            tools: if tools.is_empty() {
                None
            } else {
                Some(tools.to_vec())
            },
        };

        let response_json = self.post(&request_body).await?;
        parse_model_response(&response_json)
    }
}

#[async_trait]
impl Transcriber for ChatClient {
    async fn transcribe(&self, image: &[u8], mime_type: &str, instruction: &str) -> Result<String> {
        let data_url = format!("data:{};base64,{}", mime_type, STANDARD.encode(image));
        let request_body = RequestBody {
            model: self.model.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: Some(Content::Blocks(vec![
                    ContentBlock::Text {
                        text: instruction.to_string(),
                    },
                    ContentBlock::ImageUrl {
                        image_url: ImageUrl { url: data_url },
                    },
                ])),
                tool_calls: None,
                tool_call_id: None,
            }],
            stream: false,
            tools: None,
        };

        let response_json = self.post(&request_body).await?;
        Ok(extract_content(&response_json)?
            .map(|c| c.to_plain_text())
            .unwrap_or_default())
    }
}
