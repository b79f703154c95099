pub mod client;
pub mod models;
pub mod response;

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;

use crate::error::Result;
use crate::models::Turn;

pub use client::ChatClient;
pub use models::RequestBody;

/// One model reply.
#[derive(Debug, Clone)]
pub struct ModelResponse {
    pub turn: Turn,
    /// Requests in `turn` that must not be executed, keyed by request id,
    /// with the reason reported back to the model.
    pub malformed: HashMap<String, String>,
}

impl From<Turn> for ModelResponse {
    fn from(turn: Turn) -> Self {
        Self {
            turn,
            malformed: HashMap::new(),
        }
    }
}

/// The language-model side of the agent loop.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Sends the whole conversation plus tool declarations and returns the
    /// next assistant turn.
    async fn complete(&self, turns: &[Turn], tools: &[Value]) -> Result<ModelResponse>;
}
