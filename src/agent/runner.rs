use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;

use crate::api::{ModelProvider, ModelResponse};
use crate::error::{GennyError, Result};
use crate::models::{ToolRequest, ToolResult, Turn};
use crate::session::ConversationState;
use crate::tools::ToolRegistry;

use super::events::{AgentEvent, EventSink, LoopPhase};

enum LoopState {
    AwaitingModel,
    AwaitingToolResults {
        requests: Vec<ToolRequest>,
        malformed: HashMap<String, String>,
    },
    Done(Turn),
}

impl LoopState {
    fn phase(&self) -> LoopPhase {
        match self {
            LoopState::AwaitingModel => LoopPhase::AwaitingModel,
            LoopState::AwaitingToolResults { .. } => LoopPhase::AwaitingToolResults,
            LoopState::Done(_) => LoopPhase::Done,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AgentOutcome {
    /// The final assistant turn, already appended to the conversation.
    pub answer: Turn,
    pub iterations: usize,
    pub tool_calls: usize,
}

/// Alternates between the model and the tools until the model answers
/// without requesting any tool.
pub struct AgentLoop {
    provider: Arc<dyn ModelProvider>,
    tools: Arc<ToolRegistry>,
    max_iterations: usize,
}

impl AgentLoop {
    pub fn new(provider: Arc<dyn ModelProvider>, tools: Arc<ToolRegistry>, max_iterations: usize) -> Self {
        Self {
            provider,
            tools,
            max_iterations: max_iterations.max(1),
        }
    }

    /// Runs the loop on a conversation that ends with a new user turn.
    ///
    /// At most `max_iterations` model calls are made; past that the loop
    /// stops with `LoopLimitExceeded`, carrying the last assistant text it
    /// saw, if any.
    pub async fn run(&self, conversation: &mut ConversationState, events: &dyn EventSink) -> Result<AgentOutcome> {
        let schemas = self.tools.schemas();
        let mut state = LoopState::AwaitingModel;
        let mut iterations = 0;
        let mut tool_calls = 0;
        let mut partial: Option<String> = None;

        loop {
            let from = state.phase();
            let next = match state {
                LoopState::AwaitingModel => {
                    if iterations >= self.max_iterations {
                        tracing::warn!(limit = self.max_iterations, "agent loop limit reached");
                        return Err(GennyError::LoopLimitExceeded {
                            limit: self.max_iterations,
                            partial,
                        });
                    }
                    iterations += 1;
                    events.emit(AgentEvent::ModelRequested { iteration: iterations });
                    tracing::debug!(iteration = iterations, turns = conversation.len(), "requesting model");

                    let ModelResponse { turn, malformed } =
                        self.provider.complete(conversation.turns(), &schemas).await?;

                    let text = turn.text();
                    if !text.trim().is_empty() {
                        partial = Some(text);
                    }

                    if turn.has_tool_requests() {
                        let requests = turn.tool_requests.clone();
                        conversation.push_assistant(turn);
                        LoopState::AwaitingToolResults { requests, malformed }
                    } else {
                        conversation.push_assistant(turn.clone());
                        LoopState::Done(turn)
                    }
                }
                LoopState::AwaitingToolResults { requests, malformed } => {
                    tool_calls += requests.len();
                    self.resolve_requests(conversation, &requests, &malformed, events)
                        .await;
                    LoopState::AwaitingModel
                }
                LoopState::Done(answer) => {
                    events.emit(AgentEvent::Completed { iterations });
                    return Ok(AgentOutcome {
                        answer,
                        iterations,
                        tool_calls,
                    });
                }
            };

            events.emit(AgentEvent::Transition {
                from,
                to: next.phase(),
            });
            state = next;
        }
    }

    /// Executes every request concurrently and appends one result per
    /// request, in completion order. Failures become error results so the
    /// model always gets an answer for each id.
    async fn resolve_requests(
        &self,
        conversation: &mut ConversationState,
        requests: &[ToolRequest],
        malformed: &HashMap<String, String>,
        events: &dyn EventSink,
    ) {
        let mut in_flight: FuturesUnordered<_> = requests
            .iter()
            .map(|request| self.execute(request, malformed.get(&request.id), events))
            .collect();

        while let Some(result) = in_flight.next().await {
            conversation.push_tool_result(result);
        }

        for id in conversation.pending_tool_requests() {
            tracing::warn!(%id, "tool request left unanswered");
            conversation.push_tool_result(ToolResult::error(id, "no result was produced for this call"));
        }
    }

    async fn execute(
        &self,
        request: &ToolRequest,
        rejection: Option<&String>,
        events: &dyn EventSink,
    ) -> ToolResult {
        events.emit(AgentEvent::ToolStarted {
            id: request.id.clone(),
            name: request.name.clone(),
            arguments: request.arguments.clone(),
        });

        let result = match rejection {
            Some(reason) => ToolResult::error(request.id.clone(), reason),
            None => match self.tools.invoke(request).await {
                Ok(result) => result,
                Err(e) => {
                    tracing::warn!(tool = %request.name, error = %e, "tool call failed");
                    ToolResult::error(request.id.clone(), e)
                }
            },
        };

        events.emit(AgentEvent::ToolFinished {
            id: request.id.clone(),
            name: request.name.clone(),
            error: result.is_error.then(|| result.content.clone()),
            chars: result.content.chars().count(),
        });

        result
    }
}
