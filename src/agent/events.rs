use serde_json::{Map, Value};
use tokio::sync::mpsc::UnboundedSender;

/// Coarse position of the agent loop, reported on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    AwaitingModel,
    AwaitingToolResults,
    Done,
}

/// Progress notifications emitted while the loop runs. They are not part
/// of the loop's result.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentEvent {
    Transition {
        from: LoopPhase,
        to: LoopPhase,
    },
    ModelRequested {
        iteration: usize,
    },
    ToolStarted {
        id: String,
        name: String,
        arguments: Map<String, Value>,
    },
    ToolFinished {
        id: String,
        name: String,
        error: Option<String>,
        chars: usize,
    },
    Completed {
        iterations: usize,
    },
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: AgentEvent);
}

pub struct NoopSink;

impl EventSink for NoopSink {
    fn emit(&self, _event: AgentEvent) {}
}

impl EventSink for UnboundedSender<AgentEvent> {
    fn emit(&self, event: AgentEvent) {
        // A dropped receiver only means nobody is watching.
        let _ = self.send(event);
    }
}
