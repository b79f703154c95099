mod events;
mod runner;

pub use events::{AgentEvent, EventSink, LoopPhase, NoopSink};
pub use runner::{AgentLoop, AgentOutcome};
