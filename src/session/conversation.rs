use crate::models::{Content, Role, ToolResult, Turn};

/// Ordered message log. The first turn is always the single system turn;
/// the append operations below cannot add another one.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationState {
    turns: Vec<Turn>,
}

impl ConversationState {
    pub fn new(system_prompt: impl Into<String>, greeting: impl Into<String>) -> Self {
        Self {
            turns: vec![
                Turn::system(system_prompt.into()),
                Turn::assistant(greeting.into()),
            ],
        }
    }

    /// Back to exactly `[system, greeting]`.
    pub fn reset(&mut self, system_prompt: impl Into<String>, greeting: impl Into<String>) {
        *self = Self::new(system_prompt, greeting);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn system_content(&self) -> String {
        self.turns
            .first()
            .map(Turn::text)
            .unwrap_or_default()
    }

    pub fn set_system_content(&mut self, content: String) {
        match self.turns.first_mut() {
            Some(turn) if turn.role == Role::System => turn.content = Some(Content::Text(content)),
            _ => self.turns.insert(0, Turn::system(content)),
        }
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.turns.push(Turn::user(text.into()));
    }

    /// Appends a model turn. A stray system role from a provider is stored
    /// as an assistant turn so the leading-system invariant holds.
    pub fn push_assistant(&mut self, mut turn: Turn) {
        if turn.role != Role::Assistant {
            turn.role = Role::Assistant;
        }
        turn.tool_call_id = None;
        self.turns.push(turn);
    }

    pub fn push_tool_result(&mut self, result: ToolResult) {
        self.turns.push(Turn::tool_result(result));
    }

    /// Ids of tool requests in the latest assistant turn that have no
    /// matching tool turn after it.
    pub fn pending_tool_requests(&self) -> Vec<String> {
        let Some(pos) = self.turns.iter().rposition(|t| t.role == Role::Assistant) else {
            return Vec::new();
        };
        let answered: Vec<&str> = self.turns[pos + 1..]
            .iter()
            .filter(|t| t.role == Role::Tool)
            .filter_map(|t| t.tool_call_id.as_deref())
            .collect();
        self.turns[pos]
            .tool_requests
            .iter()
            .filter(|req| !answered.contains(&req.id.as_str()))
            .map(|req| req.id.clone())
            .collect()
    }
}
