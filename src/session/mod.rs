mod conversation;
mod profile;

use chrono::{DateTime, Local};
use tracing::Instrument;
use uuid::Uuid;

use crate::agent::{AgentLoop, AgentOutcome, EventSink};
use crate::error::Result;
use crate::ingest::{DocumentIngestor, IngestReport, Upload};
use crate::store::{ProfileStore, UpsertOutcome};

pub use conversation::ConversationState;
pub use profile::{inject_profile, strip_profile, ProfileBuffer, PROFILE_INSTRUCTION, PROFILE_MARKER};

/// What a save request did. Only `Saved` reached the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(UpsertOutcome),
    MissingName,
    EmptyProfile,
}

/// Everything one user's chat owns: the message log and the uploaded
/// profile. Created at start, mutated only through the methods below.
pub struct Session {
    id: Uuid,
    started_at: DateTime<Local>,
    base_prompt: String,
    greeting: String,
    conversation: ConversationState,
    profile: ProfileBuffer,
}

impl Session {
    pub fn new(base_prompt: impl Into<String>, greeting: impl Into<String>) -> Self {
        let base_prompt = base_prompt.into();
        let greeting = greeting.into();
        Self {
            id: Uuid::new_v4(),
            started_at: Local::now(),
            conversation: ConversationState::new(base_prompt.clone(), greeting.clone()),
            base_prompt,
            greeting,
            profile: ProfileBuffer::new(),
        }
    }

    /// Base prompt prefixed with today's date.
    pub fn dated(base_prompt: &str, greeting: impl Into<String>, date: &str) -> Self {
        Self::new(format!("Today's date is {}.\n\n{}", date, base_prompt), greeting)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    pub fn conversation(&self) -> &ConversationState {
        &self.conversation
    }

    pub fn profile(&self) -> &ProfileBuffer {
        &self.profile
    }

    pub fn greeting(&self) -> &str {
        &self.greeting
    }

    /// Clears the profile and returns the log to `[system, greeting]`.
    pub fn reset(&mut self) {
        self.profile.clear();
        self.conversation
            .reset(self.base_prompt.clone(), self.greeting.clone());
        tracing::debug!(session = %self.id, "session reset");
    }

    /// Re-derives the system turn from the base prompt and current profile.
    pub fn refresh_system_turn(&mut self) {
        let content = inject_profile(&self.conversation.system_content(), &self.profile);
        self.conversation.set_system_content(content);
    }

    pub async fn ingest(&mut self, ingestor: &DocumentIngestor, uploads: &[Upload]) -> IngestReport {
        let report = ingestor.ingest(uploads, &mut self.profile).await;
        if report.has_new_text() {
            self.refresh_system_turn();
        }
        report
    }

    /// Appends the user turn, refreshes the profile section and runs the
    /// agent until it answers.
    pub async fn ask(&mut self, input: &str, agent: &AgentLoop, events: &dyn EventSink) -> Result<AgentOutcome> {
        self.conversation.push_user(input);
        self.refresh_system_turn();
        agent
            .run(&mut self.conversation, events)
            .instrument(tracing::debug_span!("ask", session = %self.id))
            .await
    }

    pub async fn save_profile(&self, store: &dyn ProfileStore, name: &str) -> Result<SaveOutcome> {
        if name.trim().is_empty() {
            return Ok(SaveOutcome::MissingName);
        }
        if self.profile.is_empty() {
            return Ok(SaveOutcome::EmptyProfile);
        }
        let outcome = store.upsert(name, self.profile.as_str()).await?;
        Ok(SaveOutcome::Saved(outcome))
    }

    /// Replaces the profile with the stored one. On a store error the
    /// current profile is left untouched.
    pub async fn load_profile(&mut self, store: &dyn ProfileStore, name: &str) -> Result<()> {
        let text = store.read(name).await?;
        self.profile.replace(text);
        self.refresh_system_turn();
        Ok(())
    }

    pub async fn saved_profiles(&self, store: &dyn ProfileStore) -> Result<Vec<String>> {
        store.list_names().await
    }
}
