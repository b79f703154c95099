use async_trait::async_trait;
use genny::agent::{AgentLoop, NoopSink};
use genny::api::{ModelProvider, ModelResponse};
use genny::error::{GennyError, Result};
use genny::ingest::{DocumentIngestor, Upload};
use genny::models::{Role, Turn};
use genny::session::{
    inject_profile, strip_profile, ConversationState, ProfileBuffer, SaveOutcome, Session, PROFILE_MARKER,
};
use genny::store::{ProfileRow, ProfileStore, UpsertOutcome};
use genny::tools::ToolRegistry;
use serde_json::Value;
use std::sync::{Arc, Mutex};

const PROMPT: &str = "You are Genny, a college advisor.";
const GREETING: &str = "Hello! How can I help?";

/// Answers every request with the system prompt it was given.
struct EchoSystemProvider;

#[async_trait]
impl ModelProvider for EchoSystemProvider {
    async fn complete(&self, turns: &[Turn], _tools: &[Value]) -> Result<ModelResponse> {
        Ok(Turn::assistant(turns[0].text()).into())
    }
}

/// Store whose every call fails.
struct BrokenStore;

#[async_trait]
impl ProfileStore for BrokenStore {
    async fn find(&self, _name: &str) -> Result<Option<ProfileRow>> {
        Err(GennyError::Store("sheet unreachable".to_string()))
    }

    async fn upsert(&self, _name: &str, _profile: &str) -> Result<UpsertOutcome> {
        Err(GennyError::Store("sheet unreachable".to_string()))
    }

    async fn list_names(&self) -> Result<Vec<String>> {
        Err(GennyError::Store("sheet unreachable".to_string()))
    }

    async fn read(&self, _name: &str) -> Result<String> {
        Err(GennyError::Store("sheet unreachable".to_string()))
    }
}

/// In-memory store recording upserts.
#[derive(Default)]
struct MemoryStore {
    rows: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn find(&self, name: &str) -> Result<Option<ProfileRow>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|(n, _)| n == name)
            .map(|(n, p)| ProfileRow {
                name: n.clone(),
                profile: p.clone(),
                updated_at: None,
            }))
    }

    async fn upsert(&self, name: &str, profile: &str) -> Result<UpsertOutcome> {
        let mut rows = self.rows.lock().unwrap();
        match rows.iter_mut().find(|(n, _)| n == name) {
            Some(row) => {
                row.1 = profile.to_string();
                Ok(UpsertOutcome::Updated)
            }
            None => {
                rows.push((name.to_string(), profile.to_string()));
                Ok(UpsertOutcome::Created)
            }
        }
    }

    async fn list_names(&self) -> Result<Vec<String>> {
        Ok(self.rows.lock().unwrap().iter().map(|(n, _)| n.clone()).collect())
    }

    async fn read(&self, name: &str) -> Result<String> {
        self.find(name)
            .await?
            .map(|row| row.profile)
            .ok_or_else(|| GennyError::Store(format!("student '{}' not found", name)))
    }
}

fn profile(text: &str) -> ProfileBuffer {
    let mut buffer = ProfileBuffer::new();
    buffer.append(text);
    buffer
}

async fn session_with_profile(text: &str) -> Session {
    let mut session = Session::new(PROMPT, GREETING);
    let uploads = [Upload::new("notes.txt", "text/plain", text.as_bytes().to_vec())];
    session.ingest(&DocumentIngestor::default(), &uploads).await;
    session
}

#[test]
fn test_new_conversation_has_system_and_greeting() {
    let state = ConversationState::new(PROMPT, GREETING);
    assert_eq!(state.len(), 2);
    assert_eq!(state.turns()[0].role, Role::System);
    assert_eq!(state.turns()[1].role, Role::Assistant);
    assert_eq!(state.turns()[1].text(), GREETING);
}

#[test]
fn test_push_assistant_keeps_single_system_turn() {
    let mut state = ConversationState::new(PROMPT, GREETING);
    state.push_user("hi");
    state.push_assistant(Turn::system("sneaky"));

    let systems = state.turns().iter().filter(|t| t.role == Role::System).count();
    assert_eq!(systems, 1);
    assert_eq!(state.last().unwrap().role, Role::Assistant);
}

#[test]
fn test_inject_profile_format() {
    let injected = inject_profile(PROMPT, &profile("GPA 3.9\n"));
    assert_eq!(
        injected,
        format!(
            "{}\n\n[CURRENT STUDENT DATA]:\nGPA 3.9\n\n\nINSTRUCTION: The user has uploaded the above student profile. Use this data to provide personalized admission prediction ('Chance Me') and specific improvement advice when asked.",
            PROMPT
        )
    );
}

#[test]
fn test_inject_profile_is_idempotent() {
    let data = profile("SAT 1540\n");
    let once = inject_profile(PROMPT, &data);
    let twice = inject_profile(&once, &data);

    assert_eq!(once, twice);
    assert_eq!(twice.matches(PROFILE_MARKER).count(), 1);
    assert_eq!(strip_profile(&twice), PROMPT);
}

#[test]
fn test_inject_empty_profile_removes_section() {
    let injected = inject_profile(PROMPT, &profile("ACT 35"));
    assert_eq!(inject_profile(&injected, &ProfileBuffer::new()), PROMPT);
}

#[test]
fn test_profile_preview_truncates() {
    let buffer = profile(&"a".repeat(600));
    let preview = buffer.preview(500);
    assert_eq!(preview.len(), 503);
    assert!(preview.ends_with("..."));
    assert_eq!(profile("short").preview(500), "short");
}

#[tokio::test]
async fn test_ingest_refreshes_system_turn() {
    let session = session_with_profile("GPA 3.9").await;

    let system = session.conversation().system_content();
    assert!(system.starts_with(PROMPT));
    assert!(system.contains("[CURRENT STUDENT DATA]:\nGPA 3.9\n"));
    assert_eq!(session.profile().as_str(), "GPA 3.9\n");
}

#[tokio::test]
async fn test_ask_sends_profile_once_per_request() {
    let mut session = session_with_profile("GPA 3.9").await;
    let agent = AgentLoop::new(Arc::new(EchoSystemProvider), Arc::new(ToolRegistry::default()), 3);

    let first = session.ask("Chance me for MIT", &agent, &NoopSink).await.unwrap();
    let second = session.ask("And Stanford?", &agent, &NoopSink).await.unwrap();

    assert_eq!(first.answer.text().matches(PROFILE_MARKER).count(), 1);
    assert_eq!(second.answer.text(), first.answer.text());
    assert_eq!(session.conversation().len(), 6);
}

#[tokio::test]
async fn test_reset_restores_initial_state() {
    let mut session = session_with_profile("GPA 3.9").await;
    let agent = AgentLoop::new(Arc::new(EchoSystemProvider), Arc::new(ToolRegistry::default()), 3);
    session.ask("Hello", &agent, &NoopSink).await.unwrap();

    session.reset();

    assert!(session.profile().is_empty());
    assert_eq!(session.conversation().len(), 2);
    assert_eq!(session.conversation().system_content(), PROMPT);
    assert_eq!(session.conversation().turns()[1].text(), GREETING);
}

#[test]
fn test_dated_session_prefixes_date() {
    let session = Session::dated(PROMPT, GREETING, "Monday, October 19, 2026");
    assert_eq!(
        session.conversation().system_content(),
        format!("Today's date is Monday, October 19, 2026.\n\n{}", PROMPT)
    );
}

#[tokio::test]
async fn test_save_requires_name_and_profile() {
    let store = MemoryStore::default();
    let empty = Session::new(PROMPT, GREETING);
    assert_eq!(empty.save_profile(&store, "Jane").await.unwrap(), SaveOutcome::EmptyProfile);

    let session = session_with_profile("GPA 3.9").await;
    assert_eq!(session.save_profile(&store, "  ").await.unwrap(), SaveOutcome::MissingName);
    assert!(store.list_names().await.unwrap().is_empty());

    assert_eq!(
        session.save_profile(&store, "Jane").await.unwrap(),
        SaveOutcome::Saved(UpsertOutcome::Created)
    );
    assert_eq!(
        session.save_profile(&store, "Jane").await.unwrap(),
        SaveOutcome::Saved(UpsertOutcome::Updated)
    );
}

#[tokio::test]
async fn test_load_replaces_profile() {
    let store = MemoryStore::default();
    store.upsert("Jane", "SAT 1550\n").await.unwrap();
    let mut session = session_with_profile("GPA 3.9").await;

    session.load_profile(&store, "Jane").await.unwrap();

    assert_eq!(session.profile().as_str(), "SAT 1550\n");
    let system = session.conversation().system_content();
    assert!(system.contains("SAT 1550"));
    assert!(!system.contains("GPA 3.9"));
}

#[tokio::test]
async fn test_store_failures_leave_session_unchanged() {
    let mut session = session_with_profile("GPA 3.9").await;
    let before = session.conversation().clone();

    let save = session.save_profile(&BrokenStore, "Jane").await;
    assert!(matches!(save, Err(GennyError::Store(_))));

    let load = session.load_profile(&BrokenStore, "Jane").await;
    assert!(matches!(load, Err(GennyError::Store(_))));
    assert_eq!(session.profile().as_str(), "GPA 3.9\n");
    assert_eq!(session.conversation(), &before);

    assert!(session.saved_profiles(&BrokenStore).await.is_err());
}
