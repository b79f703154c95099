mod sheet;

use async_trait::async_trait;
use chrono::{DateTime, Local};

use crate::error::Result;

pub use sheet::SheetFileStore;

/// One saved student.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileRow {
    pub name: String,
    pub profile: String,
    pub updated_at: Option<DateTime<Local>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

/// Spreadsheet-like store of student profiles keyed by name. Every
/// operation may fail with `GennyError::Store`; callers report the failure
/// and keep their local state.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn find(&self, name: &str) -> Result<Option<ProfileRow>>;

    async fn upsert(&self, name: &str, profile: &str) -> Result<UpsertOutcome>;

    async fn list_names(&self) -> Result<Vec<String>>;

    /// Profile text of `name`; a missing row is a store error.
    async fn read(&self, name: &str) -> Result<String>;
}
