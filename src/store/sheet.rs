use async_trait::async_trait;
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};

use super::{ProfileRow, ProfileStore, UpsertOutcome};
use crate::error::{GennyError, Result};

pub const HEADER: [&str; 3] = ["Student Name", "Profile", "Updated At"];

/// Profiles kept as rows of a CSV sheet: name in the first column, profile
/// text in the second.
pub struct SheetFileStore {
    path: PathBuf,
}

impl SheetFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_rows(&self) -> Result<Vec<ProfileRow>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)
            .map_err(GennyError::store)?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(GennyError::store)?;
            let name = record.get(0).unwrap_or_default().trim().to_string();
            if name.is_empty() {
                continue;
            }
            rows.push(ProfileRow {
                name,
                profile: record.get(1).unwrap_or_default().to_string(),
                updated_at: record
                    .get(2)
                    .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
                    .map(|ts| ts.with_timezone(&Local)),
            });
        }
        Ok(rows)
    }

    /// Writes a temporary sheet and renames it over the old one.
    fn write_rows(&self, rows: &[ProfileRow]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(GennyError::store)?;
        }

        let tmp_path = self.path.with_extension("csv.tmp");
        {
            let mut writer = csv::Writer::from_path(&tmp_path).map_err(GennyError::store)?;
            writer.write_record(HEADER).map_err(GennyError::store)?;
            for row in rows {
                let updated_at = row.updated_at.map(|ts| ts.to_rfc3339()).unwrap_or_default();
                writer
                    .write_record([row.name.as_str(), row.profile.as_str(), updated_at.as_str()])
                    .map_err(GennyError::store)?;
            }
            writer.flush().map_err(GennyError::store)?;
        }
        fs::rename(&tmp_path, &self.path).map_err(GennyError::store)?;
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for SheetFileStore {
    async fn find(&self, name: &str) -> Result<Option<ProfileRow>> {
        let name = name.trim();
        Ok(self.read_rows()?.into_iter().find(|row| row.name == name))
    }

    async fn upsert(&self, name: &str, profile: &str) -> Result<UpsertOutcome> {
        let name = name.trim();
        if name.is_empty() {
            return Err(GennyError::Store("student name must not be empty".to_string()));
        }

        let mut rows = self.read_rows()?;
        let now = Some(Local::now());
        let outcome = match rows.iter_mut().find(|row| row.name == name) {
            Some(row) => {
                row.profile = profile.to_string();
                row.updated_at = now;
                UpsertOutcome::Updated
            }
            None => {
                rows.push(ProfileRow {
                    name: name.to_string(),
                    profile: profile.to_string(),
                    updated_at: now,
                });
                UpsertOutcome::Created
            }
        };

        self.write_rows(&rows)?;
        tracing::debug!(student = name, ?outcome, path = %self.path.display(), "profile saved");
        Ok(outcome)
    }

    async fn list_names(&self) -> Result<Vec<String>> {
        Ok(self.read_rows()?.into_iter().map(|row| row.name).collect())
    }

    async fn read(&self, name: &str) -> Result<String> {
        self.find(name)
            .await?
            .map(|row| row.profile)
            .ok_or_else(|| GennyError::Store(format!("student '{}' not found", name.trim())))
    }
}
