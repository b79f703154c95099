pub mod extract;
mod media;

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use crate::config::defaults::TRANSCRIBE_INSTRUCTION;
use crate::error::{GennyError, Result};
use crate::session::ProfileBuffer;

pub use media::MediaKind;

/// Multimodal model that reads text out of images.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, image: &[u8], mime_type: &str, instruction: &str) -> Result<String>;
}

/// One uploaded file with the media type the uploader declared.
#[derive(Debug, Clone)]
pub struct Upload {
    pub name: String,
    pub declared_type: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            bytes,
        }
    }

    /// Reads a local file, declaring the type guessed from its extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let bytes = std::fs::read(path).map_err(|e| GennyError::extraction(&name, e))?;
        let declared_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Ok(Self::new(name, declared_type, bytes))
    }

    pub fn kind(&self) -> MediaKind {
        MediaKind::detect(&self.declared_type, &self.name)
    }
}

/// Outcome of one batch of uploads.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub loaded: Vec<String>,
    /// One `Extraction` error per file that could not be read.
    pub failures: Vec<GennyError>,
    pub appended_chars: usize,
}

impl IngestReport {
    pub fn has_new_text(&self) -> bool {
        self.appended_chars > 0
    }
}

#[derive(Default)]
pub struct DocumentIngestor {
    transcriber: Option<Arc<dyn Transcriber>>,
}

impl DocumentIngestor {
    pub fn new(transcriber: Option<Arc<dyn Transcriber>>) -> Self {
        Self { transcriber }
    }

    /// Converts one file to the text appended to the profile.
    pub async fn extract(&self, upload: &Upload) -> Result<String> {
        let fail = |e: anyhow::Error| GennyError::extraction(&upload.name, format!("{:#}", e));

        match upload.kind() {
            MediaKind::PlainText => extract::plain_text(&upload.bytes).map_err(fail),
            MediaKind::Csv => extract::csv_table(&upload.bytes).map_err(fail),
            MediaKind::Spreadsheet => extract::spreadsheet_table(&upload.bytes).map_err(fail),
            MediaKind::WordDocument => extract::docx_text(&upload.bytes).map_err(fail),
            MediaKind::Pdf => extract::pdf_text(&upload.bytes).map_err(fail),
            MediaKind::Image(mime_type) => {
                let transcriber = self.transcriber.as_ref().ok_or_else(|| {
                    GennyError::extraction(&upload.name, "image transcription is not configured")
                })?;
                let text = transcriber
                    .transcribe(&upload.bytes, &mime_type, TRANSCRIBE_INSTRUCTION)
                    .await
                    .map_err(|e| GennyError::extraction(&upload.name, e))?;
                Ok(format!("\n[Image Content from {}]:\n{}\n", upload.name, text))
            }
            MediaKind::Unsupported(kind) => Err(GennyError::extraction(
                &upload.name,
                format!("unsupported file type: {}", kind),
            )),
        }
    }

    /// Reads every upload in order. A failing file is recorded and
    /// skipped; the buffer only grows if some file produced text.
    pub async fn ingest(&self, uploads: &[Upload], profile: &mut ProfileBuffer) -> IngestReport {
        let mut report = IngestReport::default();
        let mut collected = String::new();

        for upload in uploads {
            tracing::debug!(file = %upload.name, kind = ?upload.kind(), "reading upload");
            match self.extract(upload).await {
                Ok(text) => {
                    collected.push_str(&text);
                    report.loaded.push(upload.name.clone());
                }
                Err(e) => {
                    tracing::warn!(file = %upload.name, error = %e, "upload skipped");
                    report.failures.push(e);
                }
            }
        }

        if !collected.is_empty() {
            report.appended_chars = collected.chars().count();
            profile.append(&collected);
        }

        report
    }
}
