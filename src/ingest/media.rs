use std::path::Path;

const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
const XLS_MIME: &str = "application/vnd.ms-excel";
const ODS_MIME: &str = "application/vnd.oasis.opendocument.spreadsheet";

/// Upload categories the ingestor knows how to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaKind {
    PlainText,
    Csv,
    /// xlsx, xls or ods workbook.
    Spreadsheet,
    /// Paragraph-based word-processing document (docx).
    WordDocument,
    Pdf,
    /// Image with its MIME type, transcribed by a multimodal model.
    Image(String),
    Unsupported(String),
}

impl MediaKind {
    /// Resolves the declared MIME type first and falls back to the file
    /// extension, since browsers and shells often declare
    /// `application/octet-stream`.
    pub fn detect(declared_type: &str, file_name: &str) -> Self {
        let mime = declared_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();

        match mime.as_str() {
            "application/pdf" => return MediaKind::Pdf,
            "text/plain" | "text/markdown" => return MediaKind::PlainText,
            "text/csv" => return MediaKind::Csv,
            DOCX_MIME => return MediaKind::WordDocument,
            XLSX_MIME | XLS_MIME | ODS_MIME => return MediaKind::Spreadsheet,
            m if m.starts_with("image/") => return MediaKind::Image(mime.clone()),
            _ => {}
        }

        let extension = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "pdf" => MediaKind::Pdf,
            "txt" | "md" => MediaKind::PlainText,
            "csv" => MediaKind::Csv,
            "docx" => MediaKind::WordDocument,
            "xlsx" | "xls" | "ods" => MediaKind::Spreadsheet,
            "png" => MediaKind::Image("image/png".to_string()),
            "jpg" | "jpeg" => MediaKind::Image("image/jpeg".to_string()),
            "gif" => MediaKind::Image("image/gif".to_string()),
            "webp" => MediaKind::Image("image/webp".to_string()),
            _ if !mime.is_empty() => MediaKind::Unsupported(mime),
            _ if !extension.is_empty() => MediaKind::Unsupported(format!(".{}", extension)),
            _ => MediaKind::Unsupported("unknown".to_string()),
        }
    }
}
