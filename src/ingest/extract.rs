use anyhow::{anyhow, bail, Context, Result};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::io::{Cursor, Read};

pub fn plain_text(bytes: &[u8]) -> Result<String> {
    let text = std::str::from_utf8(bytes).context("file is not valid UTF-8 text")?;
    Ok(format!("{}\n", text))
}

pub fn csv_table(bytes: &[u8]) -> Result<String> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .context("failed to read CSV header")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.context("failed to read CSV row")?;
        rows.push(record.iter().map(|c| c.trim().to_string()).collect());
    }

    Ok(format!("{}\n", render_table(&headers, &rows)))
}

/// Every sheet of a workbook, first non-empty row as header.
pub fn spreadsheet_table(bytes: &[u8]) -> Result<String> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .context("failed to open workbook")?;

    let sheet_names = workbook.sheet_names().to_vec();
    if sheet_names.is_empty() {
        bail!("workbook has no sheets");
    }

    let mut out = String::new();
    for sheet_name in &sheet_names {
        let range = match workbook.worksheet_range(sheet_name) {
            Ok(range) => range,
            Err(e) => {
                tracing::warn!(sheet = %sheet_name, error = %e, "skipping unreadable sheet");
                continue;
            }
        };

        let mut rows = range
            .rows()
            .map(|row| row.iter().map(cell_to_string).collect::<Vec<_>>())
            .filter(|cells| cells.iter().any(|c| !c.is_empty()));
        let Some(headers) = rows.next() else {
            continue;
        };
        let body: Vec<Vec<String>> = rows.collect();

        if sheet_names.len() > 1 {
            out.push_str(&format!("--- Sheet: {} ---\n", sheet_name));
        }
        out.push_str(&render_table(&headers, &body));
        out.push('\n');
    }

    if out.trim().is_empty() {
        bail!("workbook contains no data");
    }
    Ok(out)
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            // 1500.0 reads better as 1500
            if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::Error(e) => format!("#ERR:{:?}", e),
        Data::DateTime(dt) => dt.to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}

/// Right-aligned columns with a leading row index, two spaces apart.
pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let columns = rows
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(headers.len()))
        .max()
        .unwrap_or(0);

    let index_width = rows.len().saturating_sub(1).to_string().len();
    let cell = |row: &[String], col: usize| row.get(col).map(String::as_str).unwrap_or("").to_string();

    let mut widths: Vec<usize> = (0..columns)
        .map(|col| cell(headers, col).chars().count())
        .collect();
    for row in rows {
        for (col, width) in widths.iter_mut().enumerate() {
            *width = (*width).max(cell(row, col).chars().count());
        }
    }

    let render_line = |index: &str, row: &[String]| {
        let mut line = format!("{:>width$}", index, width = index_width);
        for (col, width) in widths.iter().enumerate() {
            line.push_str(&format!("  {:>width$}", cell(row, col), width = *width));
        }
        line.trim_end().to_string()
    };

    let mut lines = vec![render_line("", headers)];
    for (i, row) in rows.iter().enumerate() {
        lines.push(render_line(&i.to_string(), row));
    }
    lines.join("\n")
}

pub fn docx_text(bytes: &[u8]) -> Result<String> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).context("file is not a valid DOCX archive")?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .context("DOCX missing word/document.xml")?
        .read_to_string(&mut xml)
        .context("failed to read document.xml")?;

    Ok(docx_paragraphs(&xml)
        .into_iter()
        .map(|p| format!("{}\n", p))
        .collect())
}

/// Text of each `<w:p>` paragraph, empty paragraphs included.
pub fn docx_paragraphs(xml: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut rest = xml;

    while let Some(start) = find_tag(rest, "w:p") {
        let after = &rest[start..];
        let Some(open_end) = after.find('>') else {
            break;
        };

        if after[..open_end].ends_with('/') {
            paragraphs.push(String::new());
            rest = &after[open_end + 1..];
            continue;
        }

        let body_end = after.find("</w:p>").unwrap_or(after.len());
        paragraphs.push(run_text(&without_properties(&after[open_end + 1..body_end])));
        rest = &after[(body_end + "</w:p>".len()).min(after.len())..];
    }

    paragraphs
}

/// Drops the `<w:pPr>` block, whose `<w:tabs>` stop definitions use the
/// same `<w:tab>` element as tab characters in runs.
fn without_properties(paragraph: &str) -> String {
    let Some(start) = find_tag(paragraph, "w:pPr") else {
        return paragraph.to_string();
    };
    let after = &paragraph[start..];
    let Some(open_end) = after.find('>') else {
        return paragraph.to_string();
    };

    let rest = if after[..open_end].ends_with('/') {
        &after[open_end + 1..]
    } else {
        match after.find("</w:pPr>") {
            Some(end) => &after[end + "</w:pPr>".len()..],
            None => "",
        }
    };
    format!("{}{}", &paragraph[..start], rest)
}

fn run_text(paragraph: &str) -> String {
    let mut text = String::new();
    let mut rest = paragraph;

    loop {
        let next = [find_tag(rest, "w:t"), find_tag(rest, "w:tab")]
            .into_iter()
            .flatten()
            .min();
        let Some(start) = next else {
            break;
        };
        let after = &rest[start..];
        let Some(open_end) = after.find('>') else {
            break;
        };
        let tag = &after[..open_end];

        if tag.starts_with("<w:tab") {
            text.push('\t');
            rest = &after[open_end + 1..];
            continue;
        }
        if tag.ends_with('/') {
            rest = &after[open_end + 1..];
            continue;
        }

        let content = &after[open_end + 1..];
        let close = content.find("</w:t>").unwrap_or(content.len());
        text.push_str(&decode_entities(&content[..close]));
        rest = &content[(close + "</w:t>".len()).min(content.len())..];
    }

    text
}

/// Offset of the next `<name>` or `<name ...>` tag, not matching longer
/// names such as `<w:pPr>`.
fn find_tag(haystack: &str, name: &str) -> Option<usize> {
    let needle = format!("<{}", name);
    let mut offset = 0;
    while let Some(pos) = haystack[offset..].find(&needle) {
        let abs = offset + pos;
        match haystack[abs + needle.len()..].chars().next() {
            Some('>') | Some(' ') | Some('/') => return Some(abs),
            _ => offset = abs + needle.len(),
        }
    }
    None
}

fn decode_entities(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Text of every page, each followed by a newline.
pub fn pdf_text(bytes: &[u8]) -> Result<String> {
    let document = lopdf::Document::load_mem(bytes).map_err(|e| anyhow!("failed to parse PDF: {}", e))?;

    let mut out = String::new();
    for page_number in document.get_pages().keys() {
        match document.extract_text(&[*page_number]) {
            Ok(text) => out.push_str(text.trim_end()),
            Err(e) => tracing::warn!(page = page_number, error = %e, "no text extracted from PDF page"),
        }
        out.push('\n');
    }
    Ok(out)
}
