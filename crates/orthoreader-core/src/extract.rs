//! Document text extraction.
//!
//! PDFs go through `pdf-extract`; plain text samples are read as-is. Either
//! way the result is NFC-normalized so offsets handed to the narration engine
//! line up with what the tokenizer saw.

use crate::error::{ReaderError, ReaderResult};
use std::fs;
use std::path::Path;
use tracing::{debug, info};
use unicode_normalization::UnicodeNormalization;

/// `extract(docRef) -> text | error`.
pub trait TextExtractor {
    fn extract(&self, path: &Path) -> ReaderResult<String>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, path: &Path) -> ReaderResult<String> {
        info!(path = %path.display(), "Extracting PDF text");
        let bytes = fs::read(path).map_err(|source| ReaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let raw = pdf_extract::extract_text_from_mem(&bytes).map_err(|err| {
            ReaderError::Extraction {
                path: path.to_path_buf(),
                message: err.to_string(),
            }
        })?;
        finish(path, &join_pages(&raw))
    }
}

/// Bundled `.txt` samples.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, path: &Path) -> ReaderResult<String> {
        info!(path = %path.display(), "Loading plain text content");
        let data = fs::read_to_string(path).map_err(|source| ReaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        finish(path, &data)
    }
}

/// Picks an extractor by file extension.
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoExtractor;

impl TextExtractor for AutoExtractor {
    fn extract(&self, path: &Path) -> ReaderResult<String> {
        let is_text = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"));
        if is_text {
            PlainTextExtractor.extract(path)
        } else {
            PdfTextExtractor.extract(path)
        }
    }
}

/// `pdf-extract` separates pages with form feeds; keep one newline between
/// pages and drop trailing whitespace inside each.
pub fn join_pages(raw: &str) -> String {
    raw.split('\x0C')
        .map(str::trim_end)
        .filter(|page| !page.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn finish(path: &Path, text: &str) -> ReaderResult<String> {
    let normalized: String = text.nfc().collect();
    if normalized.trim().is_empty() {
        return Err(ReaderError::EmptyDocument {
            path: path.to_path_buf(),
        });
    }
    debug!(
        path = %path.display(),
        chars = normalized.chars().count(),
        "Extracted document text"
    );
    Ok(normalized)
}
