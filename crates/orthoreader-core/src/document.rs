//! The in-memory document being narrated.

use crate::bookmark::DocumentKey;
use crate::grouping::GroupLayout;
use crate::tokenizer::{TextLimits, TokenizedText, WordSpan, tokenize};
use std::ops::Range;
use std::path::Path;

/// Immutable once built; a new load replaces it wholesale.
#[derive(Debug, Clone)]
pub struct Document {
    pub key: DocumentKey,
    pub title: String,
    pub author: String,
    tokens: TokenizedText,
    layout: GroupLayout,
}

impl Document {
    pub fn new(
        key: DocumentKey,
        title: impl Into<String>,
        author: impl Into<String>,
        text: &str,
        limits: TextLimits,
        group_size: usize,
    ) -> Self {
        let tokens = tokenize(text, limits);
        let layout = GroupLayout::new(tokens.spans.len(), group_size);
        Self {
            key,
            title: title.into(),
            author: author.into(),
            tokens,
            layout,
        }
    }

    /// Title from the file stem, author from the parent directory name
    /// (the library keeps `<Author>/<Title>.pdf`).
    pub fn from_path(path: &Path, text: &str, limits: TextLimits, group_size: usize) -> Self {
        let title = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("Untitled");
        let author = path
            .parent()
            .and_then(|parent| parent.file_name())
            .and_then(|name| name.to_str())
            .unwrap_or("");
        Self::new(
            DocumentKey::from_path(path),
            title,
            author,
            text,
            limits,
            group_size,
        )
    }

    pub fn text(&self) -> &str {
        &self.tokens.text
    }

    pub fn spans(&self) -> &[WordSpan] {
        &self.tokens.spans
    }

    pub fn layout(&self) -> &GroupLayout {
        &self.layout
    }

    pub fn group_count(&self) -> usize {
        self.layout.len()
    }

    pub fn truncated(&self) -> bool {
        self.tokens.truncated
    }

    pub fn group_start_offset(&self, group_idx: usize) -> Option<usize> {
        self.layout.group_start_offset(group_idx, &self.tokens.spans)
    }

    pub fn group_text_range(&self, group_idx: usize) -> Option<Range<usize>> {
        self.layout.group_text_range(group_idx, &self.tokens.spans)
    }

    pub fn group_text(&self, group_idx: usize) -> Option<&str> {
        let range = self.group_text_range(group_idx)?;
        self.tokens.text.get(range)
    }

    /// Text from `offset` to the end, as submitted to the engine.
    pub fn suffix_from(&self, offset: usize) -> &str {
        self.tokens.text.get(offset..).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_and_author_come_from_library_layout() {
        let doc = Document::from_path(
            Path::new("LibraryPDFs/Augustine/Confessions.pdf"),
            "In the beginning",
            TextLimits::default(),
            8,
        );
        assert_eq!(doc.title, "Confessions");
        assert_eq!(doc.author, "Augustine");
        assert_eq!(doc.key.as_str(), "Confessions.pdf");
        assert_eq!(doc.group_count(), 1);
    }

    #[test]
    fn suffix_starts_at_group_offset() {
        let doc = Document::new(
            DocumentKey::from_path(Path::new("greek.pdf")),
            "Greek",
            "",
            "alpha beta gamma delta epsilon zeta eta theta iota kappa",
            TextLimits::default(),
            8,
        );
        let offset = doc.group_start_offset(1).unwrap();
        assert_eq!(doc.suffix_from(offset), "iota kappa");
        assert_eq!(doc.group_text(1), Some("iota kappa"));
        assert_eq!(doc.group_start_offset(2), None);
        assert_eq!(doc.suffix_from(10_000), "");
    }
}
