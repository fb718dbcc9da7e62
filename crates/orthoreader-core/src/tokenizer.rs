//! Word tokenization for narration alignment.
//!
//! Offsets are byte offsets into the (possibly truncated) document text, so
//! a span can be sliced straight out of the string that was handed to the
//! narration engine.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

static RE_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").unwrap());

/// Half-open byte range covering one word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordSpan {
    pub start: usize,
    pub end: usize,
}

impl WordSpan {
    pub fn contains(&self, idx: usize) -> bool {
        self.start <= idx && idx < self.end
    }
}

/// Caps applied before and during tokenization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextLimits {
    pub max_chars: usize,
    pub max_words: usize,
}

impl Default for TextLimits {
    fn default() -> Self {
        Self {
            max_chars: 100_000,
            max_words: 10_000,
        }
    }
}

/// Document text together with its word spans.
#[derive(Debug, Clone, Default)]
pub struct TokenizedText {
    pub text: String,
    pub spans: Vec<WordSpan>,
    /// Set when either cap cut the input; the caller owes the reader a warning.
    pub truncated: bool,
}

impl TokenizedText {
    pub fn word(&self, span_idx: usize) -> Option<&str> {
        let span = self.spans.get(span_idx)?;
        self.text.get(span.start..span.end)
    }
}

pub fn tokenize(text: &str, limits: TextLimits) -> TokenizedText {
    let (prefix, char_capped) = truncate_chars(text, limits.max_chars);
    if char_capped {
        warn!(
            max_chars = limits.max_chars,
            "Document text exceeds character cap; truncating"
        );
    }

    let mut spans: Vec<WordSpan> = RE_WORD
        .find_iter(prefix)
        .take(limits.max_words.saturating_add(1))
        .map(|m| WordSpan {
            start: m.start(),
            end: m.end(),
        })
        .collect();
    let word_capped = spans.len() > limits.max_words;
    if word_capped {
        spans.truncate(limits.max_words);
        warn!(
            max_words = limits.max_words,
            "Document word count exceeds cap; ignoring the remainder"
        );
    }

    debug!(
        chars = prefix.len(),
        words = spans.len(),
        "Tokenized document text"
    );
    TokenizedText {
        text: prefix.to_string(),
        spans,
        truncated: char_capped || word_capped,
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> (&str, bool) {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => (&text[..byte_idx], true),
        None => (text, false),
    }
}
