//! Fixed-size word groups: the unit of highlighting, seeking and bookmarking.

use crate::tokenizer::WordSpan;
use serde::{Deserialize, Serialize};
use std::ops::Range;

pub const DEFAULT_GROUP_SIZE: usize = 8;

/// A contiguous run of word-span indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordGroup {
    pub first_span: usize,
    pub len: usize,
}

impl WordGroup {
    pub fn span_indices(&self) -> Range<usize> {
        self.first_span..self.first_span + self.len
    }
}

/// Partition `[0, span_count)` into runs of `group_size`; the last run keeps
/// the remainder.
pub fn group_spans(span_count: usize, group_size: usize) -> Vec<WordGroup> {
    let group_size = group_size.max(1);
    (0..span_count)
        .step_by(group_size)
        .map(|first_span| WordGroup {
            first_span,
            len: group_size.min(span_count - first_span),
        })
        .collect()
}

/// Groups plus the reverse span-to-group map used for callback resolution.
#[derive(Debug, Clone, Default)]
pub struct GroupLayout {
    groups: Vec<WordGroup>,
    span_to_group: Vec<usize>,
}

impl GroupLayout {
    pub fn new(span_count: usize, group_size: usize) -> Self {
        let groups = group_spans(span_count, group_size);
        let mut span_to_group = Vec::with_capacity(span_count);
        for (group_idx, group) in groups.iter().enumerate() {
            span_to_group.extend(std::iter::repeat_n(group_idx, group.len));
        }
        Self {
            groups,
            span_to_group,
        }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn groups(&self) -> &[WordGroup] {
        &self.groups
    }

    pub fn group(&self, group_idx: usize) -> Option<&WordGroup> {
        self.groups.get(group_idx)
    }

    pub fn group_of_span(&self, span_idx: usize) -> Option<usize> {
        self.span_to_group.get(span_idx).copied()
    }

    /// Byte offset at which narration of `group_idx` begins.
    pub fn group_start_offset(&self, group_idx: usize, spans: &[WordSpan]) -> Option<usize> {
        let group = self.groups.get(group_idx)?;
        spans.get(group.first_span).map(|span| span.start)
    }

    /// Byte range from the first word's start to the last word's end.
    pub fn group_text_range(&self, group_idx: usize, spans: &[WordSpan]) -> Option<Range<usize>> {
        let group = self.groups.get(group_idx)?;
        let first = spans.get(group.first_span)?;
        let last = spans.get(group.first_span + group.len - 1)?;
        Some(first.start..last.end)
    }
}
