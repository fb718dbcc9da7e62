//! Maps narration character-range callbacks back onto word groups.

use crate::grouping::GroupLayout;
use crate::tokenizer::WordSpan;
use tracing::trace;

/// Selected and spoken group state for the open document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PositionTracker {
    pub selected_group: Option<usize>,
    pub spoken_group: Option<usize>,
}

impl PositionTracker {
    pub fn clear(&mut self) {
        self.selected_group = None;
        self.spoken_group = None;
    }

    /// Apply a range event. Unresolvable offsets leave the spoken group as
    /// it was; returns the group only when it changed.
    pub fn apply_range(
        &mut self,
        location: usize,
        substring_start: usize,
        spans: &[WordSpan],
        layout: &GroupLayout,
    ) -> Option<usize> {
        let Some(group_idx) = resolve(location, substring_start, spans, layout) else {
            trace!(location, substring_start, "Range offset outside any word");
            return None;
        };
        if self.spoken_group == Some(group_idx) {
            return None;
        }
        self.spoken_group = Some(group_idx);
        Some(group_idx)
    }
}

/// Resolve an engine offset relative to `substring_start` to a group index.
///
/// Spans are sorted and disjoint, so the binary search lands on the same
/// span a first-match scan would.
pub fn resolve(
    location: usize,
    substring_start: usize,
    spans: &[WordSpan],
    layout: &GroupLayout,
) -> Option<usize> {
    let idx = location.checked_add(substring_start)?;
    let candidate = spans.partition_point(|span| span.start <= idx).checked_sub(1)?;
    if !spans[candidate].contains(idx) {
        return None;
    }
    layout.group_of_span(candidate)
}

/// First-match linear scan over spans then groups.
pub fn resolve_linear(
    location: usize,
    substring_start: usize,
    spans: &[WordSpan],
    layout: &GroupLayout,
) -> Option<usize> {
    let idx = location.checked_add(substring_start)?;
    let span_idx = spans.iter().position(|span| span.contains(idx))?;
    layout
        .groups()
        .iter()
        .position(|group| group.span_indices().contains(&span_idx))
}

/// Target group for a tap at `fraction` along the progress indicator.
pub fn fraction_to_group(fraction: f64, group_count: usize) -> Option<usize> {
    if group_count == 0 {
        return None;
    }
    let fraction = if fraction.is_nan() { 0.0 } else { fraction };
    let raw = (fraction * group_count as f64).floor();
    let max = (group_count - 1) as f64;
    Some(raw.clamp(0.0, max) as usize)
}
