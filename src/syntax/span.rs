//! Tagged spans
//!
//! The tagger produces a tree of [`Span`]s. Hosts that only need "which
//! category is this byte" can [`flatten`] the tree into [`Segment`]s.

use std::ops::Range;

use super::rules::{CategoryId, RuleId};

/// A tagged range of the buffer with its nested spans
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    /// Byte offset where this span starts (inclusive)
    pub start: usize,
    /// Byte offset where this span ends (exclusive)
    pub end: usize,
    /// Rule that produced this span
    pub rule: RuleId,
    /// Category applied where no child covers the text
    pub category: CategoryId,
    /// Nested spans, ordered and non-overlapping
    pub children: Vec<Span>,
}

impl Span {
    /// Create a span with no children
    pub fn new(start: usize, end: usize, rule: RuleId, category: CategoryId) -> Self {
        Self {
            start,
            end,
            rule,
            category,
            children: Vec::new(),
        }
    }

    /// Check if this span contains a byte position
    pub fn contains(&self, pos: usize) -> bool {
        pos >= self.start && pos < self.end
    }

    /// Get the length of this span in bytes
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Check if span is empty
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Innermost category at a byte position
    pub fn category_at(&self, pos: usize) -> Option<CategoryId> {
        if !self.contains(pos) {
            return None;
        }
        let mut span = self;
        while let Some(child) = span.children.iter().find(|c| c.contains(pos)) {
            span = child;
        }
        Some(span.category)
    }

    /// Depth-first walk: calls `f(span, depth)` for this span and every descendant
    pub fn walk<'s, F: FnMut(&'s Span, usize)>(&'s self, mut f: F) {
        let mut stack = vec![(self, 0)];
        while let Some((span, depth)) = stack.pop() {
            f(span, depth);
            for child in span.children.iter().rev() {
                stack.push((child, depth + 1));
            }
        }
    }
}

impl Drop for Span {
    // Unlinks descendants onto a worklist so deep trees drop without recursion
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut span) = pending.pop() {
            pending.append(&mut span.children);
        }
    }
}

/// A flat, non-overlapping piece of the buffer with its innermost category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub start: usize,
    pub end: usize,
    /// `None` for untagged text
    pub category: Option<CategoryId>,
}

impl Segment {
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Flatten a span tree into segments that exactly tile `range`
///
/// Untagged gaps get `None`. Adjacent segments with the same category
/// are merged.
pub fn flatten(spans: &[Span], range: Range<usize>) -> Vec<Segment> {
    let mut out = Vec::new();
    if range.start >= range.end {
        return out;
    }

    let mut push = |start: usize, end: usize, category: Option<CategoryId>| {
        let start = start.max(range.start);
        let end = end.min(range.end);
        if start >= end {
            return;
        }
        match out.last_mut() {
            Some(Segment { end: last_end, category: last, .. })
                if *last_end == start && *last == category =>
            {
                *last_end = end;
            }
            _ => out.push(Segment { start, end, category }),
        }
    };

    // Each frame: (children to paint, index of next child, category, cursor, end)
    let mut stack: Vec<(&[Span], usize, Option<CategoryId>, usize, usize)> =
        vec![(spans, 0, None, range.start, range.end)];

    while let Some(frame) = stack.last_mut() {
        let (children, idx, category, cursor, end) = *frame;
        match children.get(idx) {
            Some(child) if child.start < end => {
                frame.1 += 1;
                frame.3 = cursor.max(child.end);
                if child.end <= cursor {
                    continue;
                }
                push(cursor, child.start, category);
                stack.push((
                    child.children.as_slice(),
                    0,
                    Some(child.category),
                    child.start.max(cursor),
                    child.end.min(end),
                ));
            }
            _ => {
                push(cursor, end, category);
                stack.pop();
            }
        }
    }

    out
}
