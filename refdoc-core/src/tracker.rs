//! Citation-span tracker.
//!
//! Recomputed from scratch after every transaction. The tracker owns no
//! document state: it maps a document to its merged citation ranges and,
//! given the ranges from before the edit, decides where a `"; "` separator
//! must be inserted.

use crate::model::{CitationChild, Document, InlineRun};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Separator inserted between a citation reference and content typed after it.
pub const SEPARATOR: &str = "; ";

/// One logical citation span after merging adjacent spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationRange {
    pub start: usize,
    pub end: usize,
    /// Whether the unit at `end - 1` is a reference.
    pub ends_with_reference: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerState {
    pub ranges: Vec<CitationRange>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeparatorInsertion {
    pub offset: usize,
    pub text: String,
}

impl SeparatorInsertion {
    fn at(offset: usize) -> Self {
        Self {
            offset,
            text: SEPARATOR.to_string(),
        }
    }
}

/// Result of one recompute: the new ranges plus separators to apply in the
/// same transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackerUpdate {
    pub state: TrackerState,
    pub separator_insertions: Vec<SeparatorInsertion>,
}

/// Ephemeral display markers, never written to the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Decoration {
    OpenBracket { at: usize },
    CloseBracket { at: usize },
    SeparatorPreview { at: usize },
}

impl Decoration {
    pub fn at(&self) -> usize {
        match self {
            Decoration::OpenBracket { at }
            | Decoration::CloseBracket { at }
            | Decoration::SeparatorPreview { at } => *at,
        }
    }

    /// Text shown for this marker.
    pub fn label(&self) -> &'static str {
        match self {
            Decoration::OpenBracket { .. } => "[",
            Decoration::CloseBracket { .. } => "]",
            Decoration::SeparatorPreview { .. } => SEPARATOR,
        }
    }
}

impl TrackerState {
    /// Collect merged citation ranges in document order.
    pub fn from_document(doc: &Document) -> Self {
        let mut ranges: Vec<CitationRange> = Vec::new();
        doc.walk_inline(&mut |path, inline, content_start| {
            let mut pos = content_start;
            for (index, run) in inline.runs().iter().enumerate() {
                let size = run.size();
                if let InlineRun::CitationSpan { children } = run {
                    if size == 0 {
                        debug!(path = %path.with_run(index), "skipping empty citation span");
                        continue;
                    }
                    // zero-width text children occupy no unit
                    let last_unit = children.iter().rev().find(|child| child.size() > 0);
                    let range = CitationRange {
                        start: pos,
                        end: pos + size,
                        ends_with_reference: matches!(
                            last_unit,
                            Some(CitationChild::ReferenceRef { .. })
                        ),
                    };
                    match ranges.last_mut() {
                        Some(last) if last.end == range.start => {
                            last.end = range.end;
                            last.ends_with_reference = range.ends_with_reference;
                        }
                        _ => ranges.push(range),
                    }
                }
                pos += size;
            }
            true
        });
        Self { ranges }
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Bracket markers for every range, plus a separator preview where the
    /// cursor sits right after a trailing reference.
    pub fn decorations(&self, cursor: Option<usize>) -> Vec<Decoration> {
        let mut decorations = Vec::with_capacity(self.ranges.len() * 2);
        for range in &self.ranges {
            decorations.push(Decoration::OpenBracket { at: range.start });
            if cursor == Some(range.end) && range.ends_with_reference {
                decorations.push(Decoration::SeparatorPreview { at: range.end });
            }
            decorations.push(Decoration::CloseBracket { at: range.end });
        }
        decorations
    }
}

/// Recompute ranges for `doc` and compare against `old`.
///
/// Separators are only proposed when the number of ranges is unchanged, a
/// range kept its start and grew, and the old range ended with a reference.
/// A range that shrank back to a reference is left alone, so this fires on
/// growth only rather than on every change of `end`.
pub fn recompute(old: Option<&TrackerState>, doc: &Document) -> TrackerUpdate {
    let state = TrackerState::from_document(doc);
    let mut separator_insertions = Vec::new();

    if let Some(old) = old {
        if old.ranges.len() == state.ranges.len() {
            for (before, after) in old.ranges.iter().zip(&state.ranges) {
                if before.start == after.start
                    && after.end > before.end
                    && before.ends_with_reference
                {
                    debug!(offset = before.end, "inserting citation separator");
                    separator_insertions.push(SeparatorInsertion::at(before.end));
                }
            }
        } else {
            debug!(
                old = old.ranges.len(),
                new = state.ranges.len(),
                "range count changed, deferring separators"
            );
        }
    }

    TrackerUpdate {
        state,
        separator_insertions,
    }
}
