//! Offset-addressed editing inside one inline content node.
//!
//! Runs are flattened into one unit per offset, edited, and rebuilt. Every
//! unit remembers which citation span it came from, so rebuilding regroups
//! spans exactly as they were: two adjacent spans are never fused, and a span
//! whose last unit was deleted disappears.

use crate::error::EditError;
use crate::model::{CitationChild, InlineContent, InlineRun, Mark, MarkSet};
use std::ops::Range;

#[derive(Debug, Clone, PartialEq)]
enum Unit {
    Char {
        ch: char,
        marks: MarkSet,
        span: Option<usize>,
    },
    HardBreak,
    Reference {
        id: String,
        span: usize,
    },
}

impl Unit {
    fn span(&self) -> Option<usize> {
        match self {
            Unit::Char { span, .. } => *span,
            Unit::HardBreak => None,
            Unit::Reference { span, .. } => Some(*span),
        }
    }
}

struct Units {
    units: Vec<Unit>,
    next_span: usize,
}

impl Units {
    fn flatten(runs: &[InlineRun]) -> Self {
        let mut units = Vec::new();
        for (index, run) in runs.iter().enumerate() {
            match run {
                InlineRun::Text { content, marks } => {
                    units.extend(content.chars().map(|ch| Unit::Char {
                        ch,
                        marks: marks.clone(),
                        span: None,
                    }));
                }
                InlineRun::HardBreak => units.push(Unit::HardBreak),
                InlineRun::CitationSpan { children } => {
                    for child in children {
                        match child {
                            CitationChild::ReferenceRef { reference_id } => {
                                units.push(Unit::Reference {
                                    id: reference_id.clone(),
                                    span: index,
                                })
                            }
                            CitationChild::Text { content } => {
                                units.extend(content.chars().map(|ch| Unit::Char {
                                    ch,
                                    marks: MarkSet::new(),
                                    span: Some(index),
                                }))
                            }
                        }
                    }
                }
            }
        }
        Self {
            units,
            next_span: runs.len(),
        }
    }

    fn check(&self, range: &Range<usize>) -> Result<(), EditError> {
        if range.start > range.end || range.end > self.units.len() {
            return Err(EditError::InvalidRange {
                from: range.start,
                to: range.end,
            });
        }
        Ok(())
    }

    fn before(&self, local: usize) -> Option<&Unit> {
        local.checked_sub(1).and_then(|i| self.units.get(i))
    }

    fn rebuild(self) -> Vec<InlineRun> {
        let mut runs: Vec<InlineRun> = Vec::new();
        let mut last_span: Option<usize> = None;

        for unit in self.units {
            match unit {
                Unit::Char {
                    ch,
                    marks,
                    span: None,
                } => {
                    let extended = match runs.last_mut() {
                        Some(InlineRun::Text {
                            content,
                            marks: last_marks,
                        }) if *last_marks == marks => {
                            content.push(ch);
                            true
                        }
                        _ => false,
                    };
                    if !extended {
                        runs.push(InlineRun::Text {
                            content: ch.to_string(),
                            marks,
                        });
                    }
                    last_span = None;
                }
                Unit::HardBreak => {
                    runs.push(InlineRun::HardBreak);
                    last_span = None;
                }
                Unit::Char {
                    ch,
                    span: Some(span),
                    ..
                } => {
                    let children = span_children(&mut runs, &mut last_span, span);
                    match children.last_mut() {
                        Some(CitationChild::Text { content }) => content.push(ch),
                        _ => children.push(CitationChild::text(ch.to_string())),
                    }
                }
                Unit::Reference { id, span } => {
                    let children = span_children(&mut runs, &mut last_span, span);
                    children.push(CitationChild::reference(id));
                }
            }
        }
        runs
    }
}

/// Children of the span `span`, opening a new span run unless the last run
/// already is that span.
fn span_children<'a>(
    runs: &'a mut Vec<InlineRun>,
    last_span: &mut Option<usize>,
    span: usize,
) -> &'a mut Vec<CitationChild> {
    if *last_span != Some(span) {
        runs.push(InlineRun::CitationSpan {
            children: Vec::new(),
        });
        *last_span = Some(span);
    }
    match runs.last_mut() {
        Some(InlineRun::CitationSpan { children }) => children,
        _ => unreachable!("span run was just ensured"),
    }
}

impl InlineContent {
    /// Insert text at a local offset.
    ///
    /// The text inherits from the unit before the offset: it joins that
    /// unit's citation span, or takes its marks. With nothing usable before
    /// it, the text takes the marks of the plain text that follows and never
    /// enters a following span.
    pub fn insert_text(&mut self, local: usize, text: &str) -> Result<(), EditError> {
        let mut units = Units::flatten(self.runs());
        units.check(&(local..local))?;

        let (marks, span) = match units.before(local) {
            Some(Unit::Char { marks, span, .. }) => (marks.clone(), *span),
            Some(Unit::Reference { span, .. }) => (MarkSet::new(), Some(*span)),
            Some(Unit::HardBreak) | None => match units.units.get(local) {
                Some(Unit::Char {
                    marks, span: None, ..
                }) => (marks.clone(), None),
                _ => (MarkSet::new(), None),
            },
        };
        let marks = if span.is_some() { MarkSet::new() } else { marks };

        let inserted = text.chars().map(|ch| Unit::Char {
            ch,
            marks: marks.clone(),
            span,
        });
        units.units.splice(local..local, inserted);
        *self.runs_mut() = units.rebuild();
        Ok(())
    }

    /// Insert a reference at a local offset, extending the citation span
    /// before the offset or opening a new one.
    pub fn insert_reference(&mut self, local: usize, reference_id: &str) -> Result<(), EditError> {
        let mut units = Units::flatten(self.runs());
        units.check(&(local..local))?;

        let span = match units.before(local).and_then(Unit::span) {
            Some(span) => span,
            None => {
                let fresh = units.next_span;
                units.next_span += 1;
                fresh
            }
        };
        units.units.insert(
            local,
            Unit::Reference {
                id: reference_id.to_string(),
                span,
            },
        );
        *self.runs_mut() = units.rebuild();
        Ok(())
    }

    /// Delete a local range. Spans emptied by the deletion are removed.
    pub fn delete(&mut self, range: Range<usize>) -> Result<(), EditError> {
        let mut units = Units::flatten(self.runs());
        units.check(&range)?;
        units.units.drain(range);
        *self.runs_mut() = units.rebuild();
        Ok(())
    }

    /// Flip `mark` on every plain text unit in range. Citation children carry
    /// no marks and are left alone.
    pub fn toggle_mark(&mut self, range: Range<usize>, mark: Mark) -> Result<(), EditError> {
        let mut units = Units::flatten(self.runs());
        units.check(&range)?;
        for unit in &mut units.units[range] {
            if let Unit::Char {
                marks, span: None, ..
            } = unit
            {
                marks.toggle(mark);
            }
        }
        *self.runs_mut() = units.rebuild();
        Ok(())
    }

    /// Merge adjacent text runs with equal marks and drop empty ones.
    pub fn normalize(&mut self) {
        let units = Units::flatten(self.runs());
        *self.runs_mut() = units.rebuild();
    }
}
