//! Editing session: one document, its tracked citation ranges and cursor.

use crate::edit::Transaction;
use crate::error::EditError;
use crate::model::Document;
use crate::tracker::{self, CitationRange, Decoration, SeparatorInsertion, TrackerState};
use tracing::debug;

/// What a committed transaction changed besides the edits themselves
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionOutcome {
    pub separator_insertions: Vec<SeparatorInsertion>,
}

#[derive(Debug, Clone, Default)]
pub struct EditSession {
    document: Document,
    tracker: TrackerState,
    cursor: Option<usize>,
}

impl EditSession {
    pub fn new(document: Document) -> Self {
        let tracker = tracker::recompute(None, &document).state;
        Self {
            document,
            tracker,
            cursor: None,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn ranges(&self) -> &[CitationRange] {
        &self.tracker.ranges
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn set_cursor(&mut self, cursor: Option<usize>) {
        self.cursor = cursor;
    }

    pub fn decorations(&self) -> Vec<Decoration> {
        self.tracker.decorations(self.cursor)
    }

    /// Apply a transaction atomically.
    ///
    /// Edits run against a working copy; tracker separators are applied to
    /// the same copy before it replaces the session document. On error the
    /// session is unchanged.
    pub fn apply(&mut self, transaction: Transaction) -> Result<TransactionOutcome, EditError> {
        let mut working = self.document.clone();
        for edit in transaction.edits {
            working.apply_edit(edit)?;
        }
        let mut cursor = transaction.cursor.or(self.cursor);

        let update = tracker::recompute(Some(&self.tracker), &working);
        let mut insertions = update.separator_insertions;
        insertions.sort_by(|a, b| b.offset.cmp(&a.offset));
        for insertion in &insertions {
            working.insert_text(insertion.offset, &insertion.text)?;
            cursor = cursor.map(|c| {
                if c >= insertion.offset {
                    c + insertion.text.chars().count()
                } else {
                    c
                }
            });
        }

        let state = if insertions.is_empty() {
            update.state
        } else {
            tracker::recompute(None, &working).state
        };

        debug!(
            ranges = state.ranges.len(),
            separators = insertions.len(),
            "transaction committed"
        );
        self.document = working;
        self.tracker = state;
        self.cursor = cursor;

        insertions.reverse();
        Ok(TransactionOutcome {
            separator_insertions: insertions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::Edit;
    use crate::model::{Block, CitationChild, InlineRun};

    fn session() -> EditSession {
        // paragraph content starts at 7: "see " then a span holding r1 at 11
        EditSession::new(Document::new(vec![
            Block::heading(1, vec![InlineRun::text("T")]),
            Block::paragraph(vec![InlineRun::text("see "), InlineRun::cite("r1")]),
        ]))
    }

    #[test]
    fn test_typing_after_reference_inserts_separator_once() {
        let mut session = session();
        assert_eq!(session.ranges().len(), 1);

        let outcome = session.apply(Transaction::typing(12, "p")).unwrap();
        assert_eq!(outcome.separator_insertions.len(), 1);
        assert_eq!(outcome.separator_insertions[0].offset, 12);
        assert_eq!(session.cursor(), Some(15));

        let outcome = session.apply(Transaction::typing(15, ". 4")).unwrap();
        assert!(outcome.separator_insertions.is_empty());

        assert_eq!(
            session.document().blocks()[1].inline.runs()[1],
            InlineRun::citation(vec![
                CitationChild::reference("r1"),
                CitationChild::text("; p. 4"),
            ])
        );
        assert_eq!(session.ranges()[0].start, 11);
        assert_eq!(session.ranges()[0].end, 18);
    }

    #[test]
    fn test_failed_transaction_leaves_session_untouched() {
        let mut session = session();
        let before = session.document().clone();
        let result = session.apply(Transaction::new(vec![
            Edit::InsertText {
                at: 12,
                text: "x".to_string(),
            },
            Edit::Delete { from: 3, to: 9 },
        ]));
        assert!(matches!(result, Err(EditError::CrossesBlocks { .. })));
        assert_eq!(session.document(), &before);
    }

    #[test]
    fn test_preview_follows_cursor() {
        let mut session = session();
        session.set_cursor(Some(12));
        assert!(session
            .decorations()
            .contains(&Decoration::SeparatorPreview { at: 12 }));
        session.set_cursor(Some(10));
        assert_eq!(session.decorations().len(), 2);
    }

    #[test]
    fn test_sessions_are_independent() {
        let mut first = session();
        let second = session();
        first
            .apply(Transaction::new(vec![Edit::RemoveRun {
                block: vec![1],
                index: 1,
            }]))
            .unwrap();
        assert!(first.ranges().is_empty());
        assert_eq!(second.ranges().len(), 1);
    }
}
