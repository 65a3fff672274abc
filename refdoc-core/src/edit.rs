//! Edit operations addressed by document offset or block path.

use crate::error::EditError;
use crate::model::{Block, Document, InlineRun, Mark, NodePath};
use serde::{Deserialize, Serialize};

/// A single document mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Edit {
    /// Type text at an offset
    InsertText { at: usize, text: String },

    /// Insert a reference atom at an offset
    InsertReference { at: usize, reference_id: String },

    /// Delete `from..to`, which must stay inside one inline content
    Delete { from: usize, to: usize },

    /// Flip a mark over `from..to`
    ToggleMark { from: usize, to: usize, mark: Mark },

    /// Insert a run into a block's inline content
    InsertRun {
        block: Vec<usize>,
        index: usize,
        run: InlineRun,
    },

    RemoveRun { block: Vec<usize>, index: usize },

    /// Insert a block under `parent` (empty for top level)
    InsertBlock {
        #[serde(default)]
        parent: Vec<usize>,
        index: usize,
        block: Block,
    },

    RemoveBlock { path: Vec<usize> },
}

/// Edits applied atomically, with the cursor position afterwards
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub edits: Vec<Edit>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<usize>,
}

impl Transaction {
    pub fn new(edits: Vec<Edit>) -> Self {
        Self {
            edits,
            cursor: None,
        }
    }

    pub fn with_cursor(mut self, cursor: usize) -> Self {
        self.cursor = Some(cursor);
        self
    }

    /// Type `text` at `at`, leaving the cursor after it.
    pub fn typing(at: usize, text: &str) -> Self {
        Self::new(vec![Edit::InsertText {
            at,
            text: text.to_string(),
        }])
        .with_cursor(at + text.chars().count())
    }
}

impl Document {
    /// Insert text at a document offset. The text inherits the citation
    /// span or marks of the unit before the offset.
    pub fn insert_text(&mut self, at: usize, text: &str) -> Result<(), EditError> {
        let resolved = self.resolve(at)?;
        self.block_mut(&resolved.path)?
            .inline
            .insert_text(resolved.local, text)
    }

    pub fn insert_reference(&mut self, at: usize, reference_id: &str) -> Result<(), EditError> {
        let resolved = self.resolve(at)?;
        self.block_mut(&resolved.path)?
            .inline
            .insert_reference(resolved.local, reference_id)
    }

    pub fn delete(&mut self, from: usize, to: usize) -> Result<(), EditError> {
        let (path, range) = self.resolve_range(from, to)?;
        self.block_mut(&path)?.inline.delete(range)
    }

    pub fn toggle_mark_at(&mut self, from: usize, to: usize, mark: Mark) -> Result<(), EditError> {
        let (path, range) = self.resolve_range(from, to)?;
        self.toggle_mark(&path, range, mark)
    }

    fn resolve_range(
        &self,
        from: usize,
        to: usize,
    ) -> Result<(NodePath, std::ops::Range<usize>), EditError> {
        if from > to {
            return Err(EditError::InvalidRange { from, to });
        }
        let start = self.resolve(from)?;
        let end = self.resolve(to)?;
        if start.path != end.path {
            return Err(EditError::CrossesBlocks { from, to });
        }
        Ok((start.path, start.local..end.local))
    }

    pub fn apply_edit(&mut self, edit: Edit) -> Result<(), EditError> {
        match edit {
            Edit::InsertText { at, text } => self.insert_text(at, &text),
            Edit::InsertReference { at, reference_id } => self.insert_reference(at, &reference_id),
            Edit::Delete { from, to } => self.delete(from, to),
            Edit::ToggleMark { from, to, mark } => self.toggle_mark_at(from, to, mark),
            Edit::InsertRun { block, index, run } => {
                self.insert_run(&NodePath::block(&block), index, run)
            }
            Edit::RemoveRun { block, index } => {
                self.remove_run(&NodePath::block(&block), index).map(|_| ())
            }
            Edit::InsertBlock {
                parent,
                index,
                block,
            } => self.insert_block(&NodePath::block(&parent), index, block),
            Edit::RemoveBlock { path } => self.remove_block(&NodePath::block(&path)).map(|_| ()),
        }
    }
}
