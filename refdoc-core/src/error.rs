//! Error taxonomy for the document model, edits and export.

use crate::model::NodePath;
use thiserror::Error;

/// Malformed tree shape. Never recovered from locally: exporting a document
/// that fails with this error would silently drop content.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuralError {
    #[error("Heading level {level} at {path} is outside 1..=6")]
    InvalidHeadingLevel { path: NodePath, level: u8 },

    #[error("Citation span at {path} has no children")]
    EmptyCitationSpan { path: NodePath },

    #[error("First block at {path} is not a title heading")]
    MissingTitle { path: NodePath },
}

impl StructuralError {
    /// Path of the offending node.
    pub fn path(&self) -> &NodePath {
        match self {
            StructuralError::InvalidHeadingLevel { path, .. } => path,
            StructuralError::EmptyCitationSpan { path } => path,
            StructuralError::MissingTitle { path } => path,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("No block at {0}")]
    InvalidPath(NodePath),

    #[error("Index {index} out of bounds at {path} (len {len})")]
    IndexOutOfBounds {
        path: NodePath,
        index: usize,
        len: usize,
    },

    #[error("Offset {0} does not point into inline content")]
    OffsetNotInline(usize),

    #[error("Range {from}..{to} spans more than one block")]
    CrossesBlocks { from: usize, to: usize },

    #[error("Invalid range {from}..{to}")]
    InvalidRange { from: usize, to: usize },

    #[error("The title block cannot be removed or moved from the top")]
    TitleLocked,

    #[error(transparent)]
    Structural(#[from] StructuralError),
}
