//! Document offsets derived by traversal.
//!
//! Every block contributes an opening and a closing unit, and so does its
//! inline content node. Text counts one unit per `char`; hard breaks and
//! reference atoms count one unit. Citation spans add no units of their own:
//! like a mark, a span only covers its children, so two spans with nothing
//! between them touch (`a.end == b.start`).

use crate::error::EditError;
use crate::model::{Block, CitationChild, Document, InlineContent, InlineRun, NodePath};

impl CitationChild {
    pub fn size(&self) -> usize {
        match self {
            CitationChild::ReferenceRef { .. } => 1,
            CitationChild::Text { content } => content.chars().count(),
        }
    }
}

impl InlineRun {
    pub fn size(&self) -> usize {
        match self {
            InlineRun::Text { content, .. } => content.chars().count(),
            InlineRun::HardBreak => 1,
            InlineRun::CitationSpan { children } => children.iter().map(CitationChild::size).sum(),
        }
    }
}

impl InlineContent {
    /// Units between the opening and closing tokens.
    pub fn content_size(&self) -> usize {
        self.runs().iter().map(InlineRun::size).sum()
    }

    pub fn node_size(&self) -> usize {
        self.content_size() + 2
    }
}

impl Block {
    pub fn node_size(&self) -> usize {
        2 + self.inline.node_size() + self.children.iter().map(Block::node_size).sum::<usize>()
    }
}

/// An offset located inside one block's inline content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOffset {
    pub path: NodePath,
    /// Document offset of the first inline unit.
    pub content_start: usize,
    /// Offset relative to `content_start`.
    pub local: usize,
}

/// Visitor callback for [`Document::walk_inline`]: block path, its inline
/// content and the offset where that content starts.
pub(crate) type InlineVisitor<'a, 'b> = dyn FnMut(&NodePath, &'a InlineContent, usize) -> bool + 'b;

impl Document {
    pub fn content_size(&self) -> usize {
        self.blocks().iter().map(Block::node_size).sum()
    }

    /// Visit every inline content node in document order. The visitor
    /// returns `false` to stop early.
    pub(crate) fn walk_inline<'a>(&'a self, visit: &mut InlineVisitor<'a, '_>) {
        let mut pos = 0;
        for (index, block) in self.blocks().iter().enumerate() {
            if !walk_block(block, NodePath::block(&[index]), pos, visit) {
                return;
            }
            pos += block.node_size();
        }
    }

    /// Locate the inline content an offset points into.
    pub fn resolve(&self, offset: usize) -> Result<ResolvedOffset, EditError> {
        let mut found = None;
        self.walk_inline(&mut |path, inline, start| {
            let end = start + inline.content_size();
            if (start..=end).contains(&offset) {
                found = Some(ResolvedOffset {
                    path: path.clone(),
                    content_start: start,
                    local: offset - start,
                });
                return false;
            }
            start <= offset
        });
        found.ok_or(EditError::OffsetNotInline(offset))
    }

    /// Document offset where the inline content of `path` starts.
    pub fn content_start(&self, path: &NodePath) -> Option<usize> {
        let mut found = None;
        self.walk_inline(&mut |candidate, _, start| {
            if candidate == path {
                found = Some(start);
                return false;
            }
            true
        });
        found
    }
}

fn walk_block<'a>(
    block: &'a Block,
    path: NodePath,
    pos: usize,
    visit: &mut InlineVisitor<'a, '_>,
) -> bool {
    let content_start = pos + 2;
    if !visit(&path, &block.inline, content_start) {
        return false;
    }
    let mut child_pos = pos + 1 + block.inline.node_size();
    for (index, child) in block.children.iter().enumerate() {
        if !walk_block(child, path.child(index), child_pos, visit) {
            return false;
        }
        child_pos += child.node_size();
    }
    true
}
