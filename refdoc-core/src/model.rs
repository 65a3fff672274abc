//! Document tree: blocks, inline content, runs and citation spans.
//!
//! The tree is strictly owned top-down. Positions are never stored on nodes;
//! they are derived by traversal (see [`crate::position`]).

use crate::error::{EditError, StructuralError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Inline formatting mark
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mark {
    Bold,
    Italic,
    Strike,
}

/// Set of marks applied to a text run
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarkSet(BTreeSet<Mark>);

impl MarkSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn of(marks: &[Mark]) -> Self {
        Self(marks.iter().copied().collect())
    }

    pub fn contains(&self, mark: Mark) -> bool {
        self.0.contains(&mark)
    }

    /// Flip a single mark.
    pub fn toggle(&mut self, mark: Mark) {
        if !self.0.remove(&mark) {
            self.0.insert(mark);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Address of a node: block indices from the top level down, plus an
/// optional run index inside that block's inline content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodePath {
    pub blocks: Vec<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run: Option<usize>,
}

impl NodePath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn block(indices: &[usize]) -> Self {
        Self {
            blocks: indices.to_vec(),
            run: None,
        }
    }

    pub fn child(&self, index: usize) -> Self {
        let mut blocks = self.blocks.clone();
        blocks.push(index);
        Self { blocks, run: None }
    }

    pub fn with_run(&self, run: usize) -> Self {
        Self {
            blocks: self.blocks.clone(),
            run: Some(run),
        }
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/")?;
        let joined = self
            .blocks
            .iter()
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join("/");
        write!(f, "{}", joined)?;
        if let Some(run) = self.run {
            write!(f, "#{}", run)?;
        }
        Ok(())
    }
}

/// Structural role of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    #[default]
    Default,
    Collapsible,
    BulletList,
    OrderedList,
}

impl BlockKind {
    /// Kinds rendered as list items.
    pub fn is_list_like(&self) -> bool {
        matches!(
            self,
            BlockKind::Collapsible | BlockKind::BulletList | BlockKind::OrderedList
        )
    }
}

/// Child of a citation span
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CitationChild {
    /// Lookup key into the reference store, resolved at export time.
    ReferenceRef { reference_id: String },
    Text { content: String },
}

impl CitationChild {
    pub fn reference(reference_id: impl Into<String>) -> Self {
        CitationChild::ReferenceRef {
            reference_id: reference_id.into(),
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        CitationChild::Text {
            content: content.into(),
        }
    }

    pub fn reference_id(&self) -> Option<&str> {
        match self {
            CitationChild::ReferenceRef { reference_id } => Some(reference_id),
            CitationChild::Text { .. } => None,
        }
    }
}

/// Atomic piece of inline content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InlineRun {
    Text {
        content: String,
        #[serde(default, skip_serializing_if = "MarkSet::is_empty")]
        marks: MarkSet,
    },
    HardBreak,
    CitationSpan { children: Vec<CitationChild> },
}

impl InlineRun {
    pub fn text(content: impl Into<String>) -> Self {
        InlineRun::Text {
            content: content.into(),
            marks: MarkSet::new(),
        }
    }

    pub fn styled(content: impl Into<String>, marks: &[Mark]) -> Self {
        InlineRun::Text {
            content: content.into(),
            marks: MarkSet::of(marks),
        }
    }

    pub fn citation(children: Vec<CitationChild>) -> Self {
        InlineRun::CitationSpan { children }
    }

    /// Citation span holding a single reference.
    pub fn cite(reference_id: impl Into<String>) -> Self {
        InlineRun::CitationSpan {
            children: vec![CitationChild::reference(reference_id)],
        }
    }
}

/// The block's own heading or paragraph text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InlineContent {
    Paragraph {
        #[serde(default)]
        runs: Vec<InlineRun>,
    },
    Heading {
        level: u8,
        #[serde(default)]
        runs: Vec<InlineRun>,
    },
}

impl InlineContent {
    pub fn paragraph(runs: Vec<InlineRun>) -> Self {
        InlineContent::Paragraph { runs }
    }

    pub fn heading(level: u8, runs: Vec<InlineRun>) -> Self {
        InlineContent::Heading { level, runs }
    }

    pub fn runs(&self) -> &[InlineRun] {
        match self {
            InlineContent::Paragraph { runs } | InlineContent::Heading { runs, .. } => runs,
        }
    }

    pub fn runs_mut(&mut self) -> &mut Vec<InlineRun> {
        match self {
            InlineContent::Paragraph { runs } | InlineContent::Heading { runs, .. } => runs,
        }
    }

    /// Raw text without marks. References contribute nothing.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for run in self.runs() {
            match run {
                InlineRun::Text { content, .. } => out.push_str(content),
                InlineRun::HardBreak => {}
                InlineRun::CitationSpan { children } => {
                    for child in children {
                        if let CitationChild::Text { content } = child {
                            out.push_str(content);
                        }
                    }
                }
            }
        }
        out
    }
}

impl Default for InlineContent {
    fn default() -> Self {
        InlineContent::Paragraph { runs: Vec::new() }
    }
}

/// Structural node: inline content plus nested blocks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    #[serde(default)]
    pub kind: BlockKind,

    pub inline: InlineContent,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Block>,
}

impl Block {
    pub fn new(kind: BlockKind, inline: InlineContent) -> Self {
        Self {
            kind,
            inline,
            children: Vec::new(),
        }
    }

    pub fn paragraph(runs: Vec<InlineRun>) -> Self {
        Self::new(BlockKind::Default, InlineContent::paragraph(runs))
    }

    pub fn heading(level: u8, runs: Vec<InlineRun>) -> Self {
        Self::new(BlockKind::Default, InlineContent::heading(level, runs))
    }

    pub fn with_kind(mut self, kind: BlockKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_children(mut self, children: Vec<Block>) -> Self {
        self.children = children;
        self
    }

    pub fn children(&self) -> &[Block] {
        &self.children
    }
}

/// Ordered sequence of top-level blocks; the first one is the title.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    blocks: Vec<Block>,
}

impl Document {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    /// Fresh document holding only a level-1 title heading.
    pub fn with_title(title: impl Into<String>) -> Self {
        Self::new(vec![Block::heading(1, vec![InlineRun::text(title)])])
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Raw title text (first block), marks stripped.
    pub fn title(&self) -> Option<String> {
        self.blocks.first().map(|b| b.inline.plain_text())
    }

    pub fn block(&self, path: &NodePath) -> Option<&Block> {
        let (first, rest) = path.blocks.split_first()?;
        let mut block = self.blocks.get(*first)?;
        for &index in rest {
            block = block.children.get(index)?;
        }
        Some(block)
    }

    pub(crate) fn block_mut(&mut self, path: &NodePath) -> Result<&mut Block, EditError> {
        let invalid = || EditError::InvalidPath(NodePath::block(&path.blocks));
        let (first, rest) = path.blocks.split_first().ok_or_else(invalid)?;
        let mut block = self.blocks.get_mut(*first).ok_or_else(invalid)?;
        for &index in rest {
            block = block.children.get_mut(index).ok_or_else(invalid)?;
        }
        Ok(block)
    }

    fn sibling_list_mut(&mut self, parent: &NodePath) -> Result<&mut Vec<Block>, EditError> {
        if parent.blocks.is_empty() {
            Ok(&mut self.blocks)
        } else {
            Ok(&mut self.block_mut(parent)?.children)
        }
    }

    /// Insert a block under `parent` (root path for top level). Top-level
    /// index 0 is reserved for the title: it only accepts a heading, and only
    /// while the document is empty.
    pub fn insert_block(
        &mut self,
        parent: &NodePath,
        index: usize,
        block: Block,
    ) -> Result<(), EditError> {
        let path = parent.child(index);
        validate_block(&block, &path)?;
        if path.blocks == [0] {
            if !self.blocks.is_empty() {
                return Err(EditError::TitleLocked);
            }
            validate_title(&block, &path)?;
        }
        let siblings = self.sibling_list_mut(parent)?;
        if index > siblings.len() {
            return Err(EditError::IndexOutOfBounds {
                path: parent.clone(),
                index,
                len: siblings.len(),
            });
        }
        siblings.insert(index, block);
        Ok(())
    }

    /// Remove the block at `path`, returning it with its subtree. The title
    /// block stays.
    pub fn remove_block(&mut self, path: &NodePath) -> Result<Block, EditError> {
        if path.blocks == [0] {
            return Err(EditError::TitleLocked);
        }
        let (&index, parent) = path
            .blocks
            .split_last()
            .ok_or_else(|| EditError::InvalidPath(path.clone()))?;
        let parent = NodePath::block(parent);
        let siblings = self.sibling_list_mut(&parent)?;
        if index >= siblings.len() {
            return Err(EditError::IndexOutOfBounds {
                path: parent,
                index,
                len: siblings.len(),
            });
        }
        Ok(siblings.remove(index))
    }

    /// Insert a run into a block's inline content. Adjacent runs are left
    /// untouched; in particular two citation spans are never merged.
    pub fn insert_run(
        &mut self,
        block: &NodePath,
        index: usize,
        run: InlineRun,
    ) -> Result<(), EditError> {
        if let InlineRun::CitationSpan { children } = &run {
            if children.is_empty() {
                return Err(StructuralError::EmptyCitationSpan {
                    path: block.with_run(index),
                }
                .into());
            }
        }
        let runs = self.block_mut(block)?.inline.runs_mut();
        if index > runs.len() {
            return Err(EditError::IndexOutOfBounds {
                path: block.clone(),
                index,
                len: runs.len(),
            });
        }
        runs.insert(index, run);
        Ok(())
    }

    pub fn remove_run(&mut self, block: &NodePath, index: usize) -> Result<InlineRun, EditError> {
        let runs = self.block_mut(block)?.inline.runs_mut();
        if index >= runs.len() {
            return Err(EditError::IndexOutOfBounds {
                path: block.clone(),
                index,
                len: runs.len(),
            });
        }
        Ok(runs.remove(index))
    }

    /// Remove one child of a citation span. A span left without children is
    /// removed as a whole.
    pub fn remove_citation_child(
        &mut self,
        block: &NodePath,
        run: usize,
        child: usize,
    ) -> Result<CitationChild, EditError> {
        let runs = self.block_mut(block)?.inline.runs_mut();
        let run_path = block.with_run(run);
        let children = match runs.get_mut(run) {
            Some(InlineRun::CitationSpan { children }) => children,
            _ => return Err(EditError::InvalidPath(run_path)),
        };
        if child >= children.len() {
            return Err(EditError::IndexOutOfBounds {
                path: run_path,
                index: child,
                len: children.len(),
            });
        }
        let removed = children.remove(child);
        if children.is_empty() {
            runs.remove(run);
        }
        Ok(removed)
    }

    /// Flip `mark` over a range of a block's inline content, in local
    /// offsets. Applying the same toggle twice restores the original marks.
    pub fn toggle_mark(
        &mut self,
        block: &NodePath,
        range: std::ops::Range<usize>,
        mark: Mark,
    ) -> Result<(), EditError> {
        let inline = &mut self.block_mut(block)?.inline;
        inline.toggle_mark(range, mark)
    }

    /// Every cited reference id in document order, duplicates included.
    pub fn reference_ids(&self) -> Vec<&str> {
        fn collect<'a>(block: &'a Block, out: &mut Vec<&'a str>) {
            for run in block.inline.runs() {
                if let InlineRun::CitationSpan { children } = run {
                    out.extend(children.iter().filter_map(CitationChild::reference_id));
                }
            }
            for child in &block.children {
                collect(child, out);
            }
        }

        let mut out = Vec::new();
        for block in &self.blocks {
            collect(block, &mut out);
        }
        out
    }

    /// Check every invariant of the tree, reporting the first violation.
    pub fn validate(&self) -> Result<(), StructuralError> {
        if let Some(title) = self.blocks.first() {
            validate_title(title, &NodePath::block(&[0]))?;
        }
        for (index, block) in self.blocks.iter().enumerate() {
            validate_block(block, &NodePath::block(&[index]))?;
        }
        Ok(())
    }
}

fn validate_title(block: &Block, path: &NodePath) -> Result<(), StructuralError> {
    match block.inline {
        InlineContent::Heading { .. } => Ok(()),
        InlineContent::Paragraph { .. } => Err(StructuralError::MissingTitle {
            path: path.clone(),
        }),
    }
}

fn validate_block(block: &Block, path: &NodePath) -> Result<(), StructuralError> {
    validate_inline(&block.inline, path)?;
    for (index, child) in block.children.iter().enumerate() {
        validate_block(child, &path.child(index))?;
    }
    Ok(())
}

pub(crate) fn validate_inline(inline: &InlineContent, path: &NodePath) -> Result<(), StructuralError> {
    if let InlineContent::Heading { level, .. } = inline {
        if !(1..=6).contains(level) {
            return Err(StructuralError::InvalidHeadingLevel {
                path: path.clone(),
                level: *level,
            });
        }
    }
    for (index, run) in inline.runs().iter().enumerate() {
        if let InlineRun::CitationSpan { children } = run {
            if children.is_empty() {
                return Err(StructuralError::EmptyCitationSpan {
                    path: path.with_run(index),
                });
            }
        }
    }
    Ok(())
}
