//! Block tree to Markdown lines.

use super::inline::render_inline;
use super::{Citations, ExportOptions, ListNesting};
use crate::model::{Block, BlockKind};
use refdoc_types::ReferenceStore;

const INDENT: &str = "    ";

fn marker(kind: BlockKind) -> &'static str {
    match kind {
        BlockKind::Collapsible | BlockKind::BulletList => "- ",
        BlockKind::OrderedList => "1. ",
        BlockKind::Default => "",
    }
}

fn nests_children(kind: BlockKind, nesting: ListNesting) -> bool {
    match nesting {
        ListNesting::CollapsibleOnly => kind == BlockKind::Collapsible,
        ListNesting::AllLists => kind.is_list_like(),
    }
}

/// Render sibling blocks.
///
/// A blank line precedes every block except the first top-level one.
/// List-like blocks drop it when they follow a list-like sibling or open the
/// children of a list-like parent, which keeps lists tight.
pub(super) fn render_blocks<S: ReferenceStore + ?Sized>(
    blocks: &[Block],
    indent_level: usize,
    inside_list: bool,
    citations: &mut Citations<'_, S>,
    options: &ExportOptions,
) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut pad = !inside_list;

    for (index, block) in blocks.iter().enumerate() {
        let list_like = block.kind.is_list_like();
        if (index > 0 || indent_level > 0) && (pad || !list_like) {
            lines.push(String::new());
        }

        let mut line = INDENT.repeat(indent_level);
        line.push_str(marker(block.kind));
        line.push_str(&render_inline(&block.inline, citations, options));
        lines.push(line);

        if !block.children.is_empty() {
            let child_indent = if nests_children(block.kind, options.list_nesting) {
                indent_level + 1
            } else {
                indent_level
            };
            lines.push(render_blocks(
                &block.children,
                child_indent,
                list_like,
                citations,
                options,
            ));
        }
        pad = !list_like;
    }
    lines.join("\n")
}
