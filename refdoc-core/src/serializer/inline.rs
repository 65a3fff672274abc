//! Inline content to Markdown.

use super::{Citations, ExportOptions};
use crate::model::{CitationChild, InlineContent, InlineRun, Mark, MarkSet};
use refdoc_types::ReferenceStore;

const MARK_ORDER: [Mark; 3] = [Mark::Bold, Mark::Italic, Mark::Strike];

/// Token rendered for a reference the store cannot resolve.
pub const INVALID_REFERENCE: &str = "@INVALID_REFERENCE";

fn delimiter(mark: Mark) -> &'static str {
    match mark {
        Mark::Bold => "**",
        Mark::Italic => "*",
        Mark::Strike => "~~",
    }
}

/// Emits mark delimiters whenever the active mark set changes.
///
/// Delimiters are toggled in a fixed order (bold, italic, strike) both when
/// opening and closing, so `{bold} {} {bold}` renders `**a** b **c**`.
#[derive(Default)]
struct MarkWriter {
    out: String,
    open: MarkSet,
}

impl MarkWriter {
    fn set_marks(&mut self, marks: &MarkSet) {
        for mark in MARK_ORDER {
            if self.open.contains(mark) != marks.contains(mark) {
                self.out.push_str(delimiter(mark));
                self.open.toggle(mark);
            }
        }
    }

    fn push(&mut self, marks: &MarkSet, text: &str) {
        self.set_marks(marks);
        self.out.push_str(text);
    }

    fn finish(mut self) -> String {
        self.set_marks(&MarkSet::new());
        self.out
    }
}

pub(super) fn render_inline<S: ReferenceStore + ?Sized>(
    inline: &InlineContent,
    citations: &mut Citations<'_, S>,
    options: &ExportOptions,
) -> String {
    let unmarked = MarkSet::new();
    let mut writer = MarkWriter::default();

    for run in inline.runs() {
        match run {
            InlineRun::Text { content, marks } => writer.push(marks, content),
            InlineRun::HardBreak => writer.push(&unmarked, "  \n"),
            InlineRun::CitationSpan { children } => {
                writer.set_marks(&unmarked);
                if options.bracket_citations {
                    writer.out.push('[');
                }
                for child in children {
                    match child {
                        CitationChild::ReferenceRef { reference_id } => {
                            match citations.resolve(reference_id) {
                                Some(reference) => {
                                    writer.out.push('@');
                                    writer.out.push_str(&reference.citation_key);
                                }
                                None => writer.out.push_str(INVALID_REFERENCE),
                            }
                        }
                        CitationChild::Text { content } => writer.out.push_str(content),
                    }
                }
                if options.bracket_citations {
                    writer.out.push(']');
                }
            }
        }
    }

    let body = writer.finish();
    match inline {
        InlineContent::Heading { level, .. } => {
            format!("{} {}", "#".repeat(usize::from(*level)), body)
        }
        InlineContent::Paragraph { .. } => body,
    }
}
