//! Markdown + BibTeX export.
//!
//! Serialization is a pure function of the document, the reference store
//! and the output base name. Citation references are resolved against the
//! store; only references that were actually cited end up in the
//! bibliography, in first-use order.

mod bibtex;
mod blocks;
mod front_matter;
mod inline;

pub use bibtex::{serialize_references, BIBTEX_EXTENSION};
pub use front_matter::{FrontMatter, FrontMatterError};
pub use inline::INVALID_REFERENCE;

use crate::error::StructuralError;
use crate::model::Document;
use refdoc_types::{Reference, ReferenceStore};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::warn;

/// Exported Markdown plus the bibliography it points at
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SerializedDocument {
    pub markdown_content: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bibliography: Option<SerializedReferences>,
}

impl SerializedDocument {
    fn empty() -> Self {
        Self {
            markdown_content: String::new(),
            bibliography: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SerializedReferences {
    pub text_content: String,
    pub extension: String,
}

/// How children of list-like blocks are indented
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListNesting {
    /// Only collapsible blocks indent their children
    #[default]
    CollapsibleOnly,
    /// Bullet and ordered list items indent their children as well
    AllLists,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportOptions {
    #[serde(default)]
    pub list_nesting: ListNesting,

    /// Wrap citation spans in `[...]`; bare `@key` otherwise
    #[serde(default)]
    pub bracket_citations: bool,

    /// Line appended to the body when the document cites anything
    #[serde(default = "default_references_heading")]
    pub references_heading: String,
}

fn default_references_heading() -> String {
    String::from("## References")
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            list_nesting: ListNesting::default(),
            bracket_citations: false,
            references_heading: default_references_heading(),
        }
    }
}

/// Citation resolution for one serialization run. Records every resolved
/// reference once, in first-use order.
pub(crate) struct Citations<'s, S: ?Sized> {
    store: &'s S,
    used: Vec<&'s Reference>,
    seen: HashSet<&'s str>,
}

impl<'s, S: ReferenceStore + ?Sized> Citations<'s, S> {
    pub(crate) fn new(store: &'s S) -> Self {
        Self {
            store,
            used: Vec::new(),
            seen: HashSet::new(),
        }
    }

    pub(crate) fn resolve(&mut self, reference_id: &str) -> Option<&'s Reference> {
        let Some(reference) = self.store.get(reference_id) else {
            warn!(reference_id, "unresolved citation reference");
            return None;
        };
        if self.seen.insert(reference.id.as_str()) {
            self.used.push(reference);
        }
        Some(reference)
    }
}

/// Markdown serializer bound to a reference store
pub struct MarkdownSerializer<'s, S: ?Sized> {
    store: &'s S,
    options: ExportOptions,
}

impl<'s, S: ReferenceStore + ?Sized> MarkdownSerializer<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self {
            store,
            options: ExportOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ExportOptions) -> Self {
        self.options = options;
        self
    }

    /// Serialize `document`; a bibliography, when present, is referenced as
    /// `<output_base_name>.bib`.
    pub fn serialize(
        &self,
        document: &Document,
        output_base_name: &str,
    ) -> Result<SerializedDocument, StructuralError> {
        document.validate()?;

        let Some((title_block, body_blocks)) = document.blocks().split_first() else {
            return Ok(SerializedDocument::empty());
        };
        if body_blocks.is_empty() {
            return Ok(SerializedDocument::empty());
        }

        let mut citations = Citations::new(self.store);
        let mut body =
            blocks::render_blocks(body_blocks, 0, false, &mut citations, &self.options);

        let mut front_matter = FrontMatter::new(title_block.inline.plain_text());
        if citations.used.is_empty() {
            return Ok(SerializedDocument {
                markdown_content: format!("{}\n{}", front_matter.render(), body),
                bibliography: None,
            });
        }

        front_matter.bibliography = Some(format!("{output_base_name}.{BIBTEX_EXTENSION}"));
        body.push_str("\n\n");
        body.push_str(&self.options.references_heading);

        Ok(SerializedDocument {
            markdown_content: format!("{}\n{}", front_matter.render(), body),
            bibliography: Some(serialize_references(citations.used)),
        })
    }
}

/// Serialize with default [`ExportOptions`].
pub fn serialize<S: ReferenceStore + ?Sized>(
    document: &Document,
    store: &S,
    output_base_name: &str,
) -> Result<SerializedDocument, StructuralError> {
    MarkdownSerializer::new(store).serialize(document, output_base_name)
}
