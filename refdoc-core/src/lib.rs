//! # refdoc-core
//!
//! Core library for refdoc: structured documents with inline citations.
//!
//! This crate provides the document model and its offset-addressed edits,
//! the citation-span tracker that runs after every transaction, and the
//! Markdown + BibTeX serializer used for export.

pub mod config;
pub mod edit;
pub mod error;
mod inline;
pub mod library;
pub mod model;
pub mod position;
pub mod serializer;
pub mod session;
pub mod tracker;

pub use config::{Config, ConfigError};
pub use edit::{Edit, Transaction};
pub use error::{EditError, StructuralError};
pub use library::{Diagnostic, DiagnosticSeverity, LibraryError, LibraryLoader};
pub use model::{
    Block, BlockKind, CitationChild, Document, InlineContent, InlineRun, Mark, MarkSet, NodePath,
};
pub use position::ResolvedOffset;
pub use serializer::{
    serialize, serialize_references, ExportOptions, ListNesting, MarkdownSerializer,
    SerializedDocument, SerializedReferences,
};
pub use session::{EditSession, TransactionOutcome};
pub use tracker::{recompute, CitationRange, Decoration, SeparatorInsertion, TrackerState, TrackerUpdate};

pub use refdoc_types::{Author, Reference, ReferenceLibrary, ReferenceStore, SharedReferenceLibrary};
