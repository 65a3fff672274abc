//! CLI command implementations.

pub mod check;
pub mod export;
pub mod references;
pub mod track;

pub use check::check_document;
pub use export::{export_document, ExportOptions};
pub use references::export_library;
pub use track::track_edits;

use anyhow::{Context, Result};
use refdoc_core::{Config, Document, LibraryLoader, ReferenceLibrary};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

pub(crate) fn load_config(path: &Path) -> Result<Config> {
    Config::load_or_default(path)
        .with_context(|| format!("Failed to load configuration {}", path.display()))
}

pub(crate) fn load_document(path: &Path) -> Result<Document> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read document {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse document {}", path.display()))
}

/// Load the config's reference files followed by `extra`. Unloadable files
/// are logged and skipped.
pub(crate) fn load_library(config: &Config, extra: &[PathBuf]) -> ReferenceLibrary {
    let mut loader = LibraryLoader::new();
    loader.load_paths(&config.reference_paths());
    loader.load_paths(extra);
    for diag in loader.take_diagnostics() {
        let source = diag.source_path.as_deref().unwrap_or("-");
        warn!("{} ({}): {}", diag.code, source, diag.message);
    }
    loader.into_library()
}

pub(crate) fn output_dir(config: &Config, explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| config.output_dir())
        .unwrap_or_else(|| PathBuf::from("."))
}
