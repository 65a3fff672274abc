//! Validate document structure and report unresolved citations.

use super::{load_config, load_document, load_library};
use anyhow::{Context, Result};
use refdoc_core::{ReferenceStore, TrackerState};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub fn check_document(config_path: &Path, document_path: &Path, extra: &[PathBuf]) -> Result<()> {
    let config = load_config(config_path)?;
    let document = load_document(document_path)?;
    document
        .validate()
        .with_context(|| format!("{} failed validation", document_path.display()))?;

    let library = load_library(&config, extra);
    let mut unresolved: Vec<&str> = document
        .reference_ids()
        .into_iter()
        .filter(|id| library.get(id).is_none())
        .collect();
    let mut seen = HashSet::new();
    unresolved.retain(|id| seen.insert(*id));

    let ranges = TrackerState::from_document(&document).ranges.len();
    println!(
        "{}: {} blocks, {} citation ranges, {} unresolved references",
        document_path.display(),
        document.blocks().len(),
        ranges,
        unresolved.len()
    );
    for id in unresolved {
        println!("- unresolved reference: {}", id);
    }

    Ok(())
}
