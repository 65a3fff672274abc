//! Export the whole reference library as BibTeX.

use super::{load_config, load_library, output_dir};
use anyhow::{Context, Result};
use refdoc_core::serialize_references;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub fn export_library(config_path: &Path, extra: &[PathBuf], output: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let library = load_library(&config, extra);
    let serialized = serialize_references(library.iter());

    let path = match output {
        Some(path) => path.to_path_buf(),
        None => output_dir(&config, None).join(format!("references.{}", serialized.extension)),
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    fs::write(&path, &serialized.text_content)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    info!("Exported {} references to {}", library.len(), path.display());
    Ok(())
}
