//! Export a document as Markdown plus BibTeX.

use super::{load_config, load_document, load_library, output_dir};
use anyhow::{Context, Result};
use refdoc_core::MarkdownSerializer;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub struct ExportOptions {
    pub name: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub references: Vec<PathBuf>,
    pub stdout: bool,
}

pub fn export_document(config_path: &Path, document_path: &Path, opts: ExportOptions) -> Result<()> {
    let config = load_config(config_path)?;
    let document = load_document(document_path)?;
    let library = load_library(&config, &opts.references);

    let name = match opts.name {
        Some(name) => name,
        None => document_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .context("Document path has no file name")?,
    };

    let serialized = MarkdownSerializer::new(&library)
        .with_options(config.export.clone())
        .serialize(&document, &name)
        .with_context(|| format!("Failed to export {}", document_path.display()))?;

    if opts.stdout {
        println!("{}", serialized.markdown_content);
        if let Some(bibliography) = &serialized.bibliography {
            println!();
            println!("{}", bibliography.text_content);
        }
        return Ok(());
    }

    let dir = output_dir(&config, opts.output_dir.as_deref());
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let markdown_path = dir.join(format!("{name}.md"));
    fs::write(&markdown_path, &serialized.markdown_content)
        .with_context(|| format!("Failed to write {}", markdown_path.display()))?;
    info!("Wrote {}", markdown_path.display());

    if let Some(bibliography) = &serialized.bibliography {
        let bib_path = dir.join(format!("{name}.{}", bibliography.extension));
        fs::write(&bib_path, &bibliography.text_content)
            .with_context(|| format!("Failed to write {}", bib_path.display()))?;
        info!("Wrote {}", bib_path.display());
    }

    Ok(())
}
