//! Reference library loading from JSON and BibLaTeX files.

use chrono::NaiveDate;
use hayagriva::{io::from_biblatex_str, Entry};
use refdoc_types::{Author, Reference, ReferenceLibrary};
use serde::{Deserialize, Serialize};
use std::{
    fs, mem,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("Failed to read reference file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse JSON references: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse bibliography: {0}")]
    Bibliography(String),

    #[error("Unsupported reference file extension: {0:?}")]
    UnsupportedFormat(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Warning,
    Error,
}

/// A problem found while loading reference files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: String,
    pub message: String,
    pub severity: DiagnosticSeverity,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,
}

/// Loads reference files into a [`ReferenceLibrary`].
///
/// Files that cannot be read or parsed are skipped and reported as warning
/// diagnostics. Later files win on id conflicts.
#[derive(Debug, Default)]
pub struct LibraryLoader {
    library: ReferenceLibrary,
    diagnostics: Vec<Diagnostic>,
}

impl LibraryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_paths(&mut self, paths: &[PathBuf]) {
        for path in paths {
            self.load_path(path);
        }
    }

    pub fn load_path(&mut self, path: &Path) {
        match load_file(path) {
            Ok(loaded) => {
                debug!(path = %path.display(), count = loaded.len(), "loaded references");
                self.library.extend(loaded);
            }
            Err(err) => {
                warn!("Failed to load references {:?}: {}", path, err);
                self.diagnostics.push(Diagnostic {
                    code: "library.load_failed".to_string(),
                    message: err.to_string(),
                    severity: DiagnosticSeverity::Warning,
                    source_path: Some(path.to_string_lossy().to_string()),
                });
            }
        }
    }

    pub fn library(&self) -> &ReferenceLibrary {
        &self.library
    }

    pub fn into_library(self) -> ReferenceLibrary {
        self.library
    }

    /// Take accumulated diagnostics (clearing the internal buffer).
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        mem::take(&mut self.diagnostics)
    }
}

/// Load a single `.json` or `.bib`/`.bibtex` file.
pub fn load_file(path: &Path) -> Result<ReferenceLibrary, LibraryError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("json") => parse_json(&fs::read_to_string(path)?),
        Some("bib") | Some("bibtex") => parse_bibtex(&fs::read_to_string(path)?),
        _ => Err(LibraryError::UnsupportedFormat(path.to_path_buf())),
    }
}

/// Parse a JSON array of references.
pub fn parse_json(contents: &str) -> Result<ReferenceLibrary, LibraryError> {
    let references: Vec<Reference> = serde_json::from_str(contents)?;
    Ok(ReferenceLibrary::from(references))
}

/// Parse BibLaTeX source; entry keys become both id and citation key.
pub fn parse_bibtex(contents: &str) -> Result<ReferenceLibrary, LibraryError> {
    let library = from_biblatex_str(contents).map_err(|errors| {
        LibraryError::Bibliography(
            errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; "),
        )
    })?;
    Ok(library.iter().map(reference_from_entry).collect())
}

fn reference_from_entry(entry: &Entry) -> Reference {
    let key = entry.key().to_string();
    let title = entry.title().map(|t| t.to_string()).unwrap_or_default();

    let mut reference = Reference::new(key.clone(), key, title);
    reference.authors = entry
        .authors()
        .unwrap_or_default()
        .iter()
        .map(|p| Author::new(p.name_first(false, false)))
        .collect();

    // hayagriva months and days are zero-based
    reference.published_date = entry.date().and_then(|date| {
        NaiveDate::from_ymd_opt(
            date.year,
            u32::from(date.month.unwrap_or(0)) + 1,
            u32::from(date.day.unwrap_or(0)) + 1,
        )
    });
    reference
}

#[cfg(test)]
mod tests {
    use super::*;
    use refdoc_types::ReferenceStore;
    use tempfile::tempdir;

    const BIB: &str = r#"@article{doe2023,
    title = {Useful Things},
    author = {Doe, Joe and Smith, Ann},
    date = {2023-08-01},
}"#;

    #[test]
    fn test_parse_bibtex_entry() {
        let library = parse_bibtex(BIB).unwrap();
        let reference = library.get("doe2023").unwrap();
        assert_eq!(reference.citation_key, "doe2023");
        assert_eq!(reference.title, "Useful Things");
        assert_eq!(
            reference.authors,
            vec![Author::new("Joe Doe"), Author::new("Ann Smith")]
        );
        assert_eq!(reference.published_date, NaiveDate::from_ymd_opt(2023, 8, 1));
    }

    #[test]
    fn test_parse_json_references() {
        let library = parse_json(
            r#"[{"id": "r1", "citation_key": "doe23", "title": "T",
                "authors": [{"full_name": "J Doe"}], "published_date": "2023-08-01"}]"#,
        )
        .unwrap();
        assert_eq!(library.get("r1").unwrap().citation_key, "doe23");
    }

    #[test]
    fn test_loader_reports_bad_files() {
        let dir = tempdir().unwrap();
        let good = dir.path().join("refs.json");
        fs::write(&good, r#"[{"id": "r1", "citation_key": "k", "title": "T"}]"#).unwrap();
        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{").unwrap();
        let missing = dir.path().join("missing.bib");

        let mut loader = LibraryLoader::new();
        loader.load_paths(&[good, broken.clone(), missing]);

        assert_eq!(loader.library().len(), 1);
        let diagnostics = loader.take_diagnostics();
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(
            diagnostics[0].source_path.as_deref(),
            Some(broken.to_string_lossy().as_ref())
        );
        assert!(loader.take_diagnostics().is_empty());
    }

    #[test]
    fn test_later_files_win() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("a.json");
        let second = dir.path().join("b.json");
        fs::write(&first, r#"[{"id": "r1", "citation_key": "old", "title": "T"}]"#).unwrap();
        fs::write(&second, r#"[{"id": "r1", "citation_key": "new", "title": "T"}]"#).unwrap();

        let mut loader = LibraryLoader::new();
        loader.load_paths(&[first, second]);
        assert_eq!(loader.library().get("r1").unwrap().citation_key, "new");
    }
}
