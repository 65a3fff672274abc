//! Configuration parsing and management.

use crate::serializer::ExportOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "refdoc.yml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),
}

/// Main configuration struct matching the refdoc.yml schema
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Reference library files (`.json` or `.bib`)
    #[serde(default)]
    pub references: Vec<PathBuf>,

    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    #[serde(default)]
    pub export: ExportOptions,

    // Internal: path to config file (for relative path resolution)
    #[serde(skip)]
    config_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        // An empty file is a valid, all-defaults config
        let mut config: Config = if contents.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(&contents)?
        };

        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Load `path` if it exists, defaults otherwise.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Reference library files, resolved relative to the config file
    pub fn reference_paths(&self) -> Vec<PathBuf> {
        self.references
            .iter()
            .map(|p| self.resolve_path(p))
            .collect()
    }

    /// Output directory, resolved relative to the config file (None means
    /// the current directory)
    pub fn output_dir(&self) -> Option<PathBuf> {
        self.output_dir.as_ref().map(|p| self.resolve_path(p))
    }

    /// Resolve a path relative to the config file location
    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else if let Some(parent) = self.config_path.as_ref().and_then(|p| p.parent()) {
            parent.join(path)
        } else {
            path.to_path_buf()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serializer::ListNesting;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert!(config.references.is_empty());
        assert_eq!(config.output_dir(), None);
        assert!(!config.export.bracket_citations);
        assert_eq!(config.export.list_nesting, ListNesting::CollapsibleOnly);
    }

    #[test]
    fn test_paths_resolved_relative_to_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("refdoc.yml");
        fs::write(
            &path,
            "references: [library.json, /abs/extra.bib]\noutput_dir: exports\nexport:\n  bracket_citations: true\n",
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(
            config.reference_paths(),
            vec![dir.path().join("library.json"), PathBuf::from("/abs/extra.bib")]
        );
        assert_eq!(config.output_dir(), Some(dir.path().join("exports")));
        assert!(config.export.bracket_citations);
        assert_eq!(config.export.references_heading, "## References");
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_or_default(dir.path().join("absent.yml")).unwrap();
        assert!(config.references.is_empty());
    }

    #[test]
    fn test_invalid_yaml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("refdoc.yml");
        fs::write(&path, "references: {").unwrap();
        assert!(matches!(
            Config::from_file(&path),
            Err(ConfigError::ParseError(_))
        ));
    }
}
