//! Corpus Layout Configuration

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File looked up at the project root when no explicit config is given.
pub const CONFIG_FILE_NAME: &str = "docgraph.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Where documents, includes and images live, relative to the project root.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub docs_dir: String,
    pub includes_dir: String,
    pub assets_dir: String,
    pub relationships_file: String,
    pub document_extensions: Vec<String>,
    pub include_extensions: Vec<String>,
    pub image_extensions: Vec<String>,
    pub description: String,
    pub timestamp_field: String,
}

fn default_image_extensions() -> Vec<String> {
    ["png", "jpg", "jpeg", "svg", "ico", "gif"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            docs_dir: "help".to_string(),
            includes_dir: "help/_includes".to_string(),
            assets_dir: "help/assets".to_string(),
            relationships_file: "_data/include-relationships.yml".to_string(),
            document_extensions: vec!["md".to_string()],
            include_extensions: vec!["md".to_string()],
            image_extensions: default_image_extensions(),
            description: "Include relationships discovered from {{$include}} directives"
                .to_string(),
            timestamp_field: "last-update".to_string(),
        }
    }
}

impl Config {
    /// Load a TOML config. A missing file yields the defaults.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `docgraph.toml` from the project root, if present.
    pub fn discover(root: &Path) -> Result<Self, ConfigError> {
        Self::load_from_file(&root.join(CONFIG_FILE_NAME))
    }

    pub fn relationships_path(&self, root: &Path) -> PathBuf {
        root.join(&self.relationships_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::discover(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.includes_dir, "help/_includes");
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "docs_dir = \"docs\"\nimage_extensions = [\"webp\"]\n",
        )
        .unwrap();

        let config = Config::discover(dir.path()).unwrap();
        assert_eq!(config.docs_dir, "docs");
        assert_eq!(config.image_extensions, vec!["webp".to_string()]);
        assert_eq!(config.assets_dir, "help/assets");
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), "docs_dir = [").unwrap();

        let err = Config::discover(dir.path()).unwrap_err();
        assert!(err.to_string().contains("Invalid config"));
    }
}
