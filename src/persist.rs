//! Persistence Layer - the relationships YAML document
//!
//! ```yaml
//! metadata:
//!   last_updated: 2025-01-01T00:00:00Z
//!   description: ...
//!   total_relationships: 1
//!   auto_discovered: true
//!   discovery_date: 2025-01-01T00:00:00Z
//! relationships:
//!   docs/guide.md:
//!   - /help/_includes/common-note.md
//! ```
//!
//! Each save is a full rebuild that atomically replaces the previous file.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::graph::RelationshipGraph;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed relationships file {}: {reason}", .path.display())]
    Malformed { path: PathBuf, reason: String },

    #[error("Failed to encode relationships: {0}")]
    Encode(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Metadata {
    pub last_updated: DateTime<Utc>,
    pub description: String,
    /// Edge count, not document count.
    pub total_relationships: usize,
    pub auto_discovered: bool,
    pub discovery_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PersistedRelationships {
    pub metadata: Metadata,
    pub relationships: BTreeMap<String, Vec<String>>,
}

impl PersistedRelationships {
    pub fn from_graph(graph: &RelationshipGraph, description: &str, now: DateTime<Utc>) -> Self {
        let relationships = graph
            .iter()
            .map(|(source, targets)| (source.clone(), targets.iter().cloned().collect()))
            .collect();

        Self {
            metadata: Metadata {
                last_updated: now,
                description: description.to_string(),
                total_relationships: graph.total_relationships(),
                auto_discovered: true,
                discovery_date: now,
            },
            relationships,
        }
    }

    pub fn graph(&self) -> RelationshipGraph {
        self.relationships
            .iter()
            .map(|(source, targets)| (source.clone(), targets.clone()))
            .collect()
    }
}

/// Write the document, creating parent directories and replacing any previous file.
pub fn save(document: &PersistedRelationships, path: &Path) -> Result<(), PersistError> {
    let yaml = serde_yaml::to_string(document)?;
    write_atomic(path, yaml.as_bytes()).map_err(|source| PersistError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Replace `path` via a temp file in the same directory, so readers never see a partial write.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(bytes)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

pub fn load(path: &Path) -> Result<PersistedRelationships, PersistError> {
    let content = fs::read_to_string(path).map_err(|source| PersistError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&content).map_err(|e| PersistError::Malformed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
