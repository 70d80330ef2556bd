//! Task Dispatch - Single Entry Point
//!
//! Every operation is a pure function of the project root and its config.
//! Nothing is registered globally; `Workspace::run` is the only dispatcher.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{Config, ConfigError};
use crate::diff::{diff, GraphDiff};
use crate::extract::{normalize_target, ReferenceKind};
use crate::graph::{referenced_targets, RelationshipGraph};
use crate::hashing::fingerprint;
use crate::persist::{self, PersistError, PersistedRelationships};
use crate::report::{find_orphans, OrphanReport};
use crate::timestamps::{self, Refresh};
use crate::walker::{self, join_rel, Document, WalkError};

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Project root not found: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed persisted state in {}: {reason}", .path.display())]
    MalformedPersistedState { path: PathBuf, reason: String },

    #[error("Unknown task: {0}")]
    UnknownTask(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Encoding error: {0}")]
    Encoding(String),
}

impl From<WalkError> for TaskError {
    fn from(e: WalkError) -> Self {
        TaskError::Io {
            path: e.path,
            source: e.source,
        }
    }
}

impl From<PersistError> for TaskError {
    fn from(e: PersistError) -> Self {
        match e {
            PersistError::Io { path, source } => TaskError::Io { path, source },
            PersistError::Malformed { path, reason } => {
                TaskError::MalformedPersistedState { path, reason }
            }
            PersistError::Encode(e) => TaskError::Encoding(e.to_string()),
        }
    }
}

impl From<serde_json::Error> for TaskError {
    fn from(e: serde_json::Error) -> Self {
        TaskError::Encoding(e.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Task {
    MaintainRelationships,
    MaintainTimestamps,
    MaintainAll,
    UnusedIncludes,
    CompareRelationships,
    UnusedImages,
}

impl Task {
    pub const ALL: [Task; 6] = [
        Task::MaintainRelationships,
        Task::MaintainTimestamps,
        Task::MaintainAll,
        Task::UnusedIncludes,
        Task::CompareRelationships,
        Task::UnusedImages,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Task::MaintainRelationships => "includes:maintain_relationships",
            Task::MaintainTimestamps => "includes:maintain_timestamps",
            Task::MaintainAll => "includes:maintain_all",
            Task::UnusedIncludes => "includes:unused",
            Task::CompareRelationships => "includes:compare",
            Task::UnusedImages => "images:unused",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Task::MaintainRelationships => "Discover and persist include relationships",
            Task::MaintainTimestamps => "Update document timestamps from their includes",
            Task::MaintainAll => "Run maintain_relationships then maintain_timestamps",
            Task::UnusedIncludes => "Find include files no document references",
            Task::CompareRelationships => "Compare persisted relationships with a fresh scan",
            Task::UnusedImages => "Find images no document references",
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Task {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Task::ALL
            .into_iter()
            .find(|t| t.name() == s.trim())
            .ok_or_else(|| TaskError::UnknownTask(s.to_string()))
    }
}

/// Names of every task, in registry order.
pub fn available_tasks() -> Vec<&'static str> {
    Task::ALL.iter().map(Task::name).collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskOutput {
    pub task: String,
    pub lines: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<OrphanReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff: Option<GraphDiff>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub updated: Vec<String>,
}

impl TaskOutput {
    fn new(task: Task) -> Self {
        Self {
            task: task.name().to_string(),
            lines: vec![format!("==> {}", task.name())],
            report: None,
            diff: None,
            updated: Vec::new(),
        }
    }

    fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// The full text report.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// A documentation project rooted at one directory.
pub struct Workspace {
    root: PathBuf,
    config: Config,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>, config: Config) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    /// Open a project root, picking up `docgraph.toml` when present.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, TaskError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(TaskError::MissingInput(root));
        }
        let config = Config::discover(&root)?;
        Ok(Self::new(root, config))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn run(&self, task: Task) -> Result<TaskOutput, TaskError> {
        match task {
            Task::MaintainRelationships => self.maintain_relationships_at(Utc::now()),
            Task::MaintainTimestamps => self.maintain_timestamps(),
            Task::MaintainAll => self.maintain_all(),
            Task::UnusedIncludes => self.unused_includes(),
            Task::CompareRelationships => self.compare_relationships(),
            Task::UnusedImages => self.unused_images(),
        }
    }

    fn ensure_root(&self) -> Result<(), TaskError> {
        if self.root.is_dir() {
            Ok(())
        } else {
            Err(TaskError::MissingInput(self.root.clone()))
        }
    }

    pub fn documents(&self) -> Result<Vec<Document>, TaskError> {
        self.ensure_root()?;
        Ok(walker::load_documents(
            &self.root,
            &self.config.docs_dir,
            &self.config.document_extensions,
        )?)
    }

    pub fn build_graph(&self) -> Result<(RelationshipGraph, usize), TaskError> {
        let documents = self.documents()?;
        Ok((RelationshipGraph::build(&documents), documents.len()))
    }

    pub fn relationships_path(&self) -> PathBuf {
        self.config.relationships_path(&self.root)
    }

    pub fn load_relationships(&self) -> Result<PersistedRelationships, TaskError> {
        Ok(persist::load(&self.relationships_path())?)
    }

    /// Rebuild the relationship graph and persist it, stamped with `now`.
    pub fn maintain_relationships_at(&self, now: DateTime<Utc>) -> Result<TaskOutput, TaskError> {
        let mut out = TaskOutput::new(Task::MaintainRelationships);
        let (graph, scanned) = self.build_graph()?;

        let document = PersistedRelationships::from_graph(&graph, &self.config.description, now);
        persist::save(&document, &self.relationships_path())?;

        info!(
            documents = scanned,
            sources = graph.source_count(),
            relationships = graph.total_relationships(),
            "include relationships persisted"
        );

        out.push(format!(
            "Scanned {} documents under {}",
            scanned, self.config.docs_dir
        ));
        out.push(format!(
            "Successfully discovered {} include relationships across {} documents",
            graph.total_relationships(),
            graph.source_count()
        ));
        out.push(format!("Saved to {}", self.config.relationships_file));
        Ok(out)
    }

    /// Refresh the timestamp field of every document whose includes changed more recently.
    pub fn maintain_timestamps(&self) -> Result<TaskOutput, TaskError> {
        self.ensure_root()?;
        let mut out = TaskOutput::new(Task::MaintainTimestamps);
        let graph = self.load_relationships()?.graph();
        let field = &self.config.timestamp_field;
        let docs_prefix = self.config.docs_dir.trim_matches('/');

        for (key, targets) in graph.iter() {
            let doc_rel = join_rel(docs_prefix, key);
            let doc_path = self.root.join(&doc_rel);
            if !doc_path.is_file() {
                warn!(document = %doc_rel, "persisted document no longer exists");
                continue;
            }

            let Some(newest) = self.newest_include_date(&doc_rel, targets.iter()) else {
                debug!(document = %doc_rel, "no readable includes");
                continue;
            };

            let text = fs::read_to_string(&doc_path).map_err(|source| TaskError::Io {
                path: doc_path.clone(),
                source,
            })?;

            match timestamps::refresh(&text, field, newest) {
                Refresh::Updated(updated) => {
                    persist::write_atomic(&doc_path, updated.as_bytes()).map_err(|source| {
                        TaskError::Io {
                            path: doc_path.clone(),
                            source,
                        }
                    })?;
                    out.updated.push(key.clone());
                }
                Refresh::UpToDate => {}
                Refresh::NoFrontMatter => {
                    warn!(document = %doc_rel, "no front matter, timestamp not maintained");
                }
            }
        }

        info!(updated = out.updated.len(), "timestamps maintained");
        if out.updated.is_empty() {
            out.push("All document timestamps are up to date");
        } else {
            out.push(format!("Updated {} in {} documents:", field, out.updated.len()));
            let listed: Vec<String> = out.updated.iter().map(|k| format!("  - {}", k)).collect();
            out.lines.extend(listed);
        }
        Ok(out)
    }

    fn newest_include_date<'a>(
        &self,
        doc_rel: &str,
        targets: impl Iterator<Item = &'a String>,
    ) -> Option<NaiveDate> {
        targets
            .filter_map(|target| normalize_target(doc_rel, target))
            .filter_map(|resolved| timestamps::modified_date(&self.root.join(resolved)).ok())
            .max()
    }

    pub fn maintain_all(&self) -> Result<TaskOutput, TaskError> {
        let mut out = TaskOutput::new(Task::MaintainAll);
        let relationships = self.maintain_relationships_at(Utc::now())?;
        let timestamps = self.maintain_timestamps()?;

        out.lines.extend(relationships.lines);
        out.lines.extend(timestamps.lines);
        out.updated = timestamps.updated;
        Ok(out)
    }

    pub fn unused_includes(&self) -> Result<TaskOutput, TaskError> {
        self.unused(
            Task::UnusedIncludes,
            ReferenceKind::Include,
            &self.config.includes_dir,
            &self.config.include_extensions,
        )
    }

    pub fn unused_images(&self) -> Result<TaskOutput, TaskError> {
        self.unused(
            Task::UnusedImages,
            ReferenceKind::Image,
            &self.config.assets_dir,
            &self.config.image_extensions,
        )
    }

    fn unused(
        &self,
        task: Task,
        kind: ReferenceKind,
        dir: &str,
        extensions: &[String],
    ) -> Result<TaskOutput, TaskError> {
        let documents = self.documents()?;
        let inventory = walker::inventory(&self.root, dir, extensions)?;
        let referenced = referenced_targets(&documents, kind);
        let report = find_orphans(kind, &inventory, &referenced);

        info!(
            kind = kind.plural(),
            total = report.total,
            unused = report.unused,
            "orphan scan complete"
        );

        let mut out = TaskOutput::new(task);
        out.lines.extend(report.lines());
        out.report = Some(report);
        Ok(out)
    }

    /// Compare the persisted graph against a fresh scan without writing anything.
    pub fn compare_relationships(&self) -> Result<TaskOutput, TaskError> {
        let mut out = TaskOutput::new(Task::CompareRelationships);
        let persisted = self.load_relationships()?;
        let previous = persisted.graph();
        let (current, _) = self.build_graph()?;
        let since = persisted.metadata.discovery_date.to_rfc3339();
        let changes = diff(&previous, &current);

        if changes.is_empty() {
            out.push(format!("Relationships unchanged since {}", since));
        } else {
            out.push(format!(
                "{} relationships added, {} removed since {}",
                changes.added.len(),
                changes.removed.len(),
                since
            ));
            out.lines.extend(changes.lines());
        }
        out.push(format!(
            "Fingerprint {} -> {}",
            short_hash(&fingerprint(&previous)?),
            short_hash(&fingerprint(&current)?)
        ));
        out.diff = Some(changes);
        Ok(out)
    }
}

fn short_hash(hash: &str) -> &str {
    hash.get(..12).unwrap_or(hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_names_round_trip() {
        for task in Task::ALL {
            assert_eq!(task.name().parse::<Task>().unwrap(), task);
        }
    }

    #[test]
    fn test_available_tasks() {
        let tasks = available_tasks();
        assert_eq!(tasks.len(), 6);
        assert!(tasks.contains(&"includes:maintain_relationships"));
        assert!(tasks.contains(&"includes:maintain_timestamps"));
        assert!(tasks.contains(&"includes:maintain_all"));
        assert!(tasks.contains(&"includes:unused"));
        assert!(tasks.contains(&"images:unused"));
    }

    #[test]
    fn test_unknown_task() {
        let err = "images:optimize".parse::<Task>().unwrap_err();
        assert!(err.to_string().contains("Unknown task: images:optimize"));
    }

    #[test]
    fn test_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            Workspace::open(&missing),
            Err(TaskError::MissingInput(_))
        ));

        let ws = Workspace::new(&missing, Config::default());
        assert!(matches!(
            ws.run(Task::UnusedImages),
            Err(TaskError::MissingInput(_))
        ));
    }
}
