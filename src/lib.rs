//! Docgraph Core - Documentation Referential Integrity
//!
//! Discovers which include snippets and images each document references,
//! persists the include graph, and reports files nothing references.
//!
//! # Pipeline
//! 1. Walk the corpus (documents, includes, images)
//! 2. Extract references (`{{$include}}`, `![]()`, `<img src>`)
//! 3. Build the include relationship graph
//! 4. Persist it, or report orphans against an inventory

pub mod config;
pub mod walker;
pub mod extract;
pub mod graph;
pub mod report;
pub mod persist;
pub mod hashing;
pub mod diff;
pub mod timestamps;
pub mod output;
pub mod tasks;

pub use config::{Config, ConfigError};
pub use walker::{walk, Document, WalkError};
pub use extract::{extract, normalize_target, Reference, ReferenceKind};
pub use graph::{referenced_targets, RelationshipGraph};
pub use report::{find_orphans, OrphanReport};
pub use persist::{load, save, Metadata, PersistError, PersistedRelationships};
pub use hashing::{canonical_json, fingerprint};
pub use diff::{diff, Edge, GraphDiff};
pub use output::OutputFormat;
pub use tasks::{available_tasks, Task, TaskError, TaskOutput, Workspace};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
