//! File Walker - candidate documents and target inventories

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

#[derive(Debug, Error)]
#[error("Failed to read {}: {source}", .path.display())]
pub struct WalkError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// A text document, read once per scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Path relative to the project root, forward-slash normalized.
    pub path: String,
    /// Path relative to the documents subtree; the key used in the relationship graph.
    pub key: String,
    pub text: String,
}

/// Recursively list files under `root` whose extension is in `extensions`.
///
/// Paths are relative to `root`, `/`-separated and sorted. A missing `root`
/// yields an empty list.
pub fn walk(root: &Path, extensions: &[String]) -> Result<Vec<String>, WalkError> {
    if !root.is_dir() {
        debug!(path = %root.display(), "skipping missing directory");
        return Ok(Vec::new());
    }

    let mut paths = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            WalkError {
                path,
                source: e.into(),
            }
        })?;

        if !entry.file_type().is_file() || !has_extension(entry.path(), extensions) {
            continue;
        }

        if let Ok(rel) = entry.path().strip_prefix(root) {
            paths.push(normalize_path(rel));
        }
    }
    paths.sort();
    Ok(paths)
}

/// Inventory of a subtree, keyed by project-root-relative path.
pub fn inventory(
    project_root: &Path,
    subdir: &str,
    extensions: &[String],
) -> Result<Vec<String>, WalkError> {
    let prefix = subdir.trim_matches('/');
    Ok(walk(&project_root.join(prefix), extensions)?
        .into_iter()
        .map(|rel| join_rel(prefix, &rel))
        .collect())
}

/// Read every document under `project_root/docs_dir`.
pub fn load_documents(
    project_root: &Path,
    docs_dir: &str,
    extensions: &[String],
) -> Result<Vec<Document>, WalkError> {
    let prefix = docs_dir.trim_matches('/');
    let docs_root = project_root.join(prefix);

    walk(&docs_root, extensions)?
        .into_iter()
        .map(|key| {
            let full = docs_root.join(&key);
            let bytes = fs::read(&full).map_err(|source| WalkError {
                path: full.clone(),
                source,
            })?;
            Ok(Document {
                path: join_rel(prefix, &key),
                text: String::from_utf8_lossy(&bytes).into_owned(),
                key,
            })
        })
        .collect()
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            extensions
                .iter()
                .any(|want| want.trim_start_matches('.').eq_ignore_ascii_case(ext))
        })
}

pub(crate) fn join_rel(prefix: &str, rel: &str) -> String {
    if prefix.is_empty() || prefix == "." {
        rel.to_string()
    } else {
        format!("{}/{}", prefix, rel)
    }
}

/// Normalize path separators to forward slashes.
pub fn normalize_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exts(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x").unwrap();
    }

    #[test]
    fn test_walk_filters_extensions_case_insensitively() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.PNG");
        touch(dir.path(), "nested/deep/b.svg");
        touch(dir.path(), "notes.txt");

        let found = walk(dir.path(), &exts(&["png", ".svg"])).unwrap();
        assert_eq!(found, vec!["a.PNG", "nested/deep/b.svg"]);
    }

    #[test]
    fn test_walk_missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let found = walk(&dir.path().join("absent"), &exts(&["md"])).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_inventory_prefixes_subdir() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "help/assets/x.png");

        let found = inventory(dir.path(), "help/assets/", &exts(&["png"])).unwrap();
        assert_eq!(found, vec!["help/assets/x.png"]);
    }

    #[test]
    fn test_load_documents_keys_are_docs_relative() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "help/docs/guide.md");

        let docs = load_documents(dir.path(), "help", &exts(&["md"])).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].key, "docs/guide.md");
        assert_eq!(docs[0].path, "help/docs/guide.md");
        assert_eq!(docs[0].text, "x");
    }
}
