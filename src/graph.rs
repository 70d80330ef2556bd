//! Relationship Graph - document to include edges

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::extract::{extract_includes, extract_kind, ReferenceKind};
use crate::walker::Document;

/// Source document key -> include targets as written.
///
/// Documents without any include edge are not stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationshipGraph {
    edges: BTreeMap<String, BTreeSet<String>>,
}

impl RelationshipGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the include graph for a set of documents.
    ///
    /// Edges are distinct per resolved path. When one document spells the
    /// same include several ways, the first spelling is the one stored.
    pub fn build(documents: &[Document]) -> Self {
        let mut graph = Self::new();
        for doc in documents {
            let mut seen = BTreeSet::new();
            for reference in extract_includes(&doc.path, &doc.text) {
                let Some(resolved) = reference.resolve() else {
                    continue;
                };
                if resolved == doc.path || !seen.insert(resolved) {
                    continue;
                }
                graph.insert(&doc.key, &reference.target);
            }
        }
        graph
    }

    pub fn insert(&mut self, source: &str, target: &str) {
        self.edges
            .entry(source.to_string())
            .or_default()
            .insert(target.to_string());
    }

    pub fn targets(&self, source: &str) -> Option<&BTreeSet<String>> {
        self.edges.get(source)
    }

    /// Iterate `(source, targets)` in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeSet<String>)> {
        self.edges.iter()
    }

    /// Every `(source, target)` pair, sorted.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.edges
            .iter()
            .flat_map(|(s, ts)| ts.iter().map(move |t| (s.as_str(), t.as_str())))
    }

    /// Number of source documents with at least one edge.
    pub fn source_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of edges, not documents.
    pub fn total_relationships(&self) -> usize {
        self.edges.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

impl FromIterator<(String, Vec<String>)> for RelationshipGraph {
    fn from_iter<I: IntoIterator<Item = (String, Vec<String>)>>(iter: I) -> Self {
        let mut graph = Self::new();
        for (source, targets) in iter {
            for target in targets {
                graph.insert(&source, &target);
            }
        }
        graph
    }
}

/// Union of normalized targets of one kind across all documents.
///
/// A document referencing itself does not count.
pub fn referenced_targets(documents: &[Document], kind: ReferenceKind) -> BTreeSet<String> {
    documents
        .iter()
        .flat_map(|doc| {
            extract_kind(&doc.path, &doc.text, kind)
                .into_iter()
                .filter_map(move |r| r.resolve().filter(|resolved| *resolved != doc.path))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(path: &str, text: &str) -> Document {
        Document {
            path: format!("help/{}", path),
            key: path.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_build_collapses_duplicates() {
        let docs = vec![doc(
            "guide.md",
            "{{$include /help/_includes/a.md}}\n{{$include /help/_includes/a.md}}",
        )];
        let graph = RelationshipGraph::build(&docs);
        assert_eq!(graph.total_relationships(), 1);
        assert_eq!(graph.source_count(), 1);
    }

    #[test]
    fn test_build_collapses_spellings_of_one_include() {
        let docs = vec![doc(
            "doc.md",
            "{{$include /help/_includes/a.md}}\n{{$include _includes/a.md}}\n{{$include ./_includes/a.md}}",
        )];
        let graph = RelationshipGraph::build(&docs);
        assert_eq!(graph.total_relationships(), 1);
        let edges: Vec<_> = graph.edges().collect();
        assert_eq!(edges, vec![("doc.md", "/help/_includes/a.md")]);
    }

    #[test]
    fn test_build_omits_documents_without_includes() {
        let docs = vec![doc("plain.md", "No includes, just _includes/a.md text")];
        let graph = RelationshipGraph::build(&docs);
        assert!(graph.is_empty());
        assert_eq!(graph.total_relationships(), 0);
    }

    #[test]
    fn test_build_drops_self_edges_and_unresolvable() {
        let docs = vec![doc(
            "_includes/a.md",
            "{{$include /help/_includes/a.md}} {{$include ../../../x.md}} {{$include b.md}}",
        )];
        let graph = RelationshipGraph::build(&docs);
        let targets: Vec<_> = graph.edges().collect();
        assert_eq!(targets, vec![("_includes/a.md", "b.md")]);
    }

    #[test]
    fn test_build_is_order_independent() {
        let a = doc("a.md", "{{$include /help/_includes/x.md}}");
        let b = doc("b.md", "{{$include /help/_includes/y.md}}");
        let g1 = RelationshipGraph::build(&[a.clone(), b.clone()]);
        let g2 = RelationshipGraph::build(&[b, a]);
        assert_eq!(g1, g2);
    }

    #[test]
    fn test_referenced_targets_normalizes_both_forms() {
        let docs = vec![
            doc("doc.md", "![](assets/a.png)"),
            doc("sub/page.md", "<img src=\"/help/assets/b.png\">"),
        ];
        let refs = referenced_targets(&docs, ReferenceKind::Image);
        assert!(refs.contains("help/assets/a.png"));
        assert!(refs.contains("help/assets/b.png"));
        assert_eq!(refs.len(), 2);
    }

    #[test]
    fn test_referenced_targets_ignores_self_includes() {
        let docs = vec![
            doc("_includes/loop.md", "{{$include /help/_includes/loop.md}}"),
            doc("_includes/used.md", "{{$include other.md}}"),
        ];
        let refs = referenced_targets(&docs, ReferenceKind::Include);
        assert!(!refs.contains("help/_includes/loop.md"));
        assert!(refs.contains("help/_includes/other.md"));
        assert!(RelationshipGraph::build(&docs[..1]).is_empty());
    }
}
