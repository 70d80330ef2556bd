//! Incremental comparison between a persisted graph and a fresh scan.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::graph::RelationshipGraph;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphDiff {
    pub added: Vec<Edge>,
    pub removed: Vec<Edge>,
}

impl GraphDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    pub fn lines(&self) -> Vec<String> {
        let added = self
            .added
            .iter()
            .map(|e| format!("  + {} -> {}", e.source, e.target));
        let removed = self
            .removed
            .iter()
            .map(|e| format!("  - {} -> {}", e.source, e.target));
        added.chain(removed).collect()
    }
}

fn edge_set(graph: &RelationshipGraph) -> BTreeSet<Edge> {
    graph
        .edges()
        .map(|(source, target)| Edge {
            source: source.to_string(),
            target: target.to_string(),
        })
        .collect()
}

pub fn diff(previous: &RelationshipGraph, current: &RelationshipGraph) -> GraphDiff {
    let before = edge_set(previous);
    let after = edge_set(current);

    GraphDiff {
        added: after.difference(&before).cloned().collect(),
        removed: before.difference(&after).cloned().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_graphs() {
        let mut graph = RelationshipGraph::new();
        graph.insert("a.md", "/help/_includes/x.md");
        assert!(diff(&graph, &graph.clone()).is_empty());
    }

    #[test]
    fn test_added_and_removed_sorted() {
        let mut before = RelationshipGraph::new();
        before.insert("a.md", "/help/_includes/x.md");
        before.insert("b.md", "/help/_includes/y.md");

        let mut after = RelationshipGraph::new();
        after.insert("b.md", "/help/_includes/y.md");
        after.insert("c.md", "/help/_includes/z.md");
        after.insert("a.md", "/help/_includes/w.md");

        let d = diff(&before, &after);
        assert_eq!(
            d.added,
            vec![
                Edge { source: "a.md".into(), target: "/help/_includes/w.md".into() },
                Edge { source: "c.md".into(), target: "/help/_includes/z.md".into() },
            ]
        );
        assert_eq!(
            d.removed,
            vec![Edge { source: "a.md".into(), target: "/help/_includes/x.md".into() }]
        );
        assert_eq!(d.lines()[0], "  + a.md -> /help/_includes/w.md");
    }
}
