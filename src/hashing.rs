//! Graph Fingerprints - SHA-256 over canonical JSON

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::graph::RelationshipGraph;

/// Compute SHA-256 hash of bytes, return hex string
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// Convert to canonical JSON (sorted keys, no whitespace)
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let v = serde_json::to_value(value)?;
    serde_json::to_string(&sort_value(v))
}

fn sort_value(v: Value) -> Value {
    match v {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, sort_value(v)))
                    .collect(),
            )
        }
        Value::Array(arr) => Value::Array(arr.into_iter().map(sort_value).collect()),
        other => other,
    }
}

/// Stable fingerprint of a relationship graph's edges.
pub fn fingerprint(graph: &RelationshipGraph) -> Result<String, serde_json::Error> {
    Ok(sha256_hex(canonical_json(graph)?.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_json_sorted() {
        let obj = json!({"z": 1, "a": 2, "m": 3});
        let canonical = canonical_json(&obj).unwrap();
        assert_eq!(canonical, r#"{"a":2,"m":3,"z":1}"#);
    }

    #[test]
    fn test_fingerprint_ignores_insertion_order() {
        let mut g1 = RelationshipGraph::new();
        g1.insert("b.md", "/help/_includes/y.md");
        g1.insert("a.md", "/help/_includes/x.md");

        let mut g2 = RelationshipGraph::new();
        g2.insert("a.md", "/help/_includes/x.md");
        g2.insert("b.md", "/help/_includes/y.md");

        assert_eq!(fingerprint(&g1).unwrap(), fingerprint(&g2).unwrap());
    }

    #[test]
    fn test_fingerprint_changes_with_edges() {
        let mut graph = RelationshipGraph::new();
        let empty = fingerprint(&graph).unwrap();
        graph.insert("a.md", "/help/_includes/x.md");
        assert_ne!(empty, fingerprint(&graph).unwrap());
    }
}
