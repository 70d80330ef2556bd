//! Orphan Reporter
//!
//! Inventory files nothing references are reported as dangling.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::extract::ReferenceKind;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrphanReport {
    pub kind: ReferenceKind,
    /// Inventory size.
    pub total: usize,
    /// Number of orphans.
    pub unused: usize,
    /// Unreferenced inventory paths, sorted.
    pub orphans: Vec<String>,
}

impl OrphanReport {
    pub fn is_clean(&self) -> bool {
        self.orphans.is_empty()
    }

    /// Human-readable report lines.
    pub fn lines(&self) -> Vec<String> {
        let noun = self.kind.plural();
        let mut lines = vec![format!("Checked a total of {} {}.", self.total, noun)];

        if self.orphans.is_empty() {
            lines.push(format!("No unlinked {} found.", noun));
            return lines;
        }

        lines.push(format!(
            "Found {} dangling {} (not referenced by any document):",
            self.unused, noun
        ));
        lines.extend(self.orphans.iter().map(|path| format!("  - {}", path)));
        lines
    }
}

/// Compare an inventory against the normalized referenced set.
pub fn find_orphans(
    kind: ReferenceKind,
    inventory: &[String],
    referenced: &BTreeSet<String>,
) -> OrphanReport {
    let unique: BTreeSet<&String> = inventory.iter().collect();
    let orphans: Vec<String> = unique
        .iter()
        .filter(|path| !referenced.contains(path.as_str()))
        .map(|path| path.to_string())
        .collect();

    OrphanReport {
        kind,
        total: unique.len(),
        unused: orphans.len(),
        orphans,
    }
}
