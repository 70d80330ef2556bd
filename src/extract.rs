//! Reference Extractor
//!
//! Three independent syntaxes are recognised:
//!
//! ```text
//! {{$include /help/_includes/note.md}}   include directive
//! ![alt](assets/diagram.png "title")     Markdown image
//! <img src="assets/banner.png">          HTML image tag
//! ```
//!
//! Plain mentions of a file name never count as a reference.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    Include,
    Image,
}

impl ReferenceKind {
    pub fn plural(&self) -> &'static str {
        match self {
            ReferenceKind::Include => "includes",
            ReferenceKind::Image => "images",
        }
    }
}

/// A reference as written inside one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub kind: ReferenceKind,
    /// Project-root-relative path of the referencing document.
    pub source: String,
    /// Trimmed target, exactly as written.
    pub target: String,
}

impl Reference {
    /// The target as a project-root-relative path, see [`normalize_target`].
    pub fn resolve(&self) -> Option<String> {
        normalize_target(&self.source, &self.target)
    }

    /// True when the target resolves back to the referencing document.
    pub fn is_self_reference(&self) -> bool {
        self.resolve().as_deref() == Some(self.source.as_str())
    }
}

fn include_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{\$include\s+([^}]*)\}\}").unwrap())
}

fn markdown_image_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"!\[[^\]]*\]\(\s*<?((?:\\.|[^\s()\\<>])*)>?(?:\s+(?:"[^"]*"|'[^']*'|\([^)]*\)))?\s*\)"#)
            .unwrap()
    })
}

fn html_image_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?is)<img\s(?:[^>]*?\s)?src\s*=\s*(?:"([^"]*)"|'([^']*)')[^>]*>"#).unwrap()
    })
}

/// Extract every reference in a document, in order of syntax family.
/// `source` is the document's project-root-relative path.
pub fn extract(source: &str, text: &str) -> Vec<Reference> {
    let mut refs = extract_includes(source, text);
    refs.extend(extract_images(source, text));
    refs
}

pub fn extract_kind(source: &str, text: &str, kind: ReferenceKind) -> Vec<Reference> {
    match kind {
        ReferenceKind::Include => extract_includes(source, text),
        ReferenceKind::Image => extract_images(source, text),
    }
}

pub fn extract_includes(source: &str, text: &str) -> Vec<Reference> {
    include_re()
        .captures_iter(text)
        .filter_map(|cap| accept(ReferenceKind::Include, source, cap.get(1)?.as_str()))
        .collect()
}

pub fn extract_images(source: &str, text: &str) -> Vec<Reference> {
    let markdown = markdown_image_re()
        .captures_iter(text)
        .filter_map(|cap| {
            let raw = cap.get(1)?.as_str();
            accept(ReferenceKind::Image, source, &unescape(raw))
        });

    let html = html_image_re().captures_iter(text).filter_map(|cap| {
        let raw = cap.get(1).or_else(|| cap.get(2))?.as_str();
        accept(ReferenceKind::Image, source, raw)
    });

    markdown.chain(html).collect()
}

fn accept(kind: ReferenceKind, source: &str, raw: &str) -> Option<Reference> {
    let target = raw.trim();
    if target.is_empty() {
        debug!(kind = ?kind, document = source, "discarding reference with empty target");
        return None;
    }
    Some(Reference {
        kind,
        source: source.to_string(),
        target: target.to_string(),
    })
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
                continue;
            }
        }
        out.push(c);
    }
    out
}

/// Resolve a written target to a project-root-relative path.
///
/// A leading `/` is relative to the project root, anything else to the
/// directory of `document_path`. Returns `None` for external URLs, empty
/// targets and paths that climb above the root.
pub fn normalize_target(document_path: &str, target: &str) -> Option<String> {
    let target = target.trim();
    let target = target
        .split(['#', '?'])
        .next()
        .unwrap_or_default()
        .trim();

    if target.is_empty() || target.contains("://") || target.starts_with("data:") {
        debug!(path = target, document = document_path, "discarding unresolvable target");
        return None;
    }

    let mut parts: Vec<&str> = Vec::new();
    let tail = if let Some(abs) = target.strip_prefix('/') {
        abs
    } else {
        if let Some((dir, _)) = document_path.rsplit_once('/') {
            parts.extend(dir.split('/').filter(|p| !p.is_empty()));
        }
        target
    };

    for segment in tail.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                if parts.pop().is_none() {
                    debug!(path = target, document = document_path, "target escapes the root");
                    return None;
                }
            }
            other => parts.push(other),
        }
    }

    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}
