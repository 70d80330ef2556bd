//! Front-matter timestamps for documents that embed includes.

use chrono::{DateTime, NaiveDate, Utc};
use serde_yaml::{Mapping, Value};
use std::fs;
use std::io;
use std::path::Path;
use tracing::debug;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Outcome of refreshing one document's timestamp field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Refresh {
    NoFrontMatter,
    UpToDate,
    Updated(String),
}

/// Lines of a document opening with a `---` block, plus the closing fence line index.
fn front_matter_lines(text: &str) -> Option<(Vec<&str>, usize)> {
    let lines: Vec<&str> = text.split_inclusive('\n').collect();
    let first = lines.first()?;
    if first.trim_start_matches('\u{feff}').trim_end() != "---" {
        return None;
    }
    let close = lines
        .iter()
        .skip(1)
        .position(|l| matches!(l.trim_end(), "---" | "..."))?
        + 1;
    Some((lines, close))
}

/// Key of a top-level `key: value` line. Indented lines belong to a nested
/// mapping or a block scalar and never match.
fn key_of(line: &str) -> Option<&str> {
    if line.starts_with([' ', '\t']) {
        return None;
    }
    line.split_once(':')
        .map(|(k, _)| k.trim().trim_matches(['"', '\'']))
}

/// Parse the front matter block as a YAML mapping.
pub fn front_matter(text: &str) -> Option<Mapping> {
    let (lines, close) = front_matter_lines(text)?;
    let block = lines[1..close].concat();
    match serde_yaml::from_str::<Value>(&block) {
        Ok(Value::Mapping(map)) => Some(map),
        Ok(Value::Null) => Some(Mapping::new()),
        Ok(_) => None,
        Err(e) => {
            debug!(error = %e, "front matter is not valid YAML");
            None
        }
    }
}

/// Top-level scalar `key` of the front matter, rendered as text.
pub fn read_field(text: &str, key: &str) -> Option<String> {
    match front_matter(text)?.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Set `key: value` inside the front matter, replacing an existing line or
/// appending before the closing fence.
pub fn set_field(text: &str, key: &str, value: &str) -> Option<String> {
    let (lines, close) = front_matter_lines(text)?;
    let mut out = String::with_capacity(text.len() + key.len() + value.len() + 4);
    let mut replaced = false;

    for (idx, line) in lines.iter().enumerate() {
        if idx > 0 && idx < close && !replaced && key_of(line) == Some(key) {
            let eol = if line.ends_with("\r\n") { "\r\n" } else { "\n" };
            out.push_str(&format!("{}: {}{}", key, value, eol));
            replaced = true;
            continue;
        }
        if idx == close && !replaced {
            out.push_str(&format!("{}: {}\n", key, value));
        }
        out.push_str(line);
    }
    Some(out)
}

/// Parse a recorded date, accepting `YYYY-MM-DD` or a full RFC 3339 timestamp.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(value.trim())
                .ok()
                .map(|dt| dt.with_timezone(&Utc).date_naive())
        })
}

pub fn modified_date(path: &Path) -> io::Result<NaiveDate> {
    let modified = fs::metadata(path)?.modified()?;
    Ok(DateTime::<Utc>::from(modified).date_naive())
}

/// Bring `key` up to `newest` unless the recorded date is already as recent.
pub fn refresh(text: &str, key: &str, newest: NaiveDate) -> Refresh {
    if front_matter_lines(text).is_none() {
        return Refresh::NoFrontMatter;
    }
    let recorded = read_field(text, key).as_deref().and_then(parse_date);
    if recorded.is_some_and(|date| date >= newest) {
        return Refresh::UpToDate;
    }
    match set_field(text, key, &newest.format(DATE_FORMAT).to_string()) {
        Some(updated) => Refresh::Updated(updated),
        None => Refresh::NoFrontMatter,
    }
}
