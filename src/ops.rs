//! Results of [`Action`](crate::Action)s and the flattened listing of a
//! resolved record.

use std::fmt;
use std::path::PathBuf;

use crate::validate::join_path;
use crate::value::{Record, Value};

/// Result of an action. Returned to the caller for display.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionResult {
    /// A generated document.
    Document(String),
    /// Confirmation that a generated document was written to a file.
    DocumentWritten { path: PathBuf },
    /// Every leaf of a resolved record as `(dotted path, value)`.
    Listing { entries: Vec<(String, String)> },
}

impl fmt::Display for ActionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionResult::Document(text) => write!(f, "{text}"),
            ActionResult::DocumentWritten { path } => {
                write!(f, "Document written to {}", path.display())
            }
            ActionResult::Listing { entries } => {
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{key} = {value}")?;
                }
                Ok(())
            }
        }
    }
}

/// List a resolved record as flattened dotted key-value pairs.
///
/// Mappings are recursed into; lists of mappings are expanded with indexed
/// paths (`servers[0].host`). Every other value is a leaf.
pub fn list_record(record: &Record) -> ActionResult {
    let mut entries = Vec::new();
    flatten_into(record, "", &mut entries);
    ActionResult::Listing { entries }
}

fn flatten_into(record: &Record, prefix: &str, out: &mut Vec<(String, String)>) {
    for (key, value) in record.iter() {
        let path = join_path(prefix, key);
        flatten_value(value, path, out);
    }
}

fn flatten_value(value: &Value, path: String, out: &mut Vec<(String, String)>) {
    match value {
        Value::Map(sub) if !sub.is_empty() => flatten_into(sub, &path, out),
        Value::List(items) if !items.is_empty() && items.iter().all(|v| v.as_record().is_some()) => {
            for (i, item) in items.iter().enumerate() {
                flatten_value(item, format!("{path}[{i}]"), out);
            }
        }
        other => out.push((path, format_value(other))),
    }
}

/// Format a leaf for display: strings bare, everything else as a literal.
fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_literal(),
    }
}
