//! INI files.
//!
//! ```ini
//! [DEFAULT]
//! name = myname
//! intval = 0
//!
//! [subdict]
//! name = mysubdict
//! mylist = [1, 2, 3, 5]
//! ```
//!
//! Keys of the default section, and keys before any section header, land at
//! the top level of the parsed record; every other section becomes a nested
//! mapping. All parsed values are strings, so the engine coerces them to
//! their declared types. Writing is the inverse: top-level scalars go to the
//! default section, mappings become sections. Strings are written as-is,
//! everything else in literal syntax.

use std::io::Write;

use tracing::debug;

use super::{DocumentCodec, parse_error, write_error};
use crate::document::{DocNode, Document};
use crate::error::InputError;
use crate::value::{Record, Value};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IniCodec {
    default_section: String,
}

impl Default for IniCodec {
    fn default() -> Self {
        Self {
            default_section: "DEFAULT".to_string(),
        }
    }
}

impl IniCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use another name for the section whose keys are top-level.
    pub fn default_section(mut self, name: &str) -> Self {
        self.default_section = name.to_string();
        self
    }
}

enum Target {
    Top,
    Section(usize),
}

struct Parsed {
    top: Record,
    sections: Vec<(String, Record)>,
}

impl Parsed {
    fn table(&mut self, target: &Target) -> &mut Record {
        match target {
            Target::Top => &mut self.top,
            Target::Section(i) => &mut self.sections[*i].1,
        }
    }
}

impl DocumentCodec for IniCodec {
    fn format(&self) -> &'static str {
        "ini"
    }

    fn parse(&self, text: &str) -> Result<Record, InputError> {
        let mut parsed = Parsed {
            top: Record::new(),
            sections: Vec::new(),
        };
        let mut target = Target::Top;
        // Key of the last option, while continuation lines may follow.
        let mut open_key: Option<String> = None;
        // Blank lines seen since; kept only if another continuation line follows.
        let mut blank_run = 0;

        for (index, line) in text.lines().enumerate() {
            let lineno = index + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                if open_key.is_some() {
                    blank_run += 1;
                }
                continue;
            }
            if trimmed.starts_with('#') || trimmed.starts_with(';') {
                continue;
            }
            if line.starts_with([' ', '\t'])
                && let Some(key) = &open_key
            {
                if let Some(Value::String(value)) = parsed.table(&target).get_mut(key) {
                    value.push_str(&"\n".repeat(blank_run + 1));
                    value.push_str(trimmed);
                }
                blank_run = 0;
                continue;
            }
            blank_run = 0;
            if let Some(name) = trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
                let name = name.trim();
                open_key = None;
                if name == self.default_section {
                    target = Target::Top;
                } else if parsed.sections.iter().any(|(n, _)| n == name) {
                    return Err(parse_error(
                        "ini",
                        format!("line {lineno}: section '{name}' already exists"),
                    ));
                } else {
                    parsed.sections.push((name.to_string(), Record::new()));
                    target = Target::Section(parsed.sections.len() - 1);
                }
                continue;
            }
            let Some(split) = trimmed.find(['=', ':']) else {
                return Err(parse_error(
                    "ini",
                    format!("line {lineno}: expected 'key = value', got {trimmed:?}"),
                ));
            };
            let key = trimmed[..split].trim();
            let value = trimmed[split + 1..].trim();
            if key.is_empty() {
                return Err(parse_error("ini", format!("line {lineno}: empty key")));
            }
            let table = parsed.table(&target);
            if table.contains_key(key) {
                return Err(parse_error(
                    "ini",
                    format!("line {lineno}: option '{key}' already exists"),
                ));
            }
            table.insert(key, value);
            open_key = Some(key.to_string());
        }

        let Parsed { mut top, sections } = parsed;
        for (name, table) in sections {
            if top.contains_key(&name) {
                return Err(parse_error(
                    "ini",
                    format!("section '{name}' clashes with a key of the default section"),
                ));
            }
            top.insert(name, table);
        }
        debug!(keys = top.len(), "parsed ini document");
        Ok(top)
    }

    fn write(&self, doc: &Document, out: &mut dyn Write) -> Result<(), InputError> {
        let mut text = String::new();
        text.push_str(&format!("[{}]\n", self.default_section));
        for entry in &doc.entries {
            match &entry.node {
                DocNode::Value(Value::Map(_)) | DocNode::Section(_) => {}
                DocNode::Value(value) => push_option(&mut text, &entry.key, value),
            }
        }
        for entry in &doc.entries {
            let table = match &entry.node {
                DocNode::Section(sub) => sub.to_record(),
                DocNode::Value(Value::Map(record)) => record.clone(),
                DocNode::Value(_) => continue,
            };
            text.push_str(&format!("\n[{}]\n", entry.key));
            for (key, value) in table.iter() {
                push_option(&mut text, key, value);
            }
        }
        out.write_all(text.as_bytes()).map_err(write_error)
    }

    fn coerces_scalars(&self) -> bool {
        true
    }
}

fn push_option(text: &mut String, key: &str, value: &Value) {
    let rendered = match value {
        Value::String(s) => s.clone(),
        other => other.to_literal(),
    };
    text.push_str(key);
    text.push_str(" = ");
    // Multi-line strings continue on indented lines.
    text.push_str(&rendered.replace('\n', "\n    "));
    text.push('\n');
}
