//! YAML, plain and commented.
//!
//! Both codecs parse through serde_yaml. [`YamlCodec`] also writes through
//! serde_yaml and so drops annotations. [`CommentedYamlCodec`] renders block
//! YAML by hand: sections are indented mappings, leaf values are written in
//! flow style, and every annotated entry carries a trailing comment starting
//! at [`COMMENT_COLUMN`].

use std::io::Write;

use tracing::debug;

use super::{DocumentCodec, parse_error, top_level, write_error};
use crate::document::{DocEntry, DocNode, Document};
use crate::error::InputError;
use crate::value::{Record, Value};

/// Column at which trailing comments start.
pub const COMMENT_COLUMN: usize = 40;

const INDENT: usize = 2;

fn parse_yaml(text: &str) -> Result<Record, InputError> {
    let value: Value = serde_yaml::from_str(text).map_err(|e| parse_error("yaml", e))?;
    let record = top_level("yaml", value)?;
    debug!(keys = record.len(), "parsed yaml document");
    Ok(record)
}

/// YAML through serde_yaml, without comments.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlCodec;

impl DocumentCodec for YamlCodec {
    fn format(&self) -> &'static str {
        "yaml"
    }

    fn parse(&self, text: &str) -> Result<Record, InputError> {
        parse_yaml(text)
    }

    fn write(&self, doc: &Document, out: &mut dyn Write) -> Result<(), InputError> {
        serde_yaml::to_writer(out, &doc.to_record()).map_err(|e| InputError::Codec {
            format: "yaml",
            reason: e.to_string(),
        })
    }
}

/// YAML with the global help as a header and annotations as trailing
/// comments.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommentedYamlCodec;

impl DocumentCodec for CommentedYamlCodec {
    fn format(&self) -> &'static str {
        "yaml"
    }

    fn parse(&self, text: &str) -> Result<Record, InputError> {
        parse_yaml(text)
    }

    fn write(&self, doc: &Document, out: &mut dyn Write) -> Result<(), InputError> {
        let mut text = String::new();
        if let Some(header) = &doc.header {
            for line in header.lines() {
                push_comment_line(&mut text, line);
            }
        }
        if doc.entries.is_empty() {
            text.push_str("{}\n");
        }
        render_entries(&doc.entries, 0, &mut text);
        out.write_all(text.as_bytes()).map_err(write_error)
    }

    fn supports_comments(&self) -> bool {
        true
    }
}

fn push_comment_line(text: &mut String, line: &str) {
    if line.is_empty() {
        text.push_str("#\n");
    } else {
        text.push_str("# ");
        text.push_str(line);
        text.push('\n');
    }
}

fn render_entries(entries: &[DocEntry], depth: usize, text: &mut String) {
    for entry in entries {
        let mut line = " ".repeat(depth * INDENT);
        line.push_str(&flow_key(&entry.key));
        line.push(':');
        let children = match &entry.node {
            DocNode::Section(sub) if !sub.entries.is_empty() => Some(sub),
            DocNode::Section(_) => {
                line.push_str(" {}");
                None
            }
            DocNode::Value(value) => {
                line.push(' ');
                line.push_str(&flow_value(value));
                None
            }
        };
        if let Some(comment) = &entry.comment {
            append_comment(&mut line, comment);
        }
        text.push_str(&line);
        text.push('\n');
        if let Some(sub) = children {
            render_entries(&sub.entries, depth + 1, text);
        }
    }
}

fn append_comment(line: &mut String, comment: &str) {
    let width = line.chars().count();
    if width < COMMENT_COLUMN {
        line.push_str(&" ".repeat(COMMENT_COLUMN - width));
    } else {
        line.push(' ');
    }
    line.push_str("# ");
    // A trailing comment cannot span lines.
    line.push_str(&comment.replace('\n', " "));
}

/// A value in YAML flow syntax.
fn flow_value(value: &Value) -> String {
    match value {
        Value::Null => "null".into(),
        Value::Bool(b) => b.to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Float(f) if f.is_nan() => ".nan".into(),
        Value::Float(f) if f.is_infinite() => {
            if *f > 0.0 { ".inf".into() } else { "-.inf".into() }
        }
        Value::Float(f) => crate::value::format_float(*f),
        Value::String(s) => flow_string(s),
        Value::List(items) => {
            let items: Vec<String> = items.iter().map(flow_value).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Map(record) => {
            let items: Vec<String> = record
                .iter()
                .map(|(k, v)| format!("{}: {}", flow_key(k), flow_value(v)))
                .collect();
            format!("{{{}}}", items.join(", "))
        }
    }
}

fn flow_key(key: &str) -> String {
    flow_string(key)
}

/// Plain scalar when it is unambiguous in both block and flow context,
/// otherwise a double-quoted (JSON-compatible) scalar.
fn flow_string(s: &str) -> String {
    if is_plain_safe(s) {
        return s.to_string();
    }
    serde_json::to_string(s).unwrap_or_else(|_| format!("{s:?}"))
}

const RESERVED: &[&str] = &[
    "null", "Null", "NULL", "~", "true", "True", "TRUE", "false", "False", "FALSE", "yes", "Yes",
    "YES", "no", "No", "NO", "on", "On", "ON", "off", "Off", "OFF", "y", "Y", "n", "N",
];

fn is_plain_safe(s: &str) -> bool {
    let Some(first) = s.chars().next() else {
        return false;
    };
    if !(first.is_ascii_alphabetic() || first == '_' || first == '/') {
        return false;
    }
    if s.ends_with(' ') || RESERVED.contains(&s) {
        return false;
    }
    s.chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '/' | ' '))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocumentOptions, generate};
    use crate::fixtures::test::{HEADER, main_schema, server_schema};

    #[test]
    fn parse_scenario_document() {
        let text = "name: junk\nintval: 111\nfloatval: 100\nsubdict:\n  name: subdictname\n";
        let record = YamlCodec.parse(text).unwrap();
        assert_eq!(record["intval"], Value::from(111));
        assert_eq!(record["floatval"], Value::from(100));
        assert_eq!(record["subdict"].get("name"), Some(&Value::from("subdictname")));
    }

    #[test]
    fn parse_empty_is_empty_record() {
        assert!(YamlCodec.parse("").unwrap().is_empty());
        assert!(YamlCodec.parse("# only a comment\n").unwrap().is_empty());
    }

    #[test]
    fn parse_rejects_list_document() {
        let err = YamlCodec.parse("- a\n- b\n").unwrap_err();
        assert!(matches!(err, InputError::Parse { format: "yaml", .. }));
    }

    #[test]
    fn parse_rejects_broken_yaml() {
        assert!(YamlCodec.parse("a: [1, 2\n").is_err());
    }

    #[test]
    fn commented_output_layout() {
        let mut doc = generate(&main_schema(), DocumentOptions::default());
        doc.header = Some(HEADER.into());
        let text = CommentedYamlCodec.render(&doc).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "# This is a test of inputdict");
        assert_eq!(lines[1], "# These are the inputs");
        assert!(lines[2].starts_with("name: myname "));
        assert_eq!(lines[2].find('#'), Some(COMMENT_COLUMN));
        assert!(lines[2].ends_with("# An arbitrary name [Required: True, default: 'myname']"));
        let sub = lines.iter().position(|l| l.starts_with("subdict:")).unwrap();
        assert!(lines[sub + 1].starts_with("  name: mysubdict"));
        assert!(lines[sub + 2].starts_with("  mylist: [1, 2, 3, 5]"));
    }

    #[test]
    fn commented_output_parses_back() {
        let doc = generate(&server_schema(), DocumentOptions::default());
        let text = CommentedYamlCodec.render(&doc).unwrap();
        assert_eq!(CommentedYamlCodec.parse(&text).unwrap(), doc.to_record());
    }

    #[test]
    fn plain_output_has_no_comments() {
        let doc = generate(&main_schema(), DocumentOptions::default());
        let text = YamlCodec.render(&doc).unwrap();
        assert!(!text.contains('#'));
        assert_eq!(YamlCodec.parse(&text).unwrap(), doc.to_record());
    }

    #[test]
    fn ambiguous_strings_are_quoted() {
        assert_eq!(flow_string("myname"), "myname");
        assert_eq!(flow_string("true"), "\"true\"");
        assert_eq!(flow_string("123"), "\"123\"");
        assert_eq!(flow_string("a: b"), "\"a: b\"");
        assert_eq!(flow_string(""), "\"\"");
        assert_eq!(flow_string("line\nbreak"), "\"line\\nbreak\"");
    }

    #[test]
    fn tricky_values_survive() {
        let record: Record = [
            ("empty", Value::from("")),
            ("colon", Value::from("x: y, z")),
            ("hash", Value::from("# not a comment")),
            ("nothing", Value::Null),
            ("nested", Value::from(vec![Value::from(vec![1, 2]), Value::from("[x]")])),
            ("neg", Value::from(-1.5)),
        ]
        .into_iter()
        .collect();
        let text = CommentedYamlCodec
            .render(&Document::from_record(&record))
            .unwrap();
        assert_eq!(CommentedYamlCodec.parse(&text).unwrap(), record);
    }

    #[test]
    fn long_lines_still_get_a_space_before_comments() {
        let mut line = "x".repeat(COMMENT_COLUMN + 5);
        append_comment(&mut line, "help");
        assert!(line.ends_with("xxxxx # help"));
    }
}
