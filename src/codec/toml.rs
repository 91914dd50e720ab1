//! TOML: parsed with `toml`, written with `toml_edit` so annotations can be
//! attached as comments (trailing on values, leading on tables).
//!
//! TOML has no null. Null-valued keys are left out of written documents; a
//! null inside an array cannot be expressed and is a codec error. Datetimes
//! parse as strings.

use std::io::Write;

use toml_edit::{Array, DocumentMut, InlineTable, Item, Table};
use tracing::debug;

use super::{DocumentCodec, parse_error, write_error};
use crate::document::{DocEntry, DocNode, Document};
use crate::error::InputError;
use crate::value::{Record, Value};

#[derive(Debug, Clone, Copy, Default)]
pub struct TomlCodec;

impl DocumentCodec for TomlCodec {
    fn format(&self) -> &'static str {
        "toml"
    }

    fn parse(&self, text: &str) -> Result<Record, InputError> {
        let table: ::toml::Table = ::toml::from_str(text).map_err(|e| parse_error("toml", e))?;
        let record = from_table(table);
        debug!(keys = record.len(), "parsed toml document");
        Ok(record)
    }

    fn write(&self, doc: &Document, out: &mut dyn Write) -> Result<(), InputError> {
        let mut document = DocumentMut::new();
        fill_table(document.as_table_mut(), &doc.entries)?;

        let mut text = String::new();
        if let Some(header) = &doc.header {
            for line in header.lines() {
                text.push_str(format!("# {line}").trim_end());
                text.push('\n');
            }
            text.push('\n');
        }
        text.push_str(&document.to_string());
        out.write_all(text.as_bytes()).map_err(write_error)
    }

    fn supports_comments(&self) -> bool {
        true
    }
}

fn from_table(table: ::toml::Table) -> Record {
    table.into_iter().map(|(k, v)| (k, from_toml(v))).collect()
}

fn from_toml(value: ::toml::Value) -> Value {
    match value {
        ::toml::Value::String(s) => Value::String(s),
        ::toml::Value::Integer(i) => Value::Integer(i),
        ::toml::Value::Float(f) => Value::Float(f),
        ::toml::Value::Boolean(b) => Value::Bool(b),
        ::toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        ::toml::Value::Array(items) => Value::List(items.into_iter().map(from_toml).collect()),
        ::toml::Value::Table(table) => Value::Map(from_table(table)),
    }
}

fn fill_table(table: &mut Table, entries: &[DocEntry]) -> Result<(), InputError> {
    for entry in entries {
        match &entry.node {
            DocNode::Section(sub) => {
                let mut child = Table::new();
                fill_table(&mut child, &sub.entries)?;
                if let Some(comment) = &entry.comment {
                    child.decor_mut().set_prefix(comment_lines(comment));
                }
                table.insert(&entry.key, Item::Table(child));
            }
            DocNode::Value(Value::Null) => {}
            DocNode::Value(value) => {
                let mut item = to_toml(value)?;
                if let Some(comment) = &entry.comment {
                    item.decor_mut()
                        .set_suffix(format!("  # {}", comment.replace('\n', " ")));
                }
                table.insert(&entry.key, Item::Value(item));
            }
        }
    }
    Ok(())
}

fn comment_lines(comment: &str) -> String {
    let mut prefix = String::from("\n");
    for line in comment.lines() {
        prefix.push_str(&format!("# {line}\n"));
    }
    prefix
}

fn to_toml(value: &Value) -> Result<toml_edit::Value, InputError> {
    Ok(match value {
        Value::Null => {
            return Err(InputError::Codec {
                format: "toml",
                reason: "null values cannot be written inside arrays".into(),
            });
        }
        Value::Bool(b) => (*b).into(),
        Value::Integer(i) => (*i).into(),
        Value::Float(f) => (*f).into(),
        Value::String(s) => s.as_str().into(),
        Value::List(items) => {
            let mut array = Array::new();
            for item in items {
                array.push(to_toml(item)?);
            }
            toml_edit::Value::Array(array)
        }
        Value::Map(record) => toml_edit::Value::InlineTable(inline_table(record)?),
    })
}

fn inline_table(record: &Record) -> Result<InlineTable, InputError> {
    let mut table = InlineTable::new();
    for (key, value) in record.iter() {
        if value.is_null() {
            continue;
        }
        table.insert(key, to_toml(value)?);
    }
    Ok(table)
}
