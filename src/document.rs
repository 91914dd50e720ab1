//! Document generation: a default-populated instance of a schema, annotated
//! with each field's help text.
//!
//! A [`Document`] is what codecs write. It carries the same data a [`Record`]
//! would, plus an optional header and a per-entry comment. Codecs that cannot
//! express comments drop them.

use crate::schema::{FieldDescriptor, Schema, TypeSpec};
use crate::value::{Record, Value};

/// An ordered, annotated tree of default values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    /// Free text emitted at the top of the document.
    pub header: Option<String>,
    pub entries: Vec<DocEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocEntry {
    pub key: String,
    pub node: DocNode,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DocNode {
    Value(Value),
    Section(Document),
}

impl DocNode {
    pub fn into_value(self) -> Value {
        match self {
            DocNode::Value(v) => v,
            DocNode::Section(doc) => Value::Map(doc.to_record()),
        }
    }
}

/// What to include when generating a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentOptions {
    /// Include optional fields, not just required ones.
    pub include_optional: bool,
    /// Append `[Required: .., default: ..]` to every help comment.
    pub extended_help: bool,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self {
            include_optional: true,
            extended_help: true,
        }
    }
}

impl Document {
    /// Build a document from an already resolved record, without comments.
    pub fn from_record(record: &Record) -> Self {
        let entries = record
            .iter()
            .map(|(key, value)| DocEntry {
                key: key.to_string(),
                node: match value {
                    Value::Map(sub) => DocNode::Section(Document::from_record(sub)),
                    other => DocNode::Value(other.clone()),
                },
                comment: None,
            })
            .collect();
        Self {
            header: None,
            entries,
        }
    }

    pub fn get(&self, key: &str) -> Option<&DocEntry> {
        self.entries.iter().find(|e| e.key == key)
    }

    /// Strip annotations and return the plain data.
    pub fn to_record(&self) -> Record {
        self.entries
            .iter()
            .map(|entry| {
                (entry.key.clone(), entry.node.clone().into_value())
            })
            .collect()
    }

    /// Nest the whole document under a single top-level key. The header stays
    /// at the top.
    pub fn wrap(mut self, key: &str) -> Self {
        let header = self.header.take();
        Self {
            header,
            entries: vec![DocEntry {
                key: key.to_string(),
                node: DocNode::Section(self),
                comment: None,
            }],
        }
    }
}

/// Generate the default document for `schema`.
///
/// Required fields are always present; optional ones only when requested.
/// Nested schemas become sections, recursively under the same rule.
/// List-of-schema fields carry their declared default list with every element
/// completed from the element schema.
pub fn generate(schema: &Schema, opts: DocumentOptions) -> Document {
    let entries = schema
        .fields()
        .iter()
        .filter(|field| field.is_required() || opts.include_optional)
        .map(|field| DocEntry {
            key: field.key().to_string(),
            node: default_node(field, opts),
            comment: annotation(field, opts.extended_help),
        })
        .collect();
    Document {
        header: None,
        entries,
    }
}

/// The full default record (optional fields included) of `schema`.
pub fn defaults(schema: &Schema) -> Record {
    generate(schema, DocumentOptions::default()).to_record()
}

fn default_node(field: &FieldDescriptor, opts: DocumentOptions) -> DocNode {
    match field.type_spec() {
        TypeSpec::Nested(sub) => DocNode::Section(generate(sub, opts)),
        TypeSpec::ListOf(sub) => {
            let value = match field.default_value() {
                Value::List(items) => Value::List(
                    items
                        .iter()
                        .map(|item| complete_element(item, sub, opts))
                        .collect(),
                ),
                other => other.clone(),
            };
            DocNode::Value(value)
        }
        TypeSpec::Any | TypeSpec::OneOf(_) => DocNode::Value(field.default_value().clone()),
    }
}

/// Fill a declared list element from the element schema's defaults.
fn complete_element(item: &Value, schema: &Schema, opts: DocumentOptions) -> Value {
    let Value::Map(given) = item else {
        return item.clone();
    };
    if schema.is_empty() {
        return item.clone();
    }
    let record = schema
        .fields()
        .iter()
        .filter(|field| field.is_required() || opts.include_optional)
        .map(|field| {
            let value = match (given.get(field.key()), field.type_spec()) {
                (Some(v @ Value::Map(_)), TypeSpec::Nested(sub)) => complete_element(v, sub, opts),
                (Some(v), _) => v.clone(),
                (None, _) => default_node(field, opts).into_value(),
            };
            (field.key().to_string(), value)
        })
        .collect();
    Value::Map(record)
}

fn annotation(field: &FieldDescriptor, extended: bool) -> Option<String> {
    let help = field.help_text();
    if help.is_empty() {
        return None;
    }
    if !extended {
        return Some(help.to_string());
    }
    let required = if field.is_required() { "True" } else { "False" };
    let default = if field.type_spec().is_nested() {
        "{}".to_string()
    } else {
        field.default_value().to_literal()
    };
    Some(format!("{help} [Required: {required}, default: {default}]"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{main_schema, server_schema};

    fn required_only() -> DocumentOptions {
        DocumentOptions {
            include_optional: false,
            ..DocumentOptions::default()
        }
    }

    #[test]
    fn full_document_has_every_field_in_order() {
        let doc = generate(&main_schema(), DocumentOptions::default());
        let keys: Vec<&str> = doc.entries.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["name", "intval", "floatval", "boolval", "subdict"]);
        let record = doc.to_record();
        assert_eq!(record["floatval"], Value::from(0.123));
        assert_eq!(
            record["subdict"].get("mylist"),
            Some(&Value::from(vec![1, 2, 3, 5]))
        );
    }

    #[test]
    fn required_only_recurses() {
        let record = generate(&main_schema(), required_only()).to_record();
        let keys: Vec<&str> = record.keys().collect();
        assert_eq!(keys, vec!["name", "intval", "subdict"]);
        let sub = record["subdict"].as_record().unwrap();
        assert_eq!(sub.keys().collect::<Vec<_>>(), vec!["name"]);
    }

    #[test]
    fn extended_annotation() {
        let doc = generate(&main_schema(), DocumentOptions::default());
        assert_eq!(
            doc.get("name").unwrap().comment.as_deref(),
            Some("An arbitrary name [Required: True, default: 'myname']")
        );
        assert_eq!(
            doc.get("subdict").unwrap().comment.as_deref(),
            Some("A required subdictionary [Required: True, default: {}]")
        );
    }

    #[test]
    fn plain_annotation() {
        let opts = DocumentOptions {
            extended_help: false,
            ..DocumentOptions::default()
        };
        let doc = generate(&main_schema(), opts);
        assert_eq!(
            doc.get("boolval").unwrap().comment.as_deref(),
            Some("An arbitrary boolean")
        );
    }

    #[test]
    fn list_default_elements_completed() {
        let record = defaults(&server_schema());
        let servers = record["servers"].as_list().unwrap();
        assert_eq!(servers[0].get("host"), Some(&Value::from("primary")));
        assert_eq!(servers[0].get("port"), Some(&Value::from(8080)));
    }

    #[test]
    fn wrap_keeps_header_on_top() {
        let mut doc = generate(&main_schema(), DocumentOptions::default());
        doc.header = Some("header".into());
        let wrapped = doc.wrap("inputs");
        assert_eq!(wrapped.header.as_deref(), Some("header"));
        assert_eq!(wrapped.entries.len(), 1);
        assert!(matches!(&wrapped.entries[0].node, DocNode::Section(d) if d.header.is_none()));
    }

    #[test]
    fn from_record_roundtrip() {
        let record = defaults(&main_schema());
        assert_eq!(Document::from_record(&record).to_record(), record);
    }
}
