//! The dynamic value tree that raw sources parse into and records are made of.
//!
//! [`Value`] is deliberately small: the seven [`Kind`]s cover everything the
//! supported formats can express. [`Record`] is an insertion-ordered mapping so
//! documents keep schema order when written back out, while equality ignores
//! order (a record is a mapping, not a sequence).

use std::fmt;
use std::ops::Index;

use indexmap::IndexMap;
use serde::de::{self, DeserializeOwned, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};

use crate::error::InputError;

/// A dynamically typed configuration value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(Record),
}

/// The runtime kind of a [`Value`], used by type checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Null,
    Bool,
    Integer,
    Float,
    String,
    List,
    Map,
}

impl Kind {
    pub fn name(self) -> &'static str {
        match self {
            Kind::Null => "null",
            Kind::Bool => "bool",
            Kind::Integer => "int",
            Kind::Float => "float",
            Kind::String => "str",
            Kind::List => "list",
            Kind::Map => "mapping",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Value::Null => Kind::Null,
            Value::Bool(_) => Kind::Bool,
            Value::Integer(_) => Kind::Integer,
            Value::Float(_) => Kind::Float,
            Value::String(_) => Kind::String,
            Value::List(_) => Kind::List,
            Value::Map(_) => Kind::Map,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view of the value: integers widen to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Map(record) => Some(record),
            _ => None,
        }
    }

    /// Look up `key` when the value is a mapping.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_record().and_then(|r| r.get(key))
    }

    /// Render the value in the literal syntax understood by text coercion.
    ///
    /// `None`, `True`/`False`, numbers, single-quoted strings, `[..]` lists and
    /// `{'k': v}` mappings. Floats always carry a `.` or an exponent so they
    /// read back as floats.
    pub fn to_literal(&self) -> String {
        let mut out = String::new();
        write_literal(self, &mut out);
        out
    }
}

fn write_literal(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("None"),
        Value::Bool(true) => out.push_str("True"),
        Value::Bool(false) => out.push_str("False"),
        Value::Integer(i) => out.push_str(&i.to_string()),
        Value::Float(f) => out.push_str(&format_float(*f)),
        Value::String(s) => write_quoted(s, out),
        Value::List(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_literal(item, out);
            }
            out.push(']');
        }
        Value::Map(record) => {
            out.push('{');
            for (i, (key, item)) in record.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_quoted(key, out);
                out.push_str(": ");
                write_literal(item, out);
            }
            out.push('}');
        }
    }
}

/// Format a float so that it never reads back as an integer.
pub(crate) fn format_float(f: f64) -> String {
    if f.is_nan() {
        "nan".into()
    } else if f.is_infinite() {
        if f > 0.0 { "inf".into() } else { "-inf".into() }
    } else {
        // Debug keeps the trailing `.0` that Display drops.
        format!("{f:?}")
    }
}

fn write_quoted(s: &str, out: &mut String) {
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 || c == '\u{7f}' => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('\'');
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_literal())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i.into())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Integer(i.into())
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Map(record)
    }
}

/// An insertion-ordered string-keyed mapping of [`Value`]s.
///
/// Equality compares entries, not their order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    entries: IndexMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries.get_mut(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert or replace `key`. A replaced key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    /// Remove `key`, preserving the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.shift_remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Convert the record into any deserializable type (typically a user's
    /// config struct) by way of `serde_json`.
    pub fn deserialize_into<T: DeserializeOwned>(&self) -> Result<T, InputError> {
        let json = serde_json::to_value(self).map_err(|e| InputError::Deserialize {
            reason: e.to_string(),
        })?;
        serde_json::from_value(json).map_err(|e| InputError::Deserialize {
            reason: e.to_string(),
        })
    }
}

impl Index<&str> for Record {
    type Output = Value;

    fn index(&self, key: &str) -> &Value {
        match self.get(key) {
            Some(v) => v,
            None => panic!("key '{key}' not present in record"),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Record {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

// -- serde ------------------------------------------------------------------

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(record) => record.serialize(serializer),
        }
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any configuration value")
    }

    fn visit_bool<E>(self, b: bool) -> Result<Value, E> {
        Ok(Value::Bool(b))
    }

    fn visit_i64<E>(self, i: i64) -> Result<Value, E> {
        Ok(Value::Integer(i))
    }

    fn visit_u64<E: de::Error>(self, u: u64) -> Result<Value, E> {
        i64::try_from(u)
            .map(Value::Integer)
            .map_err(|_| E::custom(format!("integer {u} is out of range")))
    }

    fn visit_f64<E>(self, f: f64) -> Result<Value, E> {
        Ok(Value::Float(f))
    }

    fn visit_str<E>(self, s: &str) -> Result<Value, E> {
        Ok(Value::String(s.to_string()))
    }

    fn visit_string<E>(self, s: String) -> Result<Value, E> {
        Ok(Value::String(s))
    }

    fn visit_unit<E>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        Value::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let mut items = Vec::new();
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Value::List(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Value, A::Error> {
        let mut record = Record::new();
        while let Some((key, value)) = map.next_entry::<String, Value>()? {
            record.insert(key, value);
        }
        Ok(Value::Map(record))
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Record {
        let mut sub = Record::new();
        sub.insert("name", "subdictname");
        sub.insert("mylist", vec![1, 2, 3]);
        let mut r = Record::new();
        r.insert("name", "junk");
        r.insert("floatval", 100.0);
        r.insert("boolval", true);
        r.insert("subdict", sub);
        r
    }

    #[test]
    fn insert_keeps_position_on_replace() {
        let mut r = sample();
        r.insert("name", "other");
        assert_eq!(r.keys().next(), Some("name"));
        assert_eq!(r["name"], Value::from("other"));
    }

    #[test]
    fn remove_preserves_order() {
        let mut r = sample();
        assert_eq!(r.remove("floatval"), Some(Value::Float(100.0)));
        let keys: Vec<&str> = r.keys().collect();
        assert_eq!(keys, vec!["name", "boolval", "subdict"]);
        assert_eq!(r.remove("floatval"), None);
    }

    #[test]
    fn equality_ignores_order() {
        let a: Record = [("a", 1), ("b", 2)].into_iter().collect();
        let b: Record = [("b", 2), ("a", 1)].into_iter().collect();
        assert_eq!(a, b);
        let c: Record = [("a", 1)].into_iter().collect();
        assert_ne!(a, c);
    }

    #[test]
    fn literal_rendering() {
        assert_eq!(Value::Null.to_literal(), "None");
        assert_eq!(Value::Bool(true).to_literal(), "True");
        assert_eq!(Value::Float(100.0).to_literal(), "100.0");
        assert_eq!(Value::Float(0.123).to_literal(), "0.123");
        assert_eq!(Value::from("it's").to_literal(), r"'it\'s'");
        assert_eq!(
            sample()["subdict"].to_literal(),
            "{'name': 'subdictname', 'mylist': [1, 2, 3]}"
        );
    }

    #[test]
    fn kinds() {
        assert_eq!(Value::from(3).kind(), Kind::Integer);
        assert_eq!(Value::from(3.0).kind(), Kind::Float);
        assert_eq!(Value::from(vec!["a"]).kind(), Kind::List);
        assert_eq!(Kind::Map.to_string(), "mapping");
    }

    #[test]
    fn numeric_view_widens_integers() {
        assert_eq!(Value::from(2).as_f64(), Some(2.0));
        assert_eq!(Value::from(true).as_f64(), None);
    }

    #[test]
    fn json_roundtrip_keeps_order() {
        let r = sample();
        let text = serde_json::to_string(&r).unwrap();
        assert!(text.starts_with(r#"{"name":"junk","floatval":100.0"#));
        let back: Record = serde_json::from_str(&text).unwrap();
        assert_eq!(back, r);
    }

    #[test]
    fn json_null_is_null() {
        let v: Value = serde_json::from_str("null").unwrap();
        assert!(v.is_null());
    }

    #[test]
    fn deserialize_into_struct() {
        #[derive(Deserialize, Debug, PartialEq)]
        struct Sub {
            name: String,
            mylist: Vec<i64>,
        }
        #[derive(Deserialize, Debug, PartialEq)]
        struct Main {
            name: String,
            floatval: f64,
            boolval: bool,
            subdict: Sub,
        }
        let typed: Main = sample().deserialize_into().unwrap();
        assert_eq!(typed.subdict.mylist, vec![1, 2, 3]);
        assert!(typed.boolval);
    }

    #[test]
    fn deserialize_into_reports_mismatch() {
        #[derive(Deserialize, Debug)]
        #[allow(dead_code)]
        struct Wrong {
            name: i64,
        }
        let err = sample().deserialize_into::<Wrong>().unwrap_err();
        assert!(matches!(err, InputError::Deserialize { .. }));
    }
}
