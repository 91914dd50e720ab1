//! The declarative schema: an ordered list of field descriptors.
//!
//! ```ignore
//! let sub = Schema::new(vec![
//!     FieldDescriptor::required("name").of(Kind::String).default("mysubdict"),
//! ])?;
//! let schema = Schema::new(vec![
//!     FieldDescriptor::required("intval")
//!         .of(Kind::Integer)
//!         .default(0)
//!         .check(|v| (v.as_i64().is_some_and(|n| n >= 0), "intval must be >= 0.")),
//!     FieldDescriptor::required("subdict").nested(sub),
//! ])?;
//! ```
//!
//! A schema is immutable once built. Sub-schemas are owned by their parent
//! descriptor, so cloning a schema copies the whole tree; validators are
//! shared behind `Arc` since they are immutable anyway.

use std::collections::HashSet;

use crate::error::InputError;
use crate::validate::{CrossValidator, LocalValidator, Verdict};
use crate::value::{Kind, Record, Value};

/// What a field's resolved value must look like.
#[derive(Debug, Clone)]
pub enum TypeSpec {
    /// No type check; any value passes through.
    Any,
    /// The value's kind must be one of these.
    OneOf(Vec<Kind>),
    /// The value is a mapping validated by a sub-schema. An empty sub-schema
    /// accepts any mapping unchanged.
    Nested(Schema),
    /// The value is a list whose elements are each validated by a sub-schema.
    ListOf(Schema),
}

impl TypeSpec {
    /// Whether a value of `kind` satisfies this spec at the top level.
    pub fn accepts(&self, kind: Kind) -> bool {
        match self {
            TypeSpec::Any => true,
            TypeSpec::OneOf(kinds) => kinds.contains(&kind),
            TypeSpec::Nested(_) => kind == Kind::Map,
            TypeSpec::ListOf(_) => kind == Kind::List,
        }
    }

    /// Human-readable form used in type mismatch errors, e.g. `int | float`.
    pub fn describe(&self) -> String {
        match self {
            TypeSpec::Any => "any".into(),
            TypeSpec::OneOf(kinds) => kinds
                .iter()
                .map(|k| k.name())
                .collect::<Vec<_>>()
                .join(" | "),
            TypeSpec::Nested(_) => Kind::Map.name().into(),
            TypeSpec::ListOf(_) => "list of mappings".into(),
        }
    }

    pub(crate) fn is_nested(&self) -> bool {
        matches!(self, TypeSpec::Nested(_))
    }
}

/// One schema entry.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    key: String,
    required: bool,
    spec: TypeSpec,
    default: Value,
    local: Option<LocalValidator>,
    cross: Option<CrossValidator>,
    help: String,
}

impl FieldDescriptor {
    fn new(key: &str, required: bool) -> Self {
        Self {
            key: key.to_string(),
            required,
            spec: TypeSpec::Any,
            default: Value::Null,
            local: None,
            cross: None,
            help: String::new(),
        }
    }

    /// A field that must be present in every raw source.
    pub fn required(key: &str) -> Self {
        Self::new(key, true)
    }

    /// A field that falls back to its default when absent.
    pub fn optional(key: &str) -> Self {
        Self::new(key, false)
    }

    /// Set the full type spec.
    pub fn spec(mut self, spec: TypeSpec) -> Self {
        self.spec = spec;
        self
    }

    /// Accept exactly one kind.
    pub fn of(self, kind: Kind) -> Self {
        self.spec(TypeSpec::OneOf(vec![kind]))
    }

    /// Accept any of several kinds.
    pub fn one_of(self, kinds: &[Kind]) -> Self {
        self.spec(TypeSpec::OneOf(kinds.to_vec()))
    }

    /// Validate the value as a mapping against `schema`. The sub-schema also
    /// supplies the field's defaults.
    pub fn nested(self, schema: Schema) -> Self {
        self.spec(TypeSpec::Nested(schema))
    }

    /// Validate every element of a list value against `schema`.
    pub fn list_of(self, schema: Schema) -> Self {
        self.spec(TypeSpec::ListOf(schema))
    }

    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = value.into();
        self
    }

    /// Attach a local validator, replacing any validator already set.
    pub fn check<F, R>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> R + Send + Sync + 'static,
        R: Into<Verdict>,
    {
        self.local = Some(LocalValidator::new(f));
        self.cross = None;
        self
    }

    /// Attach a cross-field validator, replacing any validator already set.
    /// It runs once the whole record has been resolved.
    pub fn check_with_record<F, R>(mut self, f: F) -> Self
    where
        F: Fn(&Value, &Record) -> R + Send + Sync + 'static,
        R: Into<Verdict>,
    {
        self.cross = Some(CrossValidator::new(f));
        self.local = None;
        self
    }

    /// Attach a prebuilt local validator (see [`validators`](crate::validators)).
    pub fn validator(mut self, validator: LocalValidator) -> Self {
        self.local = Some(validator);
        self.cross = None;
        self
    }

    pub fn help(mut self, text: &str) -> Self {
        self.help = text.to_string();
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn type_spec(&self) -> &TypeSpec {
        &self.spec
    }

    pub fn default_value(&self) -> &Value {
        &self.default
    }

    pub fn local_validator(&self) -> Option<&LocalValidator> {
        self.local.as_ref()
    }

    pub fn cross_validator(&self) -> Option<&CrossValidator> {
        self.cross.as_ref()
    }

    pub fn help_text(&self) -> &str {
        &self.help
    }
}

/// An ordered sequence of field descriptors with unique keys.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<FieldDescriptor>,
}

impl Schema {
    /// Build a schema, rejecting duplicate keys at this level. Nested schemas
    /// were checked when they were built.
    pub fn new(fields: Vec<FieldDescriptor>) -> Result<Self, InputError> {
        let mut seen = HashSet::new();
        for field in &fields {
            if !seen.insert(field.key.as_str()) {
                return Err(InputError::DuplicateKey(field.key.clone()));
            }
        }
        Ok(Self { fields })
    }

    /// A schema with no fields. As a nested spec it accepts any mapping.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn get(&self, key: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.key == key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
