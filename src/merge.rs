//! The merge/validate engine: walk a schema against a raw mapping and produce
//! a fully populated record.
//!
//! Per field, in schema order: presence check, value selection (raw value,
//! coerced in text mode, or the default), recursion into nested and
//! list-element schemas, type check, local validator. Once every field is
//! resolved, cross-field validators run against the complete record and any
//! raw keys nobody consumed are reported.
//!
//! The raw mapping is taken by value and drained as fields consume it, so
//! whatever remains at the end is exactly the set of unused keys.

use crate::coerce::coerce;
use crate::document;
use crate::error::InputError;
use crate::schema::{FieldDescriptor, Schema, TypeSpec};
use crate::validate::{join_path, reject_unused_keys, run_cross, run_local};
use crate::value::{Record, Value};

/// Engine switches, forwarded unchanged through every level of recursion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MergeOptions {
    pub validate: bool,
    pub check_unused: bool,
    /// Raw values are text and must be coerced to their declared types.
    pub coerce: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            validate: true,
            check_unused: true,
            coerce: false,
        }
    }
}

/// Merge `raw` into a record shaped by `schema`.
pub(crate) fn merge_record(
    raw: Record,
    schema: &Schema,
    opts: MergeOptions,
) -> Result<Record, InputError> {
    merge_level(raw, schema, opts, "")
}

fn merge_level(
    mut raw: Record,
    schema: &Schema,
    opts: MergeOptions,
    prefix: &str,
) -> Result<Record, InputError> {
    let mut out = Record::new();

    for field in schema.fields() {
        let path = join_path(prefix, field.key());
        let present = raw.remove(field.key());
        if field.is_required() && present.is_none() {
            return Err(InputError::MissingRequiredField(path));
        }

        let value = resolve_field(field, present, opts, &path)?;

        if opts.validate {
            if let TypeSpec::OneOf(_) = field.type_spec()
                && !field.type_spec().accepts(value.kind())
            {
                return Err(type_mismatch(&path, &field.type_spec().describe(), &value));
            }
            if let Some(validator) = field.local_validator() {
                run_local(validator, &value, &path)?;
            }
        }
        out.insert(field.key(), value);
    }

    // Cross-field validators only ever see the completed record.
    if opts.validate {
        for field in schema.fields() {
            if let Some(validator) = field.cross_validator()
                && let Some(value) = out.get(field.key())
            {
                run_cross(validator, value, &out, &join_path(prefix, field.key()))?;
            }
        }
    }

    if opts.check_unused {
        reject_unused_keys(&raw, prefix)?;
    } else if !raw.is_empty() {
        let dropped: Vec<&str> = raw.keys().collect();
        tracing::debug!(at = prefix, ?dropped, "dropping unused keys");
    }

    Ok(out)
}

fn resolve_field(
    field: &FieldDescriptor,
    present: Option<Value>,
    opts: MergeOptions,
    path: &str,
) -> Result<Value, InputError> {
    let spec = field.type_spec();
    match spec {
        TypeSpec::Nested(sub) => match present {
            Some(value) if opts.coerce => {
                nested_value(coerce(value, spec, path)?, sub, opts, path)
            }
            Some(value) => nested_value(value, sub, opts, path),
            None => {
                tracing::trace!(key = path, "materializing nested defaults");
                Ok(Value::Map(document::defaults(sub)))
            }
        },
        TypeSpec::ListOf(sub) => {
            let value = select(field, present, opts, path)?;
            list_value(value, sub, opts, path)
        }
        TypeSpec::Any | TypeSpec::OneOf(_) => select(field, present, opts, path),
    }
}

/// The raw value (coerced in text mode) or the field's default.
fn select(
    field: &FieldDescriptor,
    present: Option<Value>,
    opts: MergeOptions,
    path: &str,
) -> Result<Value, InputError> {
    match present {
        Some(value) if opts.coerce => coerce(value, field.type_spec(), path),
        Some(value) => Ok(value),
        None => {
            tracing::trace!(key = path, "using default");
            Ok(field.default_value().clone())
        }
    }
}

fn nested_value(
    value: Value,
    sub: &Schema,
    opts: MergeOptions,
    path: &str,
) -> Result<Value, InputError> {
    let record = match value {
        Value::Map(record) => record,
        Value::Null => Record::new(),
        other if opts.validate => return Err(type_mismatch(path, "mapping", &other)),
        other => return Ok(other),
    };
    // An empty sub-schema declares a free-form mapping.
    if sub.is_empty() {
        return Ok(Value::Map(record));
    }
    merge_level(record, sub, opts, path).map(Value::Map)
}

fn list_value(
    value: Value,
    sub: &Schema,
    opts: MergeOptions,
    path: &str,
) -> Result<Value, InputError> {
    let items = match value {
        Value::List(items) => items,
        Value::Null => return Ok(Value::Null),
        other if opts.validate => return Err(type_mismatch(path, "list of mappings", &other)),
        other => return Ok(other),
    };
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| nested_value(item, sub, opts, &format!("{path}[{i}]")))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::List)
}

fn type_mismatch(path: &str, expected: &str, actual: &Value) -> InputError {
    InputError::TypeMismatch {
        key: path.to_string(),
        expected: expected.to_string(),
        actual: actual.to_literal(),
    }
}
