//! Validator dispatch and unused-key reporting.
//!
//! A field carries at most one predicate, and the two kinds are different
//! types: a [`LocalValidator`] sees only the field's resolved value and runs
//! during the per-field pass, a [`CrossValidator`] also sees the completed
//! record and runs only after every field has been resolved. Predicates
//! return anything convertible into a [`Verdict`]: a bare `bool`, or a
//! `(bool, message)` pair whose message ends up in the error.

use std::fmt;
use std::sync::Arc;

use crate::error::InputError;
use crate::value::{Record, Value};

/// Normalized outcome of a validator call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub valid: bool,
    pub message: String,
}

impl Verdict {
    pub fn pass() -> Self {
        Self {
            valid: true,
            message: String::new(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: message.into(),
        }
    }
}

impl From<bool> for Verdict {
    fn from(valid: bool) -> Self {
        Self {
            valid,
            message: String::new(),
        }
    }
}

impl From<(bool, &str)> for Verdict {
    fn from((valid, message): (bool, &str)) -> Self {
        Self {
            valid,
            message: message.to_string(),
        }
    }
}

impl From<(bool, String)> for Verdict {
    fn from((valid, message): (bool, String)) -> Self {
        Self { valid, message }
    }
}

impl From<Result<(), String>> for Verdict {
    fn from(result: Result<(), String>) -> Self {
        match result {
            Ok(()) => Verdict::pass(),
            Err(message) => Verdict::fail(message),
        }
    }
}

type LocalFn = dyn Fn(&Value) -> Verdict + Send + Sync;
type CrossFn = dyn Fn(&Value, &Record) -> Verdict + Send + Sync;

/// A predicate over a single field's value.
#[derive(Clone)]
pub struct LocalValidator(Arc<LocalFn>);

impl LocalValidator {
    pub fn new<F, R>(f: F) -> Self
    where
        F: Fn(&Value) -> R + Send + Sync + 'static,
        R: Into<Verdict>,
    {
        Self(Arc::new(move |v: &Value| -> Verdict { f(v).into() }))
    }

    pub fn call(&self, value: &Value) -> Verdict {
        (self.0)(value)
    }
}

impl fmt::Debug for LocalValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LocalValidator(..)")
    }
}

/// A predicate over a field's value and the complete record it belongs to.
#[derive(Clone)]
pub struct CrossValidator(Arc<CrossFn>);

impl CrossValidator {
    pub fn new<F, R>(f: F) -> Self
    where
        F: Fn(&Value, &Record) -> R + Send + Sync + 'static,
        R: Into<Verdict>,
    {
        Self(Arc::new(move |v: &Value, r: &Record| -> Verdict {
            f(v, r).into()
        }))
    }

    pub fn call(&self, value: &Value, record: &Record) -> Verdict {
        (self.0)(value, record)
    }
}

impl fmt::Debug for CrossValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CrossValidator(..)")
    }
}

/// Run a local validator against a resolved value.
pub(crate) fn run_local(
    validator: &LocalValidator,
    value: &Value,
    path: &str,
) -> Result<(), InputError> {
    let verdict = validator.call(value);
    if verdict.valid {
        return Ok(());
    }
    Err(InputError::LocalValidationFailure {
        key: path.to_string(),
        message: verdict.message,
    })
}

/// Run a cross-field validator against the completed record.
pub(crate) fn run_cross(
    validator: &CrossValidator,
    value: &Value,
    record: &Record,
    path: &str,
) -> Result<(), InputError> {
    let verdict = validator.call(value, record);
    if verdict.valid {
        return Ok(());
    }
    Err(InputError::GlobalValidationFailure {
        key: path.to_string(),
        message: verdict.message,
    })
}

/// Fail if `leftover` still holds keys that no descriptor consumed.
///
/// `prefix` is the dotted path of the level being checked, so reported keys
/// are full paths.
pub(crate) fn reject_unused_keys(leftover: &Record, prefix: &str) -> Result<(), InputError> {
    if leftover.is_empty() {
        return Ok(());
    }
    let keys = leftover.keys().map(|k| join_path(prefix, k)).collect();
    Err(InputError::UnusedKeysPresent(keys))
}

/// Append `key` to a dotted path.
pub(crate) fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}
