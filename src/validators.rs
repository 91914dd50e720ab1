//! Ready-made local validators.
//!
//! ```ignore
//! FieldDescriptor::required("input").of(Kind::String).validator(validators::path_exists())
//! ```

use std::path::Path;

use crate::validate::{LocalValidator, Verdict};
use crate::value::Value;

/// The value is a string naming an existing file or directory.
pub fn path_exists() -> LocalValidator {
    LocalValidator::new(|value: &Value| match value.as_str() {
        Some(p) if Path::new(p).exists() => Verdict::pass(),
        Some(p) => Verdict::fail(format!("The path {p} does not exist")),
        None => Verdict::fail(format!("{} is not a path", value.to_literal())),
    })
}

/// The value equals one of `allowed`.
pub fn one_of<I, V>(allowed: I) -> LocalValidator
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    let allowed: Vec<Value> = allowed.into_iter().map(Into::into).collect();
    LocalValidator::new(move |value: &Value| {
        if allowed.contains(value) {
            return Verdict::pass();
        }
        let choices = allowed
            .iter()
            .map(Value::to_literal)
            .collect::<Vec<_>>()
            .join(", ");
        Verdict::fail(format!("{} is not one of [{choices}]", value.to_literal()))
    })
}

/// The value is a number within `min..=max`. Integers are compared as floats.
pub fn in_range(min: f64, max: f64) -> LocalValidator {
    LocalValidator::new(move |value: &Value| match value.as_f64() {
        Some(x) if (min..=max).contains(&x) => Verdict::pass(),
        Some(_) => Verdict::fail(format!(
            "{} is not between {} and {}",
            value.to_literal(),
            crate::value::format_float(min),
            crate::value::format_float(max)
        )),
        None => Verdict::fail(format!("{} is not a number", value.to_literal())),
    })
}
