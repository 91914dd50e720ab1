//! Token substitution on raw document text.
//!
//! An input may declare replacement tokens under a reserved top-level key:
//!
//! ```yaml
//! __replacestrings__:
//!   '@RUN@': case7
//! name: '@RUN@_output'
//! ```
//!
//! The text is parsed once to read the table, the lines that declare it are
//! commented out, every token is replaced in what is left, and the result is
//! parsed again. Tokens are applied in declaration order.

use tracing::debug;

use crate::codec::DocumentCodec;
use crate::error::InputError;
use crate::value::{Record, Value};

/// Top-level key holding the replacement table unless told otherwise.
pub const DEFAULT_REPLACEMENTS_KEY: &str = "__replacestrings__";

/// Replace every occurrence of each token in `replacements` with its value.
///
/// Null becomes the empty string, strings are inserted verbatim, anything
/// else in literal syntax.
pub fn substitute(text: &str, replacements: &Record) -> String {
    let mut out = text.to_string();
    for (token, value) in replacements.iter() {
        if token.is_empty() {
            continue;
        }
        let with = match value {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            other => other.to_literal(),
        };
        out = out.replace(token, &with);
    }
    out
}

/// Parse `text` with `codec`, expanding the replacement table stored under
/// `key` when there is one. The table itself never reaches the result.
pub fn parse_with_replacements(
    text: &str,
    codec: &dyn DocumentCodec,
    key: &str,
) -> Result<Record, InputError> {
    let mut first = codec.parse(text)?;
    let replacements = match first.remove(key) {
        Some(Value::Map(table)) => table,
        Some(Value::Null) | None => return Ok(first),
        Some(other) => {
            return Err(InputError::TypeMismatch {
                key: key.to_string(),
                expected: "mapping".into(),
                actual: other.kind().name().into(),
            });
        }
    };
    debug!(tokens = replacements.len(), "expanding replacement strings");

    let cleaned = comment_out_declarations(text, key, &replacements);
    let mut expanded = codec.parse(&substitute(&cleaned, &replacements))?;
    expanded.remove(key);
    Ok(expanded)
}

/// Comment out the lines declaring the table so substitution leaves them
/// alone. `#` starts a comment in every supported format.
fn comment_out_declarations(text: &str, key: &str, replacements: &Record) -> String {
    let mut out = String::with_capacity(text.len());
    for line in text.lines() {
        let trimmed = line.trim_start();
        let declares = declares_key(trimmed, key)
            || trimmed == format!("[{key}]")
            || replacements.keys().any(|token| declares_key(trimmed, token));
        if declares {
            out.push('#');
        }
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// `line` opens with `name` (bare or quoted) followed by `:` or `=`.
fn declares_key(line: &str, name: &str) -> bool {
    let rest = ["'", "\""]
        .iter()
        .find_map(|q| {
            line.strip_prefix(q)
                .and_then(|l| l.strip_prefix(name))
                .and_then(|l| l.strip_prefix(q))
        })
        .or_else(|| line.strip_prefix(name));
    rest.is_some_and(|r| {
        let r = r.trim_start();
        r.starts_with(':') || r.starts_with('=')
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{IniCodec, TomlCodec, YamlCodec};

    #[test]
    fn substitute_in_order_with_rendering() {
        let replacements: Record = [
            ("@A@", Value::from("x")),
            ("@B@", Value::from(3)),
            ("@C@", Value::Null),
            ("@D@", Value::from(vec![1, 2])),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            substitute("@A@-@B@-@C@-@D@", &replacements),
            "x-3--[1, 2]"
        );
    }

    #[test]
    fn earlier_tokens_apply_first() {
        let replacements: Record = [("AB", "C"), ("CD", "E")].into_iter().collect();
        assert_eq!(substitute("ABD", &replacements), "E");
    }

    #[test]
    fn yaml_replacements_expand() {
        let text = "\
__replacestrings__:
  '@RUN@': case7
  SCALE: 2.5
name: '@RUN@_output'
factor: SCALE
";
        let record = parse_with_replacements(text, &YamlCodec, DEFAULT_REPLACEMENTS_KEY).unwrap();
        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["name", "factor"]);
        assert_eq!(record["name"], Value::from("case7_output"));
        assert_eq!(record["factor"], Value::from(2.5));
    }

    #[test]
    fn without_table_is_plain_parse() {
        let text = "name: '@RUN@'\n";
        let record = parse_with_replacements(text, &YamlCodec, DEFAULT_REPLACEMENTS_KEY).unwrap();
        assert_eq!(record["name"], Value::from("@RUN@"));
    }

    #[test]
    fn ini_replacements_expand() {
        let text = "\
[DEFAULT]
name = RUN_out

[__replacestrings__]
RUN = case9
";
        let record =
            parse_with_replacements(text, &IniCodec::new(), DEFAULT_REPLACEMENTS_KEY).unwrap();
        assert_eq!(record["name"], Value::from("case9_out"));
        assert!(!record.contains_key(DEFAULT_REPLACEMENTS_KEY));
    }

    #[test]
    fn toml_replacements_with_custom_key() {
        let text = "name = \"@N@\"\n\n[vars]\n\"@N@\" = \"demo\"\n";
        let record = parse_with_replacements(text, &TomlCodec, "vars").unwrap();
        assert_eq!(record["name"], Value::from("demo"));
        assert!(!record.contains_key("vars"));
    }

    #[test]
    fn non_mapping_table_rejected() {
        let err = parse_with_replacements("__replacestrings__: 3\n", &YamlCodec, DEFAULT_REPLACEMENTS_KEY)
            .unwrap_err();
        assert!(matches!(err, InputError::TypeMismatch { .. }));
    }
}
