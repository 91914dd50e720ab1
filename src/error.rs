use thiserror::Error;

/// Every failure surfaced by schema construction, ingestion or emission.
///
/// Key-carrying variants hold the full dotted path of the offending field,
/// e.g. `subdict.name` or `servers[2].port`, so nested failures can be
/// reported without any extra context from the caller.
#[derive(Debug, Error)]
#[cfg_attr(feature = "rich-errors", derive(miette::Diagnostic))]
pub enum InputError {
    #[error("Missing required key '{0}'")]
    #[cfg_attr(
        feature = "rich-errors",
        diagnostic(code(inputdict::missing_field), help("add the key to the input"))
    )]
    MissingRequiredField(String),

    #[error("Type of '{key}' not correct: expected {expected}, got {actual}")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(inputdict::type_mismatch)))]
    TypeMismatch {
        key: String,
        expected: String,
        actual: String,
    },

    #[error("Validation failed for '{key}': {message}")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(inputdict::invalid_value)))]
    LocalValidationFailure { key: String, message: String },

    #[error("Global validation failed for '{key}': {message}")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(inputdict::invalid_record)))]
    GlobalValidationFailure { key: String, message: String },

    #[error("These keys were not used: {}", .0.join(", "))]
    #[cfg_attr(
        feature = "rich-errors",
        diagnostic(
            code(inputdict::unused_keys),
            help("remove the keys or ingest with check_unused(false)")
        )
    )]
    UnusedKeysPresent(Vec<String>),

    #[error("Malformed literal for '{key}': {raw:?}")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(inputdict::malformed_literal)))]
    MalformedLiteral { key: String, raw: String },

    #[error("Duplicate key '{0}' in schema")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(inputdict::duplicate_key)))]
    DuplicateKey(String),

    #[error("Failed to parse {origin} as {format}: {reason}")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(inputdict::parse)))]
    Parse {
        origin: String,
        format: &'static str,
        reason: String,
    },

    #[error("Failed to read {origin}: {source}")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(inputdict::io)))]
    Io {
        origin: String,
        source: std::io::Error,
    },

    #[error("Cannot write {format}: {reason}")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(inputdict::codec)))]
    Codec {
        format: &'static str,
        reason: String,
    },

    #[error("Cannot tell the format of '{0}'; expected a .yaml, .yml, .ini, .cfg or .toml file")]
    #[cfg_attr(
        feature = "rich-errors",
        diagnostic(code(inputdict::unknown_format), help("pass the format explicitly"))
    )]
    UnknownFormat(String),

    #[error("Record does not match the target type: {reason}")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(inputdict::deserialize)))]
    Deserialize { reason: String },
}

impl InputError {
    /// The dotted path of the field the error is about, if it concerns one.
    pub fn key(&self) -> Option<&str> {
        match self {
            InputError::MissingRequiredField(key) | InputError::DuplicateKey(key) => Some(key),
            InputError::TypeMismatch { key, .. }
            | InputError::LocalValidationFailure { key, .. }
            | InputError::GlobalValidationFailure { key, .. }
            | InputError::MalformedLiteral { key, .. } => Some(key),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_field_formats() {
        let err = InputError::MissingRequiredField("subdict.name".into());
        assert!(err.to_string().contains("subdict.name"));
    }

    #[test]
    fn unused_keys_lists_every_key() {
        let err = InputError::UnusedKeysPresent(vec!["extrakey".into(), "subdict.typo".into()]);
        let msg = err.to_string();
        assert!(msg.contains("extrakey"));
        assert!(msg.contains("subdict.typo"));
    }

    #[test]
    fn local_failure_carries_message() {
        let err = InputError::LocalValidationFailure {
            key: "intval".into(),
            message: "intval must be >= 0.".into(),
        };
        assert_eq!(
            err.to_string(),
            "Validation failed for 'intval': intval must be >= 0."
        );
    }

    #[test]
    fn key_accessor() {
        let err = InputError::MalformedLiteral {
            key: "default.intval".into(),
            raw: "1 +".into(),
        };
        assert_eq!(err.key(), Some("default.intval"));
        assert_eq!(InputError::UnusedKeysPresent(vec![]).key(), None);
    }
}
