//! Serialization formats for raw inputs and generated documents.
//!
//! Every format implements [`DocumentCodec`]: parse text into a [`Record`],
//! write a [`Document`] out. Codecs that can express comments write each
//! entry's annotation next to it and the global help as a header; the others
//! drop annotations silently.
//!
//! | codec | parse | write | comments | scalars |
//! |---|---|---|---|---|
//! | [`YamlCodec`] | serde_yaml | serde_yaml | no | typed |
//! | [`CommentedYamlCodec`] | serde_yaml | hand-rendered | yes | typed |
//! | [`IniCodec`] | hand-written | hand-written | no | text |
//! | [`TomlCodec`] | toml | toml_edit | yes | typed |
//!
//! A codec whose scalars are text (`coerces_scalars() == true`) makes the
//! engine run value coercion on every raw string.

mod ini;
mod toml;
mod yaml;

use std::io::Write;

use crate::document::Document;
use crate::error::InputError;
use crate::value::{Record, Value};

pub use self::ini::IniCodec;
pub use self::toml::TomlCodec;
pub use self::yaml::{CommentedYamlCodec, YamlCodec};

/// Origin reported in parse errors for in-memory text. Callers that know
/// better (a file path) relabel the error.
pub(crate) const TEXT_ORIGIN: &str = "<text>";

/// A document format.
pub trait DocumentCodec: Send + Sync {
    /// Short format name used in errors and logs, e.g. `yaml`.
    fn format(&self) -> &'static str;

    /// Parse `text` into a raw mapping. An empty document is an empty record;
    /// a document whose top level is not a mapping is a parse error.
    fn parse(&self, text: &str) -> Result<Record, InputError>;

    /// Write `doc` to `out`.
    fn write(&self, doc: &Document, out: &mut dyn Write) -> Result<(), InputError>;

    fn supports_comments(&self) -> bool {
        false
    }

    /// Whether parsed scalars are untyped text that needs coercion.
    fn coerces_scalars(&self) -> bool {
        false
    }

    /// Render `doc` to a string.
    fn render(&self, doc: &Document) -> Result<String, InputError> {
        let mut buf = Vec::new();
        self.write(doc, &mut buf)?;
        String::from_utf8(buf).map_err(|e| InputError::Codec {
            format: self.format(),
            reason: e.to_string(),
        })
    }
}

pub(crate) fn parse_error(format: &'static str, reason: impl ToString) -> InputError {
    InputError::Parse {
        origin: TEXT_ORIGIN.to_string(),
        format,
        reason: reason.to_string(),
    }
}

pub(crate) fn write_error(source: std::io::Error) -> InputError {
    InputError::Io {
        origin: "output".to_string(),
        source,
    }
}

/// Turn a parsed top-level value into a record.
pub(crate) fn top_level(format: &'static str, value: Value) -> Result<Record, InputError> {
    match value {
        Value::Map(record) => Ok(record),
        Value::Null => Ok(Record::new()),
        other => Err(parse_error(
            format,
            format!("top level must be a mapping, found {}", other.kind()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocumentOptions, generate};
    use crate::fixtures::test::main_schema;

    #[test]
    fn top_level_scalar_rejected() {
        let err = top_level("yaml", Value::from(3)).unwrap_err();
        match err {
            InputError::Parse { format, reason, .. } => {
                assert_eq!(format, "yaml");
                assert!(reason.contains("int"), "reason: {reason}");
            }
            other => panic!("Expected Parse, got: {other:?}"),
        }
        assert!(top_level("yaml", Value::Null).unwrap().is_empty());
    }

    #[test]
    fn every_codec_reads_back_its_own_output() {
        let doc = generate(&main_schema(), DocumentOptions::default());
        let codecs: Vec<Box<dyn DocumentCodec>> = vec![
            Box::new(YamlCodec),
            Box::new(CommentedYamlCodec),
            Box::new(TomlCodec),
        ];
        for codec in codecs {
            let text = codec.render(&doc).unwrap();
            let parsed = codec.parse(&text).unwrap();
            assert_eq!(parsed, doc.to_record(), "{} output:\n{text}", codec.format());
        }
    }
}
