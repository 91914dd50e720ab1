//! Framework-agnostic command model.
//!
//! [`Action`] is what a CLI (or anything else) hands to
//! [`InputDict::handle`](crate::InputDict::handle). The clap adapter in the
//! `cli` module produces it from parsed arguments; other front ends build it
//! directly.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::codec::{CommentedYamlCodec, DocumentCodec, IniCodec, TomlCodec, YamlCodec};
use crate::error::InputError;

/// A supported document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum Format {
    #[default]
    Yaml,
    Ini,
    Toml,
}

impl Format {
    /// Guess the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Format> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "yaml" | "yml" => Some(Format::Yaml),
            "ini" | "cfg" => Some(Format::Ini),
            "toml" => Some(Format::Toml),
            _ => None,
        }
    }

    /// `explicit` when given, otherwise the format implied by `path`.
    pub fn resolve(explicit: Option<Format>, path: &Path) -> Result<Format, InputError> {
        explicit
            .or_else(|| Format::from_path(path))
            .ok_or_else(|| InputError::UnknownFormat(path.display().to_string()))
    }

    /// The codec for this format. `annotate` picks the comment-writing
    /// variant where the format has one.
    pub fn codec(self, annotate: bool) -> Box<dyn DocumentCodec> {
        match (self, annotate) {
            (Format::Yaml, true) => Box::new(CommentedYamlCodec),
            (Format::Yaml, false) => Box::new(YamlCodec),
            (Format::Ini, _) => Box::new(IniCodec::new()),
            (Format::Toml, _) => Box::new(TomlCodec),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Format::Yaml => "yaml",
            Format::Ini => "ini",
            Format::Toml => "toml",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An operation on an [`InputDict`](crate::InputDict), independent of any
/// CLI framework.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Generate a default document.
    Gen {
        format: Format,
        include_optional: bool,
        annotate: bool,
        output: Option<PathBuf>,
    },
    /// Ingest a file and list the resolved record.
    Check {
        path: PathBuf,
        format: Option<Format>,
        validate: bool,
        check_unused: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_from_extension() {
        assert_eq!(Format::from_path(Path::new("in.yaml")), Some(Format::Yaml));
        assert_eq!(Format::from_path(Path::new("in.YML")), Some(Format::Yaml));
        assert_eq!(Format::from_path(Path::new("a/b.cfg")), Some(Format::Ini));
        assert_eq!(Format::from_path(Path::new("x.toml")), Some(Format::Toml));
        assert_eq!(Format::from_path(Path::new("x.json")), None);
        assert_eq!(Format::from_path(Path::new("noext")), None);
    }

    #[test]
    fn explicit_format_wins() {
        let f = Format::resolve(Some(Format::Ini), Path::new("x.yaml")).unwrap();
        assert_eq!(f, Format::Ini);
        let err = Format::resolve(None, Path::new("x.json")).unwrap_err();
        assert!(matches!(err, InputError::UnknownFormat(p) if p == "x.json"));
    }

    #[test]
    fn codec_choice() {
        assert!(Format::Yaml.codec(true).supports_comments());
        assert!(!Format::Yaml.codec(false).supports_comments());
        assert!(Format::Ini.codec(true).coerces_scalars());
        assert_eq!(Format::Toml.codec(false).format(), "toml");
    }
}
