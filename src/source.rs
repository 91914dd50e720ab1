//! Where raw document text comes from.

use std::fmt;
use std::io::Read;
use std::path::Path;

use crate::error::InputError;

/// A raw document: in-memory text, an open reader, or a file path.
pub enum Source<'a> {
    Text(&'a str),
    Reader(&'a mut dyn Read),
    Path(&'a Path),
}

impl Source<'_> {
    /// Human-readable origin used in error messages.
    pub fn origin(&self) -> String {
        match self {
            Source::Text(_) => crate::codec::TEXT_ORIGIN.to_string(),
            Source::Reader(_) => "<reader>".to_string(),
            Source::Path(path) => path.display().to_string(),
        }
    }

    /// Read the whole source into a string.
    pub fn read_to_string(self) -> Result<String, InputError> {
        let origin = self.origin();
        let io_err = |source| InputError::Io {
            origin: origin.clone(),
            source,
        };
        match self {
            Source::Text(text) => Ok(text.to_string()),
            Source::Reader(reader) => {
                let mut text = String::new();
                reader.read_to_string(&mut text).map_err(io_err)?;
                Ok(text)
            }
            Source::Path(path) => std::fs::read_to_string(path).map_err(io_err),
        }
    }
}

impl fmt::Debug for Source<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Source({})", self.origin())
    }
}

impl<'a> From<&'a str> for Source<'a> {
    fn from(text: &'a str) -> Self {
        Source::Text(text)
    }
}

impl<'a> From<&'a Path> for Source<'a> {
    fn from(path: &'a Path) -> Self {
        Source::Path(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_passes_through() {
        assert_eq!(Source::Text("a: 1").read_to_string().unwrap(), "a: 1");
    }

    #[test]
    fn reader_is_drained() {
        let mut cursor = std::io::Cursor::new(b"a = 1\n".to_vec());
        let text = Source::Reader(&mut cursor).read_to_string().unwrap();
        assert_eq!(text, "a = 1\n");
    }

    #[test]
    fn path_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.yaml");
        std::fs::write(&path, "name: x\n").unwrap();
        assert_eq!(Source::Path(&path).read_to_string().unwrap(), "name: x\n");
    }

    #[test]
    fn missing_path_is_io_error_with_origin() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.yaml");
        match Source::Path(&path).read_to_string().unwrap_err() {
            InputError::Io { origin, .. } => assert!(origin.ends_with("missing.yaml")),
            other => panic!("Expected Io, got: {other:?}"),
        }
    }
}
