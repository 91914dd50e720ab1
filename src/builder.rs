use std::io::Write;
use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::codec::{DocumentCodec, IniCodec, TEXT_ORIGIN, YamlCodec};
use crate::document::{self, Document, DocumentOptions};
use crate::error::InputError;
use crate::merge::{MergeOptions, merge_record};
use crate::ops::{self, ActionResult};
use crate::preprocess;
use crate::schema::Schema;
use crate::source::Source;
use crate::types::{Action, Format};
use crate::value::Record;

/// Switches for one ingestion call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOptions {
    validate: bool,
    check_unused: bool,
    replacements_key: Option<String>,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            validate: true,
            check_unused: true,
            replacements_key: None,
        }
    }
}

impl IngestOptions {
    /// Run type checks and validators (default: `true`).
    pub fn validate(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    /// Fail on raw keys the schema does not declare (default: `true`).
    /// When off, such keys are dropped.
    pub fn check_unused(mut self, check_unused: bool) -> Self {
        self.check_unused = check_unused;
        self
    }

    /// Expand replacement tokens declared under `key` before parsing text
    /// (see [`preprocess`](crate::preprocess)).
    pub fn expand_replacements(mut self, key: &str) -> Self {
        self.replacements_key = Some(key.to_string());
        self
    }

    fn merge_options(&self, coerce: bool) -> MergeOptions {
        MergeOptions {
            validate: self.validate,
            check_unused: self.check_unused,
            coerce,
        }
    }
}

/// What goes into a generated document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpOptions {
    pub include_optional: bool,
    /// Append required flag and default to every help comment.
    pub extended_help: bool,
    /// Nest the whole document under this key.
    pub top_level: Option<String>,
}

impl Default for DumpOptions {
    fn default() -> Self {
        Self {
            include_optional: true,
            extended_help: true,
            top_level: None,
        }
    }
}

/// A schema ready to validate inputs and generate documents.
///
/// The schema is cloned once at construction; nothing mutates it afterwards,
/// so one `InputDict` can serve any number of ingestions, from any thread.
#[derive(Debug, Clone)]
pub struct InputDict {
    schema: Schema,
    global_help: String,
}

/// Builder for an [`InputDict`] with a global help text.
#[derive(Debug)]
pub struct InputDictBuilder {
    schema: Schema,
    global_help: String,
}

impl InputDictBuilder {
    /// Text emitted as a header comment by comment-capable codecs.
    pub fn global_help(mut self, text: &str) -> Self {
        self.global_help = text.to_string();
        self
    }

    pub fn build(self) -> InputDict {
        InputDict {
            schema: self.schema,
            global_help: self.global_help,
        }
    }
}

impl InputDict {
    pub fn new(schema: &Schema) -> Self {
        Self::builder(schema).build()
    }

    pub fn builder(schema: &Schema) -> InputDictBuilder {
        InputDictBuilder {
            schema: schema.clone(),
            global_help: String::new(),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn global_help(&self) -> &str {
        &self.global_help
    }

    /// Validate an already parsed mapping with default options.
    pub fn ingest(&self, raw: Record) -> Result<Record, InputError> {
        self.ingest_with(raw, IngestOptions::default())
    }

    /// Validate an already parsed mapping. Values are taken as typed; no
    /// coercion happens.
    pub fn ingest_with(&self, raw: Record, opts: IngestOptions) -> Result<Record, InputError> {
        self.run(raw, opts.merge_options(false))
    }

    /// Read, parse and validate a text document.
    ///
    /// When the codec yields untyped text (INI), every raw string is coerced
    /// to its field's declared type before checks run.
    pub fn ingest_text(
        &self,
        source: Source<'_>,
        codec: &dyn DocumentCodec,
        opts: IngestOptions,
    ) -> Result<Record, InputError> {
        let origin = source.origin();
        let text = source.read_to_string()?;
        let raw = match &opts.replacements_key {
            Some(key) => preprocess::parse_with_replacements(&text, codec, key),
            None => codec.parse(&text),
        }
        .map_err(|e| relabel(e, &origin))?;
        self.run(raw, opts.merge_options(codec.coerces_scalars()))
    }

    /// Validate a YAML string with default options.
    pub fn ingest_yaml(&self, text: &str) -> Result<Record, InputError> {
        self.ingest_text(Source::Text(text), &YamlCodec, IngestOptions::default())
    }

    /// Validate an INI string with default options.
    pub fn ingest_ini(&self, text: &str) -> Result<Record, InputError> {
        self.ingest_text(Source::Text(text), &IniCodec::new(), IngestOptions::default())
    }

    /// Validate a mapping and deserialize the result into `T`.
    pub fn ingest_as<T: DeserializeOwned>(&self, raw: Record) -> Result<T, InputError> {
        self.ingest(raw)?.deserialize_into()
    }

    fn run(&self, raw: Record, opts: MergeOptions) -> Result<Record, InputError> {
        debug!(
            keys = raw.len(),
            validate = opts.validate,
            check_unused = opts.check_unused,
            coerce = opts.coerce,
            "ingesting"
        );
        let record = merge_record(raw, &self.schema, opts)?;
        debug!(keys = record.len(), "ingested");
        Ok(record)
    }

    /// The default record, without annotations.
    pub fn default_record(&self, include_optional: bool) -> Record {
        let opts = DocumentOptions {
            include_optional,
            extended_help: false,
        };
        document::generate(&self.schema, opts).to_record()
    }

    /// The annotated default document, with the global help as its header.
    pub fn document(&self, opts: &DumpOptions) -> Document {
        let mut doc = document::generate(
            &self.schema,
            DocumentOptions {
                include_optional: opts.include_optional,
                extended_help: opts.extended_help,
            },
        );
        if !self.global_help.is_empty() {
            doc.header = Some(self.global_help.clone());
        }
        match &opts.top_level {
            Some(key) => doc.wrap(key),
            None => doc,
        }
    }

    /// Write the default document through `codec`.
    pub fn dump(
        &self,
        out: &mut dyn Write,
        codec: &dyn DocumentCodec,
        opts: &DumpOptions,
    ) -> Result<(), InputError> {
        codec.write(&self.document(opts), out)
    }

    /// Check that the full default document passes the schema's own
    /// validation; returns the first failure.
    pub fn verify_defaults(&self) -> Result<(), InputError> {
        self.ingest(self.default_record(true)).map(|_| ())
    }

    /// Handle an [`Action`] and print the result to stdout.
    pub fn handle_and_print(&self, action: &Action) -> Result<(), InputError> {
        let result = self.handle(action)?;
        println!("{result}");
        Ok(())
    }

    /// Handle an [`Action`] (gen / check).
    pub fn handle(&self, action: &Action) -> Result<ActionResult, InputError> {
        match action {
            Action::Gen {
                format,
                include_optional,
                annotate,
                output,
            } => {
                let opts = DumpOptions {
                    include_optional: *include_optional,
                    ..DumpOptions::default()
                };
                let doc = self.document(&opts);
                // Unannotated output carries neither comments nor header.
                let doc = if *annotate {
                    doc
                } else {
                    Document::from_record(&doc.to_record())
                };
                let text = format.codec(*annotate).render(&doc)?;
                match output {
                    Some(path) => {
                        write_file(path, &text)?;
                        Ok(ActionResult::DocumentWritten { path: path.clone() })
                    }
                    None => Ok(ActionResult::Document(text)),
                }
            }
            Action::Check {
                path,
                format,
                validate,
                check_unused,
            } => {
                let format = Format::resolve(*format, path)?;
                let opts = IngestOptions::default()
                    .validate(*validate)
                    .check_unused(*check_unused);
                let record = self.ingest_text(Source::Path(path), &*format.codec(false), opts)?;
                Ok(ops::list_record(&record))
            }
        }
    }
}

fn relabel(err: InputError, origin: &str) -> InputError {
    match err {
        InputError::Parse {
            origin: old,
            format,
            reason,
        } if old == TEXT_ORIGIN => InputError::Parse {
            origin: origin.to_string(),
            format,
            reason,
        },
        other => other,
    }
}

fn write_file(path: &Path, text: &str) -> Result<(), InputError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| InputError::Io {
            origin: parent.display().to_string(),
            source: e,
        })?;
    }
    std::fs::write(path, text).map_err(|e| InputError::Io {
        origin: path.display().to_string(),
        source: e,
    })
}
