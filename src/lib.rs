//! Schema-driven validation, defaulting and scaffolding for configuration
//! dictionaries.
//!
//! Describe the inputs your program accepts once, as a [`Schema`], and
//! inputdict takes care of the rest: it validates raw input mappings against
//! it, fills in defaults, coerces text values from flat formats, runs your
//! validators, and generates annotated default documents for users to start
//! from.
//!
//! ```ignore
//! let schema = Schema::new(vec![
//!     FieldDescriptor::required("name").of(Kind::String).default("myname")
//!         .help("An arbitrary name"),
//!     FieldDescriptor::optional("intval").of(Kind::Integer).default(0)
//!         .check(|v| (v.as_i64().is_some_and(|n| n >= 0), "intval must be >= 0.")),
//! ])?;
//! let inputs = InputDict::new(&schema);
//! let record = inputs.ingest_yaml("name: junk\n")?;
//! ```
//!
//! # Design: schema as source of truth
//!
//! A schema is an ordered list of [`FieldDescriptor`]s. Each one names a key
//! and says:
//!
//! - **required or optional**: required keys must be present in every raw
//!   input; optional ones fall back to their default.
//! - **type**: a [`TypeSpec`], either no check, one or more accepted
//!   [`Kind`]s, a nested schema (the value is a mapping validated
//!   recursively), or a list whose elements are each validated against a
//!   schema.
//! - **default**: the value used when the key is absent. Nested schemas
//!   supply their own defaults.
//! - **validator**: at most one predicate, either local (sees the value) or
//!   cross-field (sees the value and the completed record).
//! - **help**: the text used to annotate generated documents.
//!
//! The same definition drives ingestion, document generation and the CLI
//! subcommands. There is no separate template to drift out of sync.
//!
//! # Ingestion
//!
//! Ingestion walks the schema in order. For every field it checks presence,
//! picks the raw value or the default, recurses into nested schemas, checks
//! the type and runs the local validator. Once every field is resolved,
//! cross-field validators run against the completed record, so they see
//! every final value whatever the declaration order. Finally, raw keys the
//! schema never consumed are reported.
//!
//! Every failure aborts the call; there are no partial results. Errors carry
//! the full path of the offending key (`subdict.name`, `servers[1].port`).
//!
//! [`IngestOptions`] switches validation and the unused-key check off:
//!
//! ```ignore
//! let record = inputs.ingest_with(raw, IngestOptions::default().check_unused(false))?;
//! ```
//!
//! # Formats
//!
//! Text inputs go through a [`DocumentCodec`](codec::DocumentCodec):
//!
//! - **YAML**: [`YamlCodec`](codec::YamlCodec), or
//!   [`CommentedYamlCodec`](codec::CommentedYamlCodec) to write annotated
//!   documents.
//! - **TOML**: [`TomlCodec`](codec::TomlCodec), annotated as comments too.
//! - **INI**: [`IniCodec`](codec::IniCodec). Every INI value is text, so the
//!   engine coerces raw strings to the declared types with a literal-only
//!   parser ([`parse_literal`]). It evaluates nothing: numbers, `True`/`False`,
//!   `None`, quoted strings, lists, tuples and `{'k': v}` mappings.
//!
//! Text inputs may declare replacement tokens under a reserved key; see
//! [`preprocess`].
//!
//! # Document generation
//!
//! [`InputDict::dump`] writes the default document: every required field,
//! optional ones on request, nested sections recursively. Codecs that support
//! comments annotate each entry with its help text, e.g.
//!
//! ```text
//! name: myname                            # An arbitrary name [Required: True, default: 'myname']
//! ```
//!
//! and put the global help ([`InputDictBuilder::global_help`]) on top.
//!
//! # Core library, no CLI framework required
//!
//! The command model, [`Action`], is framework-agnostic and handled by
//! [`InputDict::handle`]. For [clap](https://docs.rs/clap) users, the `cli`
//! module (behind the `clap` Cargo feature, on by default) provides
//! [`DocumentArgs`] with `gen` and `check` subcommands.
//!
//! # Logging
//!
//! The library emits [`tracing`](https://docs.rs/tracing) events (ingestion
//! start and end, parsed documents, defaults and coercions at trace level)
//! and never installs a subscriber.
//!
//! # Error handling
//!
//! All fallible operations return [`InputError`]. With the `rich-errors`
//! feature it also implements `miette::Diagnostic`.

pub mod codec;
pub mod document;
pub mod error;
pub mod preprocess;
pub mod types;
pub mod validators;

mod builder;
#[cfg(feature = "clap")]
mod cli;
mod coerce;
pub(crate) mod merge;
mod ops;
mod schema;
mod source;
mod validate;
mod value;

#[cfg(test)]
mod fixtures;

pub use builder::{DumpOptions, IngestOptions, InputDict, InputDictBuilder};
#[cfg(feature = "clap")]
pub use cli::{DocumentArgs, DocumentSubcommand};
pub use coerce::{LiteralError, coerce, parse_literal};
pub use error::InputError;
pub use ops::{ActionResult, list_record};
pub use schema::{FieldDescriptor, Schema, TypeSpec};
pub use source::Source;
pub use types::{Action, Format};
pub use validate::{CrossValidator, LocalValidator, Verdict};
pub use value::{Kind, Record, Value};
