//! Clap adapter for inputdict.
//!
//! This module is the **optional integration layer** between the
//! framework-agnostic core and the [clap](https://docs.rs/clap) CLI parser.
//! It is compiled only when the `clap` Cargo feature is enabled (on by
//! default).
//!
//! [`DocumentArgs`] embeds into your clap derive and gives your tool
//! `gen` and `check` subcommands. The only bridge to the core is
//! [`DocumentArgs::into_action()`], which converts the parsed arguments into
//! an [`Action`](crate::Action) for
//! [`InputDict::handle()`](crate::InputDict::handle).

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::types::{Action, Format};

/// Clap-derived args for the input document subcommands.
///
/// Embed this into your app's clap derive:
/// ```ignore
/// #[derive(Subcommand)]
/// enum Commands {
///     Inputs(DocumentArgs),
/// }
/// ```
#[derive(Debug, Args)]
pub struct DocumentArgs {
    #[command(subcommand)]
    pub action: Option<DocumentSubcommand>,
}

#[derive(Debug, Subcommand)]
pub enum DocumentSubcommand {
    /// Generate a default input document, annotated with field help.
    Gen {
        #[arg(short, long, value_enum, default_value_t = Format::Yaml)]
        format: Format,
        /// Leave out optional fields.
        #[arg(long)]
        required_only: bool,
        /// Leave out help comments and the header.
        #[arg(long)]
        no_comments: bool,
        /// Write to a file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate an input file and show the resolved values.
    Check {
        path: PathBuf,
        /// Input format (default: from the file extension).
        #[arg(short, long, value_enum)]
        format: Option<Format>,
        /// Skip type checks and validators.
        #[arg(long)]
        no_validate: bool,
        /// Drop undeclared keys instead of failing.
        #[arg(long)]
        allow_unused: bool,
    },
}

impl DocumentArgs {
    /// Convert clap-parsed args into a framework-agnostic `Action`.
    ///
    /// A bare invocation (no subcommand) generates the annotated YAML
    /// document on stdout.
    pub fn into_action(self) -> Action {
        match self.action {
            None => Action::Gen {
                format: Format::Yaml,
                include_optional: true,
                annotate: true,
                output: None,
            },
            Some(DocumentSubcommand::Gen {
                format,
                required_only,
                no_comments,
                output,
            }) => Action::Gen {
                format,
                include_optional: !required_only,
                annotate: !no_comments,
                output,
            },
            Some(DocumentSubcommand::Check {
                path,
                format,
                no_validate,
                allow_unused,
            }) => Action::Check {
                path,
                format,
                validate: !no_validate,
                check_unused: !allow_unused,
            },
        }
    }
}
