//! # inputdict demo application
//!
//! A sample CLI tool that shows how to wire [inputdict](https://docs.rs/inputdict)
//! into a real application. It is **not** a real solver; it exists to
//! demonstrate and manually verify inputdict's features.
//!
//! ## Running
//!
//! ```sh
//! cargo run --example inputdict_demo -- inputs gen > case.yaml
//! cargo run --example inputdict_demo -- run case.yaml
//! ```
//!
//! ## Features demonstrated
//!
//! | Feature                  | How to exercise it                                                        |
//! |--------------------------|---------------------------------------------------------------------------|
//! | Annotated YAML           | `cargo run --example inputdict_demo -- inputs gen`                        |
//! | Required fields only     | `cargo run --example inputdict_demo -- inputs gen --required-only`       |
//! | INI / TOML documents     | `cargo run --example inputdict_demo -- inputs gen -f ini -o case.ini`     |
//! | Validate and list        | `cargo run --example inputdict_demo -- inputs check case.ini`             |
//! | Typed extraction         | `cargo run --example inputdict_demo -- run case.yaml`                     |
//! | Replacement tokens       | add `__replacestrings__: {CASE: c1}` to a YAML file, then `run --expand`  |
//! | Tracing output           | `RUST_LOG=inputdict=trace cargo run --example inputdict_demo -- run x.yaml` |

mod schema;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use inputdict::{DocumentArgs, Format, IngestOptions, InputDict, InputError, Source, preprocess};

use schema::{DemoInputs, GLOBAL_HELP, demo_schema};

/// inputdict demo: a pretend solver with schema-validated inputs.
#[derive(Parser, Debug)]
#[command(name = "inputdict-demo")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate or check input documents (gen, check).
    Inputs(DocumentArgs),
    /// Load an input file and print the typed inputs.
    Run {
        path: PathBuf,
        /// Expand `__replacestrings__` tokens before validating.
        #[arg(long)]
        expand: bool,
        /// Drop undeclared keys instead of failing.
        #[arg(long)]
        allow_unused: bool,
    },
}

fn run(dict: &InputDict, path: &Path, expand: bool, allow_unused: bool) -> Result<(), InputError> {
    let format = Format::resolve(None, path)?;
    let mut opts = IngestOptions::default().check_unused(!allow_unused);
    if expand {
        opts = opts.expand_replacements(preprocess::DEFAULT_REPLACEMENTS_KEY);
    }
    let record = dict.ingest_text(Source::Path(path), &*format.codec(false), opts)?;
    let inputs: DemoInputs = record.deserialize_into()?;

    println!("case {:?}: {} steps of dt = {}", inputs.casename, inputs.nsteps, inputs.dt);
    println!("mesh {} x {} (periodic: {})", inputs.mesh.nx, inputs.mesh.ny, inputs.mesh.periodic);
    println!("scheme {}, tmax {}", inputs.scheme, inputs.tmax);
    for probe in &inputs.probes {
        println!("probe {:<12} at ({}, {})", probe.name, probe.x, probe.y);
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let schema = demo_schema().unwrap_or_else(|e| {
        eprintln!("Invalid schema:\n{e}");
        std::process::exit(2);
    });
    let dict = InputDict::builder(&schema).global_help(GLOBAL_HELP).build();

    let result = match cli.command {
        Commands::Inputs(args) => dict.handle_and_print(&args.into_action()),
        Commands::Run {
            path,
            expand,
            allow_unused,
        } => run(&dict, &path, expand, allow_unused),
    };
    if let Err(e) = result {
        eprintln!("Input error:\n{e}");
        std::process::exit(1);
    }
}
