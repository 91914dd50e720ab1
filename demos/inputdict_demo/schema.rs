//! Input schema for the inputdict demo application.
//!
//! The demo pretends to be a small flow solver. Its inputs cover every kind
//! of field inputdict supports:
//!
//! | Key               | Kind                        | Notes                               |
//! |-------------------|-----------------------------|-------------------------------------|
//! | `casename`        | required string             |                                     |
//! | `nsteps`          | required int                | local validator: at least 1         |
//! | `dt`              | optional int or float       | cross-field: `dt * nsteps <= tmax`  |
//! | `tmax`            | optional float              |                                     |
//! | `scheme`          | optional string             | one of a fixed set                  |
//! | `mesh`            | nested schema               | `nx`, `ny`, `periodic`              |
//! | `probes`          | list of schema              | each probe has `name`, `x`, `y`     |

use inputdict::{FieldDescriptor, InputError, Kind, Record, Schema, Value, validators};
use serde::Deserialize;

pub const GLOBAL_HELP: &str = "Inputs for the inputdict demo solver\n\
Generated with: cargo run --example inputdict_demo -- inputs gen";

fn mesh_schema() -> Result<Schema, InputError> {
    Schema::new(vec![
        FieldDescriptor::required("nx")
            .of(Kind::Integer)
            .default(64)
            .validator(validators::in_range(2.0, 4096.0))
            .help("Cells in x"),
        FieldDescriptor::required("ny")
            .of(Kind::Integer)
            .default(64)
            .validator(validators::in_range(2.0, 4096.0))
            .help("Cells in y"),
        FieldDescriptor::optional("periodic")
            .of(Kind::Bool)
            .default(false)
            .help("Periodic in x"),
    ])
}

fn probe_schema() -> Result<Schema, InputError> {
    Schema::new(vec![
        FieldDescriptor::required("name").of(Kind::String).default("probe"),
        FieldDescriptor::required("x").one_of(&[Kind::Integer, Kind::Float]).default(0.5),
        FieldDescriptor::required("y").one_of(&[Kind::Integer, Kind::Float]).default(0.5),
    ])
}

fn fits_in_tmax(dt: &Value, record: &Record) -> (bool, String) {
    let steps = record.get("nsteps").and_then(Value::as_f64).unwrap_or(0.0);
    let tmax = record.get("tmax").and_then(Value::as_f64).unwrap_or(f64::INFINITY);
    let dt = dt.as_f64().unwrap_or(0.0);
    (
        dt * steps <= tmax,
        format!("{steps} steps of {dt} overshoot tmax = {tmax}"),
    )
}

/// The full demo schema.
pub fn demo_schema() -> Result<Schema, InputError> {
    let center: Record = [
        ("name", Value::from("center")),
        ("x", Value::from(0.5)),
        ("y", Value::from(0.5)),
    ]
    .into_iter()
    .collect();

    Schema::new(vec![
        FieldDescriptor::required("casename")
            .of(Kind::String)
            .default("demo")
            .help("Name of the case"),
        FieldDescriptor::required("nsteps")
            .of(Kind::Integer)
            .default(100)
            .check(|v| (v.as_i64().is_some_and(|n| n >= 1), "nsteps must be at least 1"))
            .help("Number of time steps"),
        FieldDescriptor::optional("dt")
            .one_of(&[Kind::Integer, Kind::Float])
            .default(0.01)
            .check_with_record(fits_in_tmax)
            .help("Time step"),
        FieldDescriptor::optional("tmax")
            .of(Kind::Float)
            .default(10.0)
            .help("End time"),
        FieldDescriptor::optional("scheme")
            .of(Kind::String)
            .default("upwind")
            .validator(validators::one_of(["upwind", "central", "weno"]))
            .help("Advection scheme"),
        FieldDescriptor::required("mesh")
            .nested(mesh_schema()?)
            .help("Mesh settings"),
        FieldDescriptor::optional("probes")
            .list_of(probe_schema()?)
            .default(vec![center])
            .help("Probe locations"),
    ])
}

/// Typed view of a resolved record.
#[derive(Debug, Deserialize)]
pub struct DemoInputs {
    pub casename: String,
    pub nsteps: i64,
    pub dt: f64,
    pub tmax: f64,
    pub scheme: String,
    pub mesh: Mesh,
    pub probes: Vec<Probe>,
}

#[derive(Debug, Deserialize)]
pub struct Mesh {
    pub nx: i64,
    pub ny: i64,
    pub periodic: bool,
}

#[derive(Debug, Deserialize)]
pub struct Probe {
    pub name: String,
    pub x: f64,
    pub y: f64,
}
