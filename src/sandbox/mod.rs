//! Transformation sandbox
//!
//! Interprets a model-generated transformation program against a table
//! snapshot. The program reaches exactly two things: the input table and the
//! closed operation set in `plan`. No host symbols, filesystem, network or
//! clock are reachable, so re-running an identical program against an
//! identical table yields a structurally identical result.

use crate::plan::PlanStep;
use crate::table::Table;
use thiserror::Error;
use tracing::debug;

/// The single output binding a program must populate.
pub const RESULT_BINDING: &str = "result";

/// Why a transformation program produced no table.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SandboxFault {
    /// A step failed to parse or apply: unknown column, non-numeric
    /// aggregation target, malformed step structure
    #[error("transformation failed: {0}")]
    Execution(String),

    /// The program object has no `result` binding
    #[error("program produced no 'result' binding")]
    MissingResult,

    /// The `result` binding is not an array of transformation steps
    #[error("'result' binding is not a transformation pipeline (got {actual})")]
    TypeMismatch { actual: String },
}

/// Execute a raw transformation program against `input`.
///
/// The input is snapshotted before any step runs; the caller's table is
/// never touched. All failures come back as a `SandboxFault`; nothing
/// escapes this boundary.
pub fn run_program(raw: &serde_json::Value, input: &Table) -> Result<Table, SandboxFault> {
    let object = match raw {
        serde_json::Value::Object(map) => map,
        _ => return Err(SandboxFault::MissingResult),
    };
    let binding = object
        .get(RESULT_BINDING)
        .ok_or(SandboxFault::MissingResult)?;
    let raw_steps = match binding {
        serde_json::Value::Array(items) => items,
        other => {
            return Err(SandboxFault::TypeMismatch {
                actual: json_type_name(other).to_string(),
            })
        }
    };

    let steps: Vec<PlanStep> = raw_steps
        .iter()
        .map(|v| {
            serde_json::from_value(v.clone()).map_err(|e| SandboxFault::Execution(e.to_string()))
        })
        .collect::<Result<_, _>>()?;

    let mut current = input.snapshot();
    for (i, step) in steps.iter().enumerate() {
        current = step
            .apply(&current)
            .map_err(|e| SandboxFault::Execution(e.to_string()))?;
        debug!(step = i, rows = current.num_rows(), "applied transformation step");
    }
    Ok(current)
}

fn json_type_name(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
