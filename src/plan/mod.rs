//! Transformation program dialect
//!
//! The closed instruction set the model emits instead of free-form code. A
//! program is a JSON object whose `result` binding holds an ordered array of
//! steps; each step is one of the tagged operations below. Interpretation
//! lives in the sandbox; this module is the wire shape plus per-step
//! application.

use crate::table::{AggregateKind, CmpOp, Table};
use anyhow::{bail, Result};
use arrow::array::{ArrayRef, Float64Array};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One table operation.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PlanStep {
    /// Keep rows where `column cmp value` holds (`value` is an array for `in`)
    Filter {
        column: String,
        cmp: CmpOp,
        value: serde_json::Value,
    },
    /// Group by key columns and aggregate measures
    Group {
        by: Vec<String>,
        aggregate: Vec<AggregateSpec>,
    },
    /// Sort by key columns, one direction for the whole key list
    Sort {
        by: Vec<String>,
        #[serde(default)]
        descending: bool,
    },
    /// Derive a numeric column from an arithmetic expression
    Derive {
        #[serde(rename = "as")]
        name: String,
        expr: Expr,
    },
    /// Round every float column
    Round { decimals: u32 },
    /// Keep the first N rows
    Limit { rows: usize },
    /// Project onto the named columns
    Select { columns: Vec<String> },
}

/// One aggregation inside a `group` step.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AggregateSpec {
    pub column: String,
    pub agg: AggregateKind,
    #[serde(rename = "as")]
    pub alias: String,
}

/// Arithmetic expression over columns and literals.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Expr {
    Column(String),
    Literal(f64),
    Binary {
        left: Box<Expr>,
        operator: BinOp,
        right: Box<Expr>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl Expr {
    /// Evaluate for one row. Null cells read as 0; division by zero yields 0
    /// (the profit-margin guard).
    pub fn evaluate(&self, table: &Table, row: usize) -> Result<f64> {
        match self {
            Expr::Literal(v) => Ok(*v),
            Expr::Column(name) => {
                let idx = table
                    .index_of(name)
                    .ok_or_else(|| anyhow::anyhow!("unknown column '{}' in expression", name))?;
                if !table.is_numeric(name) {
                    bail!("column '{}' is not numeric", name);
                }
                Ok(table.numeric_at(idx, row).unwrap_or(0.0))
            }
            Expr::Binary {
                left,
                operator,
                right,
            } => {
                let l = left.evaluate(table, row)?;
                let r = right.evaluate(table, row)?;
                Ok(match operator {
                    BinOp::Add => l + r,
                    BinOp::Sub => l - r,
                    BinOp::Mul => l * r,
                    BinOp::Div => {
                        if r == 0.0 {
                            0.0
                        } else {
                            l / r
                        }
                    }
                })
            }
        }
    }
}

impl PlanStep {
    /// Apply this step to a table, producing a new table.
    pub fn apply(&self, table: &Table) -> Result<Table> {
        match self {
            PlanStep::Filter { column, cmp, value } => table.filter_compare(column, *cmp, value),
            PlanStep::Group { by, aggregate } => {
                let aggs: Vec<(String, AggregateKind, String)> = aggregate
                    .iter()
                    .map(|a| (a.column.clone(), a.agg, a.alias.clone()))
                    .collect();
                table.group_aggregate(by, &aggs)
            }
            PlanStep::Sort { by, descending } => table.sort_by(by, *descending),
            PlanStep::Derive { name, expr } => {
                let values: Vec<f64> = (0..table.num_rows())
                    .map(|row| expr.evaluate(table, row))
                    .collect::<Result<_>>()?;
                Ok(table.with_column(name, Arc::new(Float64Array::from(values)) as ArrayRef))
            }
            PlanStep::Round { decimals } => Ok(table.round_numeric(*decimals)),
            PlanStep::Limit { rows } => Ok(table.head(*rows)),
            PlanStep::Select { columns } => table.select(columns),
        }
    }
}
