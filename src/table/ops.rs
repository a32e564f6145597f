//! Table operations
//!
//! Every operation returns a new `Table`. These are the only primitives the
//! transformation sandbox can reach: boolean row filtering, grouping with
//! aggregation, sorting, column derivation, rounding, limiting and
//! projection.

use super::{Table, Value};
use anyhow::{bail, Result};
use arrow::array::{Array, ArrayRef, BooleanArray, Float64Array, Int64Array, UInt32Array};
use arrow::compute::{filter, lexsort_to_indices, take, SortColumn, SortOptions};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Aggregation functions available to grouped summaries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateKind {
    Sum,
    Mean,
    Count,
    Min,
    Max,
}

/// Row-filter comparison operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CmpOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
}

impl Table {
    /// Keep rows where `mask` is true.
    pub fn filter_rows(&self, mask: &BooleanArray) -> Result<Table> {
        let mut columns = Vec::with_capacity(self.columns().len());
        for array in self.columns() {
            columns.push(filter(array.as_ref(), mask)?);
        }
        Ok(Table::from_parts(self.schema().clone(), columns))
    }

    /// Reorder/select rows by position.
    pub fn take_rows(&self, indices: &UInt32Array) -> Result<Table> {
        let mut columns = Vec::with_capacity(self.columns().len());
        for array in self.columns() {
            columns.push(take(array.as_ref(), indices, None)?);
        }
        Ok(Table::from_parts(self.schema().clone(), columns))
    }

    /// Keep rows where `column <op> value` holds. `value` is the raw JSON
    /// scalar from the transformation program (an array for `in`). Rows with
    /// null cells never match.
    pub fn filter_compare(
        &self,
        column: &str,
        op: CmpOp,
        value: &serde_json::Value,
    ) -> Result<Table> {
        let col = self
            .index_of(column)
            .ok_or_else(|| anyhow::anyhow!("unknown column '{}' in filter", column))?;

        let mask: Vec<bool> = match op {
            CmpOp::In => {
                let allowed: Vec<Value> = match value {
                    serde_json::Value::Array(items) => {
                        items.iter().filter_map(Value::from_json).collect()
                    }
                    scalar => Value::from_json(scalar).into_iter().collect(),
                };
                (0..self.num_rows())
                    .map(|row| match self.value_at(col, row) {
                        Some(cell) => allowed.iter().any(|v| cell.loosely_equals(v)),
                        None => false,
                    })
                    .collect()
            }
            _ => {
                let target = Value::from_json(value).ok_or_else(|| {
                    anyhow::anyhow!("filter value for column '{}' must be a scalar", column)
                })?;
                (0..self.num_rows())
                    .map(|row| match self.value_at(col, row) {
                        Some(cell) => compare_matches(&cell, op, &target),
                        None => false,
                    })
                    .collect()
            }
        };

        self.filter_rows(&BooleanArray::from(mask))
    }

    /// Group by one or more columns and aggregate. `aggs` entries are
    /// (source column, function, output alias). Group order follows first
    /// appearance in the input, so results are deterministic.
    pub fn group_aggregate(
        &self,
        by: &[String],
        aggs: &[(String, AggregateKind, String)],
    ) -> Result<Table> {
        if by.is_empty() {
            bail!("group requires at least one key column");
        }
        let key_indices: Vec<usize> = by
            .iter()
            .map(|name| {
                self.index_of(name)
                    .ok_or_else(|| anyhow::anyhow!("unknown column '{}' in group keys", name))
            })
            .collect::<Result<_>>()?;

        let agg_indices: Vec<usize> = aggs
            .iter()
            .map(|(name, kind, _)| {
                let idx = self
                    .index_of(name)
                    .ok_or_else(|| anyhow::anyhow!("unknown column '{}' in aggregate", name))?;
                if *kind != AggregateKind::Count && !self.is_numeric(name) {
                    bail!("cannot aggregate non-numeric column '{}'", name);
                }
                Ok(idx)
            })
            .collect::<Result<_>>()?;

        // First-appearance group order keeps re-execution deterministic.
        let mut lookup: HashMap<String, usize> = HashMap::new();
        let mut first_rows: Vec<u32> = Vec::new();
        let mut group_rows: Vec<Vec<usize>> = Vec::new();

        for row in 0..self.num_rows() {
            let mut key = String::new();
            for &col in &key_indices {
                match self.value_at(col, row) {
                    Some(v) => key.push_str(&v.to_string()),
                    None => key.push('\u{0}'),
                }
                key.push('\u{1f}');
            }
            let group = *lookup.entry(key).or_insert_with(|| {
                first_rows.push(row as u32);
                group_rows.push(Vec::new());
                group_rows.len() - 1
            });
            group_rows[group].push(row);
        }

        let first = UInt32Array::from(first_rows);
        let mut named: Vec<(String, ArrayRef)> = Vec::new();
        for (name, &col) in by.iter().zip(&key_indices) {
            let array = take(self.columns()[col].as_ref(), &first, None)?;
            named.push((name.clone(), array));
        }

        for ((_, kind, alias), &col) in aggs.iter().zip(&agg_indices) {
            let array: ArrayRef = match kind {
                AggregateKind::Count => {
                    let counts: Vec<i64> = group_rows
                        .iter()
                        .map(|rows| {
                            rows.iter()
                                .filter(|&&row| self.value_at(col, row).is_some())
                                .count() as i64
                        })
                        .collect();
                    Arc::new(Int64Array::from(counts))
                }
                _ => {
                    let values: Vec<f64> = group_rows
                        .iter()
                        .map(|rows| {
                            let present: Vec<f64> =
                                rows.iter().filter_map(|&row| self.numeric_at(col, row)).collect();
                            aggregate(*kind, &present)
                        })
                        .collect();
                    Arc::new(Float64Array::from(values))
                }
            };
            named.push((alias.clone(), array));
        }

        Ok(Table::new(named))
    }

    /// Sort by one or more columns, one direction for the whole key list.
    pub fn sort_by(&self, by: &[String], descending: bool) -> Result<Table> {
        if by.is_empty() {
            bail!("sort requires at least one key column");
        }
        let sort_columns: Vec<SortColumn> = by
            .iter()
            .map(|name| {
                let idx = self
                    .index_of(name)
                    .ok_or_else(|| anyhow::anyhow!("unknown column '{}' in sort keys", name))?;
                Ok(SortColumn {
                    values: self.columns()[idx].clone(),
                    options: Some(SortOptions {
                        descending,
                        nulls_first: false,
                    }),
                })
            })
            .collect::<Result<_>>()?;
        let indices = lexsort_to_indices(&sort_columns, None)?;
        self.take_rows(&indices)
    }

    /// Append a column, replacing any existing column of the same name.
    pub fn with_column(&self, name: &str, array: ArrayRef) -> Table {
        let mut named: Vec<(String, ArrayRef)> = self
            .column_names()
            .into_iter()
            .zip(self.columns().iter().cloned())
            .filter(|(existing, _)| existing != name)
            .collect();
        named.push((name.to_string(), array));
        Table::new(named)
    }

    /// Round every Float64 column to `decimals` places.
    pub fn round_numeric(&self, decimals: u32) -> Table {
        let factor = 10f64.powi(decimals as i32);
        let named: Vec<(String, ArrayRef)> = self
            .column_names()
            .into_iter()
            .zip(self.columns().iter())
            .map(|(name, array)| {
                let rounded: ArrayRef = match array.as_any().downcast_ref::<Float64Array>() {
                    Some(floats) => {
                        let values: Vec<Option<f64>> = (0..floats.len())
                            .map(|i| {
                                if floats.is_null(i) {
                                    None
                                } else {
                                    Some((floats.value(i) * factor).round() / factor)
                                }
                            })
                            .collect();
                        Arc::new(Float64Array::from(values))
                    }
                    _ => array.clone(),
                };
                (name, rounded)
            })
            .collect();
        Table::new(named)
    }

    /// Project onto the named columns, in the given order.
    pub fn select(&self, columns: &[String]) -> Result<Table> {
        let named: Vec<(String, ArrayRef)> = columns
            .iter()
            .map(|name| {
                let idx = self
                    .index_of(name)
                    .ok_or_else(|| anyhow::anyhow!("unknown column '{}' in select", name))?;
                Ok((name.clone(), self.columns()[idx].clone()))
            })
            .collect::<Result<_>>()?;
        Ok(Table::new(named))
    }
}

fn compare_matches(cell: &Value, op: CmpOp, target: &Value) -> bool {
    use std::cmp::Ordering;
    match op {
        CmpOp::Eq => cell.loosely_equals(target),
        CmpOp::Ne => cell.loosely_cmp(target).is_some() && !cell.loosely_equals(target),
        CmpOp::Gt => cell.loosely_cmp(target) == Some(Ordering::Greater),
        CmpOp::Lt => cell.loosely_cmp(target) == Some(Ordering::Less),
        CmpOp::Gte => matches!(
            cell.loosely_cmp(target),
            Some(Ordering::Greater) | Some(Ordering::Equal)
        ),
        CmpOp::Lte => matches!(
            cell.loosely_cmp(target),
            Some(Ordering::Less) | Some(Ordering::Equal)
        ),
        CmpOp::In => unreachable!("membership handled by caller"),
    }
}

fn aggregate(kind: AggregateKind, values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    match kind {
        AggregateKind::Sum => values.iter().sum(),
        AggregateKind::Mean => values.iter().sum::<f64>() / values.len() as f64,
        AggregateKind::Min => values.iter().fold(f64::INFINITY, |a, &b| a.min(b)),
        AggregateKind::Max => values.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b)),
        AggregateKind::Count => values.len() as f64,
    }
}
