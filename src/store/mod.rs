//! Tabular store
//!
//! Loads and owns the base sales dataset as an in-memory columnar table and
//! exposes membership filtering over it. Constructed once at startup and
//! passed into the orchestrator as an explicit dependency.

use crate::error::AssistantError;
use crate::table::{Table, Value};
use arrow::array::{Array, ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

pub mod generator;

/// Owner of the base dataset.
pub struct SalesStore {
    table: Table,
}

impl SalesStore {
    pub fn from_table(table: Table) -> Self {
        Self { table }
    }

    /// Deterministic in-memory sample dataset (no file needed).
    pub fn generate(rows: usize) -> Self {
        Self {
            table: generator::generate(rows),
        }
    }

    /// Load a delimited dataset with per-column type sniffing: a column
    /// parses as Int64, else Float64, else stays Utf8. Empty cells become
    /// nulls.
    pub fn load_csv(path: &Path) -> Result<Self, AssistantError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)
            .map_err(|e| {
                AssistantError::dataset_with_path(e.to_string(), path.display().to_string())
            })?;
        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| AssistantError::dataset(e.to_string()))?
            .iter()
            .map(|s| s.to_string())
            .collect();

        let mut rows: Vec<Vec<String>> = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| AssistantError::dataset(e.to_string()))?;
            rows.push(record.iter().map(|s| s.to_string()).collect());
        }
        if rows.is_empty() {
            return Err(AssistantError::dataset_with_path(
                "dataset contains no rows",
                path.display().to_string(),
            ));
        }

        let mut named: Vec<(String, ArrayRef)> = Vec::with_capacity(headers.len());
        for (col_idx, name) in headers.iter().enumerate() {
            let mut int_vals: Vec<Option<i64>> = Vec::with_capacity(rows.len());
            let mut float_vals: Vec<Option<f64>> = Vec::with_capacity(rows.len());
            let mut str_vals: Vec<Option<String>> = Vec::with_capacity(rows.len());
            let mut is_int = true;
            let mut is_float = true;

            for row in &rows {
                let cell = row.get(col_idx).map(String::as_str).unwrap_or("");
                if cell.is_empty() {
                    int_vals.push(None);
                    float_vals.push(None);
                    str_vals.push(None);
                } else if let Ok(i) = cell.parse::<i64>() {
                    int_vals.push(Some(i));
                    float_vals.push(Some(i as f64));
                    str_vals.push(Some(cell.to_string()));
                } else if let Ok(f) = cell.parse::<f64>() {
                    is_int = false;
                    float_vals.push(Some(f));
                    str_vals.push(Some(cell.to_string()));
                } else {
                    is_int = false;
                    is_float = false;
                    str_vals.push(Some(cell.to_string()));
                }
            }

            let array: ArrayRef = if is_int {
                Arc::new(Int64Array::from(int_vals))
            } else if is_float {
                Arc::new(Float64Array::from(float_vals))
            } else {
                Arc::new(StringArray::from(str_vals))
            };
            named.push((name.clone(), array));
        }

        let table = Table::new(named);
        info!(
            rows = table.num_rows(),
            columns = table.num_columns(),
            path = %path.display(),
            "loaded dataset"
        );
        Ok(Self { table })
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Rows where every constrained column's value is in its allowed set.
    /// Columns absent from `predicates` are unconstrained; a predicate
    /// naming an unknown column matches nothing. No error path.
    pub fn filter(&self, predicates: &HashMap<String, Vec<Value>>) -> Table {
        let table = &self.table;
        let mut mask = vec![true; table.num_rows()];
        for (column, allowed) in predicates {
            match table.index_of(column) {
                Some(col) => {
                    for (row, keep) in mask.iter_mut().enumerate() {
                        if !*keep {
                            continue;
                        }
                        *keep = match table.value_at(col, row) {
                            Some(cell) => allowed.iter().any(|v| cell.loosely_equals(v)),
                            None => false,
                        };
                    }
                }
                None => mask.iter_mut().for_each(|keep| *keep = false),
            }
        }
        table
            .filter_rows(&BooleanArray::from(mask))
            .unwrap_or_else(|_| table.head(0))
    }

    /// Headline numbers for banners and prompt context.
    pub fn summary(&self) -> DatasetSummary {
        let table = &self.table;
        DatasetSummary {
            total_records: table.num_rows(),
            total_revenue: column_sum(table, "revenue"),
            total_profit: column_sum(table, "profit"),
            avg_profit_margin: column_mean(table, "profit_margin"),
            regions: distinct_strings(table, "region"),
            categories: distinct_strings(table, "category"),
            years: distinct_ints(table, "year"),
            date_range: date_range(table, "order_date"),
        }
    }
}

/// Dataset overview record.
#[derive(Clone, Debug, Serialize)]
pub struct DatasetSummary {
    pub total_records: usize,
    pub total_revenue: f64,
    pub total_profit: f64,
    pub avg_profit_margin: f64,
    pub regions: Vec<String>,
    pub categories: Vec<String>,
    pub years: Vec<i64>,
    pub date_range: Option<(String, String)>,
}

fn column_sum(table: &Table, name: &str) -> f64 {
    match table.index_of(name) {
        Some(col) => (0..table.num_rows())
            .filter_map(|row| table.numeric_at(col, row))
            .sum(),
        None => 0.0,
    }
}

fn column_mean(table: &Table, name: &str) -> f64 {
    match table.index_of(name) {
        Some(col) => {
            let values: Vec<f64> = (0..table.num_rows())
                .filter_map(|row| table.numeric_at(col, row))
                .collect();
            if values.is_empty() {
                0.0
            } else {
                values.iter().sum::<f64>() / values.len() as f64
            }
        }
        None => 0.0,
    }
}

fn distinct_strings(table: &Table, name: &str) -> Vec<String> {
    let Some(array) = table.column_by_name(name) else {
        return vec![];
    };
    let Some(strings) = array.as_any().downcast_ref::<StringArray>() else {
        return vec![];
    };
    let mut out: Vec<String> = (0..strings.len())
        .filter(|&i| !strings.is_null(i))
        .map(|i| strings.value(i).to_string())
        .collect();
    out.sort();
    out.dedup();
    out
}

fn distinct_ints(table: &Table, name: &str) -> Vec<i64> {
    let Some(array) = table.column_by_name(name) else {
        return vec![];
    };
    let Some(ints) = array.as_any().downcast_ref::<Int64Array>() else {
        return vec![];
    };
    let mut out: Vec<i64> = (0..ints.len())
        .filter(|&i| !ints.is_null(i))
        .map(|i| ints.value(i))
        .collect();
    out.sort_unstable();
    out.dedup();
    out
}

fn date_range(table: &Table, name: &str) -> Option<(String, String)> {
    let dates = distinct_strings(table, name);
    match (dates.first(), dates.last()) {
        (Some(min), Some(max)) => Some((min.clone(), max.clone())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_filter_constrains_only_named_columns() {
        let store = SalesStore::generate(200);
        let mut predicates = HashMap::new();
        predicates.insert(
            "region".to_string(),
            vec![Value::Str("Europe".to_string())],
        );
        let filtered = store.filter(&predicates);
        assert!(filtered.num_rows() > 0);
        assert!(filtered.num_rows() < store.table().num_rows());
        let col = filtered.index_of("region").unwrap();
        for row in 0..filtered.num_rows() {
            assert_eq!(
                filtered.value_at(col, row),
                Some(Value::Str("Europe".to_string()))
            );
        }
    }

    #[test]
    fn unknown_predicate_column_matches_nothing() {
        let store = SalesStore::generate(50);
        let mut predicates = HashMap::new();
        predicates.insert("planet".to_string(), vec![Value::Str("Mars".to_string())]);
        assert_eq!(store.filter(&predicates).num_rows(), 0);
    }

    #[test]
    fn multi_column_predicates_intersect() {
        let store = SalesStore::generate(500);
        let mut predicates = HashMap::new();
        predicates.insert("year".to_string(), vec![Value::Int(2024)]);
        predicates.insert(
            "category".to_string(),
            vec![Value::Str("Electronics".to_string())],
        );
        let filtered = store.filter(&predicates);
        let year_col = filtered.index_of("year").unwrap();
        let cat_col = filtered.index_of("category").unwrap();
        for row in 0..filtered.num_rows() {
            assert_eq!(filtered.value_at(year_col, row), Some(Value::Int(2024)));
            assert_eq!(
                filtered.value_at(cat_col, row),
                Some(Value::Str("Electronics".to_string()))
            );
        }
    }

    #[test]
    fn summary_reports_dimensions() {
        let store = SalesStore::generate(300);
        let summary = store.summary();
        assert_eq!(summary.total_records, 300);
        assert!(summary.total_revenue > 0.0);
        assert_eq!(summary.years, vec![2022, 2023, 2024]);
        assert_eq!(summary.regions.len(), 4);
        assert!(summary.date_range.is_some());
    }
}
