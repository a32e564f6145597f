use arrow::array::{Array, ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use std::fmt;
use std::sync::Arc;

pub mod ops;

pub use ops::{AggregateKind, CmpOp};

/// Columnar table - an ordered collection of named, typed columns with
/// equal-length rows. Immutable once produced: every operation yields a new
/// `Table` rather than mutating in place.
///
/// Supported column types are Utf8, Int64 and Float64, which is what the
/// CSV loader and the sample generator produce.
#[derive(Clone, Debug)]
pub struct Table {
    /// Schema describing the columns
    schema: SchemaRef,

    /// Column arrays (one per column)
    columns: Vec<ArrayRef>,

    /// Number of rows
    row_count: usize,
}

impl Table {
    /// Build a table from (name, array) pairs.
    pub fn new(named: Vec<(String, ArrayRef)>) -> Self {
        let row_count = named.first().map(|(_, a)| a.len()).unwrap_or(0);

        #[cfg(debug_assertions)]
        {
            for (name, array) in &named {
                if array.len() != row_count {
                    eprintln!(
                        "WARNING: column '{}' has {} rows, expected {}",
                        name,
                        array.len(),
                        row_count
                    );
                }
            }
        }

        let fields: Vec<Field> = named
            .iter()
            .map(|(name, array)| Field::new(name.as_str(), array.data_type().clone(), true))
            .collect();
        let columns = named.into_iter().map(|(_, a)| a).collect();

        Self {
            schema: Arc::new(Schema::new(fields)),
            columns,
            row_count,
        }
    }

    /// Build a table from an existing schema and column set.
    pub fn from_parts(schema: SchemaRef, columns: Vec<ArrayRef>) -> Self {
        let row_count = columns.first().map(|c| c.len()).unwrap_or(0);
        Self {
            schema,
            columns,
            row_count,
        }
    }

    /// Create an empty table with no columns.
    pub fn empty() -> Self {
        Self {
            schema: Arc::new(Schema::empty()),
            columns: vec![],
            row_count: 0,
        }
    }

    pub fn num_rows(&self) -> usize {
        self.row_count
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    pub fn columns(&self) -> &[ArrayRef] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.schema
            .fields()
            .iter()
            .map(|f| f.name().to_string())
            .collect()
    }

    /// Get a column by index
    pub fn column(&self, idx: usize) -> Option<&ArrayRef> {
        self.columns.get(idx)
    }

    /// Get a column by name
    pub fn column_by_name(&self, name: &str) -> Option<&ArrayRef> {
        let idx = self.schema.index_of(name).ok()?;
        self.column(idx)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.schema.index_of(name).ok()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    /// Whether the named column holds Int64 or Float64 values.
    pub fn is_numeric(&self, name: &str) -> bool {
        match self.column_by_name(name) {
            Some(array) => matches!(array.data_type(), DataType::Int64 | DataType::Float64),
            None => false,
        }
    }

    /// First numeric column, in schema order.
    pub fn first_numeric_column(&self) -> Option<String> {
        self.column_names()
            .into_iter()
            .find(|name| self.is_numeric(name))
    }

    /// Snapshot for sandboxed execution. Arrays are immutable, so sharing
    /// the buffers is safe; the snapshot guarantees the caller's table can
    /// never observe a transformation in progress.
    pub fn snapshot(&self) -> Table {
        Self {
            schema: self.schema.clone(),
            columns: self.columns.clone(),
            row_count: self.row_count,
        }
    }

    /// First `n` rows (zero-copy slice).
    pub fn head(&self, n: usize) -> Table {
        let len = n.min(self.row_count);
        let columns = self.columns.iter().map(|c| c.slice(0, len)).collect();
        Self {
            schema: self.schema.clone(),
            columns,
            row_count: len,
        }
    }

    /// Typed scalar access; `None` for nulls and out-of-range positions.
    pub fn value_at(&self, col: usize, row: usize) -> Option<Value> {
        let array = self.columns.get(col)?;
        if row >= array.len() || array.is_null(row) {
            return None;
        }
        match array.data_type() {
            DataType::Int64 => array
                .as_any()
                .downcast_ref::<Int64Array>()
                .map(|a| Value::Int(a.value(row))),
            DataType::Float64 => array
                .as_any()
                .downcast_ref::<Float64Array>()
                .map(|a| Value::Float(a.value(row))),
            DataType::Utf8 => array
                .as_any()
                .downcast_ref::<StringArray>()
                .map(|a| Value::Str(a.value(row).to_string())),
            _ => None,
        }
    }

    /// Numeric scalar access; Int64 widens to f64.
    pub fn numeric_at(&self, col: usize, row: usize) -> Option<f64> {
        match self.value_at(col, row)? {
            Value::Int(i) => Some(i as f64),
            Value::Float(f) => Some(f),
            Value::Str(_) => None,
        }
    }
}

/// Scalar cell value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Str(String),
    Int(i64),
    Float(f64),
}

impl Value {
    /// Convert a JSON scalar. Objects, arrays, null and booleans have no
    /// cell representation and yield `None`.
    pub fn from_json(v: &serde_json::Value) -> Option<Value> {
        match v {
            serde_json::Value::String(s) => Some(Value::Str(s.clone())),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(Value::Int(i))
                } else {
                    n.as_f64().map(Value::Float)
                }
            }
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Str(_) => None,
        }
    }

    /// Equality across numeric widths: Int(2024) matches Float(2024.0).
    pub fn loosely_equals(&self, other: &Value) -> bool {
        match (self.as_f64(), other.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => match (self, other) {
                (Value::Str(a), Value::Str(b)) => a == b,
                _ => false,
            },
        }
    }

    /// Ordering across numeric widths; strings compare lexicographically
    /// (which orders quarter labels like "Q1" < "Q2" correctly).
    pub fn loosely_cmp(&self, other: &Value) -> Option<std::cmp::Ordering> {
        match (self.as_f64(), other.as_f64()) {
            (Some(a), Some(b)) => Some(a.total_cmp(&b)),
            _ => match (self, other) {
                (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
                _ => None,
            },
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "{}", s),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> Table {
        Table::new(vec![
            (
                "region".to_string(),
                Arc::new(StringArray::from(vec!["Europe", "Asia Pacific"])) as ArrayRef,
            ),
            (
                "year".to_string(),
                Arc::new(Int64Array::from(vec![2023, 2024])) as ArrayRef,
            ),
            (
                "revenue".to_string(),
                Arc::new(Float64Array::from(vec![100.0, 250.5])) as ArrayRef,
            ),
        ])
    }

    #[test]
    fn column_lookup_and_types() {
        let table = sample_table();
        assert_eq!(table.num_rows(), 2);
        assert!(table.has_column("revenue"));
        assert!(!table.has_column("missing"));
        assert!(table.is_numeric("year"));
        assert!(!table.is_numeric("region"));
        assert_eq!(table.first_numeric_column(), Some("year".to_string()));
    }

    #[test]
    fn value_access() {
        let table = sample_table();
        assert_eq!(
            table.value_at(0, 1),
            Some(Value::Str("Asia Pacific".to_string()))
        );
        assert_eq!(table.numeric_at(1, 0), Some(2023.0));
        assert_eq!(table.numeric_at(2, 1), Some(250.5));
        assert_eq!(table.value_at(0, 5), None);
    }

    #[test]
    fn loose_value_semantics() {
        assert!(Value::Int(2024).loosely_equals(&Value::Float(2024.0)));
        assert!(!Value::Str("2024".to_string()).loosely_equals(&Value::Int(2024)));
        assert_eq!(
            Value::Str("Q1".to_string()).loosely_cmp(&Value::Str("Q2".to_string())),
            Some(std::cmp::Ordering::Less)
        );
    }

    #[test]
    fn head_is_bounded() {
        let table = sample_table();
        assert_eq!(table.head(10).num_rows(), 2);
        assert_eq!(table.head(1).num_rows(), 1);
    }
}
