//! Result formatting for the rendering boundary
//!
//! The core hands the UI stringified rows rather than arrow arrays:
//! currency measures render as dollars, margin columns as percentages,
//! everything else verbatim. How these are painted to screen is external.

use crate::contract::OperationKind;
use crate::table::{Table, Value};
use serde::Serialize;

const CURRENCY_COLUMNS: &[&str] = &["revenue", "cost", "profit", "unit_price"];

/// Display-ready rows for one result table.
#[derive(Clone, Debug, Serialize)]
pub struct RenderedTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Row count before the display cap
    pub total_rows: usize,
}

/// Stringify up to `max_rows` rows of a table for display.
pub fn table_rows(table: &Table, max_rows: usize) -> RenderedTable {
    let columns = table.column_names();
    let shown = max_rows.min(table.num_rows());
    let mut rows = Vec::with_capacity(shown);
    for row in 0..shown {
        let mut cells = Vec::with_capacity(columns.len());
        for (col, name) in columns.iter().enumerate() {
            cells.push(format_cell(table, col, name, row));
        }
        rows.push(cells);
    }
    RenderedTable {
        columns,
        rows,
        total_rows: table.num_rows(),
    }
}

fn format_cell(table: &Table, col: usize, name: &str, row: usize) -> String {
    match table.value_at(col, row) {
        None => String::new(),
        Some(Value::Str(s)) => s,
        Some(Value::Int(i)) => {
            if is_currency(name) {
                format_currency(i as f64)
            } else {
                i.to_string()
            }
        }
        Some(Value::Float(f)) => {
            if is_currency(name) {
                format_currency(f)
            } else if is_percent(name) {
                format!("{:.1}%", f)
            } else {
                format!("{}", f)
            }
        }
    }
}

fn is_currency(name: &str) -> bool {
    CURRENCY_COLUMNS.contains(&name)
}

fn is_percent(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.contains("margin") || lower.contains("pct")
}

/// `$1,234.56`, thousands-grouped, sign in front of the dollar sign.
pub fn format_currency(amount: f64) -> String {
    let negative = amount < 0.0;
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let fraction = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if negative {
        format!("-${}.{:02}", grouped, fraction)
    } else {
        format!("${}.{:02}", grouped, fraction)
    }
}

/// Badge text for an operation kind.
pub fn operation_label(operation: OperationKind) -> &'static str {
    match operation {
        OperationKind::Slice => "Slice",
        OperationKind::Dice => "Dice",
        OperationKind::GroupSummarize => "Group & Summarize",
        OperationKind::DrillDown => "Drill-Down",
        OperationKind::RollUp => "Roll-Up",
        OperationKind::Compare => "Compare",
        OperationKind::Overview => "Overview",
        OperationKind::Error => "Error",
    }
}
