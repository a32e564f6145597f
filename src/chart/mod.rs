//! Chart directive resolution
//!
//! The model proposes axis/color/title bindings before the result table
//! exists. Resolution happens after execution: requested columns that are
//! missing from the result are substituted (x → first column, y → first
//! numeric column or last column) or dropped (color), so the resolved
//! directive only ever references existing columns.

use crate::contract::{ChartKind, ChartSpec};
use crate::table::Table;
use serde::Serialize;

/// Fully resolved chart bindings, guaranteed valid against the result table.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResolvedChart {
    pub kind: ChartKind,
    pub x: String,
    pub y: String,
    pub color: Option<String>,
    pub title: String,
}

/// Resolve a proposed directive against the actual result columns.
/// `Table`/`None` kinds (and empty results) mean tabular display only.
pub fn resolve(kind: ChartKind, spec: &ChartSpec, table: &Table) -> Option<ResolvedChart> {
    if matches!(kind, ChartKind::Table | ChartKind::None) {
        return None;
    }
    let names = table.column_names();
    let first = names.first()?.clone();
    let last = names.last()?.clone();

    let x = spec
        .x
        .as_ref()
        .filter(|c| table.has_column(c))
        .cloned()
        .unwrap_or(first);
    let y = spec
        .y
        .as_ref()
        .filter(|c| table.has_column(c))
        .cloned()
        .unwrap_or_else(|| table.first_numeric_column().unwrap_or(last));
    let color = spec
        .color
        .as_ref()
        .filter(|c| table.has_column(c))
        .cloned();
    let title = spec.title.clone().unwrap_or_default();

    Some(ResolvedChart {
        kind,
        x,
        y,
        color,
        title,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{ArrayRef, Float64Array, StringArray};
    use std::sync::Arc;

    fn result_table() -> Table {
        Table::new(vec![
            (
                "region".to_string(),
                Arc::new(StringArray::from(vec!["Europe"])) as ArrayRef,
            ),
            (
                "revenue".to_string(),
                Arc::new(Float64Array::from(vec![50.0])) as ArrayRef,
            ),
        ])
    }

    #[test]
    fn table_kind_bypasses_chart() {
        let spec = ChartSpec::default();
        assert!(resolve(ChartKind::Table, &spec, &result_table()).is_none());
        assert!(resolve(ChartKind::None, &spec, &result_table()).is_none());
    }

    #[test]
    fn missing_axes_are_substituted() {
        let spec = ChartSpec {
            x: Some("quarter".to_string()),
            y: Some("sales".to_string()),
            color: None,
            title: Some("Revenue".to_string()),
        };
        let chart = resolve(ChartKind::Bar, &spec, &result_table()).unwrap();
        assert_eq!(chart.x, "region");
        assert_eq!(chart.y, "revenue");
        assert_eq!(chart.title, "Revenue");
    }

    #[test]
    fn absent_directive_uses_first_and_first_numeric() {
        let chart = resolve(ChartKind::Line, &ChartSpec::default(), &result_table()).unwrap();
        assert_eq!(chart.x, "region");
        assert_eq!(chart.y, "revenue");
        assert_eq!(chart.title, "");
    }

    #[test]
    fn unknown_color_is_dropped() {
        let spec = ChartSpec {
            x: Some("region".to_string()),
            y: Some("revenue".to_string()),
            color: Some("segment".to_string()),
            title: None,
        };
        let chart = resolve(ChartKind::Pie, &spec, &result_table()).unwrap();
        assert_eq!(chart.color, None);
    }

    #[test]
    fn all_text_table_falls_back_to_last_column() {
        let table = Table::new(vec![
            (
                "category".to_string(),
                Arc::new(StringArray::from(vec!["Clothing"])) as ArrayRef,
            ),
            (
                "subcategory".to_string(),
                Arc::new(StringArray::from(vec!["Shoes"])) as ArrayRef,
            ),
        ]);
        let chart = resolve(ChartKind::Bar, &ChartSpec::default(), &table).unwrap();
        assert_eq!(chart.y, "subcategory");
    }

    #[test]
    fn empty_result_means_no_chart() {
        let empty = Table::empty();
        assert!(resolve(ChartKind::Bar, &ChartSpec::default(), &empty).is_none());
    }
}
