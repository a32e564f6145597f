//! Response contract
//!
//! The typed shape of the model's structured output, plus a total parser:
//! locate one JSON block in the raw response text, deserialize it, and on
//! any violation substitute the fixed fallback contract. Nothing ever
//! escapes this boundary as an error.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::warn;

/// OLAP operation kinds the model can report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Slice,
    Dice,
    GroupSummarize,
    DrillDown,
    RollUp,
    Compare,
    Overview,
    Error,
}

/// Chart kinds; `Table` and `None` bypass chart rendering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    Line,
    Pie,
    Table,
    None,
}

/// Proposed chart bindings. Column names are proposals, not guaranteed to
/// exist in the eventual result table; resolution happens post-execution.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    #[serde(default)]
    pub x: Option<String>,
    #[serde(default)]
    pub y: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// One validated model response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResponseContract {
    pub operation: OperationKind,
    pub description: String,
    /// Raw transformation program; the sandbox interprets it
    pub transform: serde_json::Value,
    pub chart_type: ChartKind,
    #[serde(default)]
    pub chart_config: ChartSpec,
    pub insight: String,
    pub follow_ups: Vec<String>,
}

/// Parse raw model text into a contract. Total: any parse failure or
/// missing/mistyped required field yields the fixed fallback contract.
pub fn parse_response(raw: &str) -> ResponseContract {
    match try_parse(raw) {
        Some(contract) => contract,
        None => fallback_contract(),
    }
}

/// Parse raw model text, `None` on any contract violation.
pub fn try_parse(raw: &str) -> Option<ResponseContract> {
    let block = extract_json_block(raw);
    match serde_json::from_str::<ResponseContract>(&block) {
        Ok(contract) => Some(contract),
        Err(e) => {
            warn!(error = %e, "model response failed contract validation, using fallback");
            None
        }
    }
}

/// Locate the structured block inside free text: a fenced ```json``` block
/// anywhere in the response, else the outermost brace span, else the
/// trimmed text itself.
pub fn extract_json_block(raw: &str) -> String {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    let fence = FENCE.get_or_init(|| {
        Regex::new(r"```(?:json)?\s*([\s\S]+?)\s*```").expect("fence pattern compiles")
    });

    if let Some(captures) = fence.captures(raw) {
        if let Some(body) = captures.get(1) {
            return body.as_str().trim().to_string();
        }
    }

    let trimmed = raw.trim();
    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            return trimmed[start..=end].to_string();
        }
    }
    trimmed.to_string()
}

/// The fixed contract substituted whenever the model's output is unusable:
/// an error badge, a trivial first-10-rows program, tabular display and
/// three canned follow-up suggestions.
pub fn fallback_contract() -> ResponseContract {
    ResponseContract {
        operation: OperationKind::Error,
        description: "Could not parse your request".to_string(),
        transform: serde_json::json!({"result": [{"op": "limit", "rows": 10}]}),
        chart_type: ChartKind::Table,
        chart_config: ChartSpec {
            x: None,
            y: None,
            color: None,
            title: Some("Sample Data".to_string()),
        },
        insight: "I had trouble understanding your request. Please try rephrasing it."
            .to_string(),
        follow_ups: vec![
            "Show total revenue by region".to_string(),
            "What are the top 5 categories by profit?".to_string(),
            "Compare 2023 vs 2024 revenue".to_string(),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_body() -> String {
        serde_json::json!({
            "operation": "group_summarize",
            "description": "Total revenue by region",
            "transform": {"result": [
                {"op": "group", "by": ["region"], "aggregate": [
                    {"column": "revenue", "agg": "sum", "as": "revenue"}
                ]}
            ]},
            "chart_type": "bar",
            "chart_config": {"x": "region", "y": "revenue", "color": null, "title": "Revenue by Region"},
            "insight": "Shows regional contribution.",
            "follow_ups": ["By country?", "By year?", "Margins?"]
        })
        .to_string()
    }

    #[test]
    fn parses_fenced_response() {
        let raw = format!("Here is the analysis:\n```json\n{}\n```\n", valid_body());
        let contract = parse_response(&raw);
        assert_eq!(contract.operation, OperationKind::GroupSummarize);
        assert_eq!(contract.chart_type, ChartKind::Bar);
        assert_eq!(contract.chart_config.x.as_deref(), Some("region"));
        assert_eq!(contract.follow_ups.len(), 3);
    }

    #[test]
    fn parses_bare_json_with_surrounding_prose() {
        let raw = format!("Sure! {} Hope that helps.", valid_body());
        let contract = parse_response(&raw);
        assert_eq!(contract.operation, OperationKind::GroupSummarize);
    }

    #[test]
    fn non_json_text_yields_fallback() {
        let contract = parse_response("I'm sorry, I can't help with that.");
        assert_eq!(contract, fallback_contract());
        assert_eq!(contract.operation, OperationKind::Error);
        assert_eq!(contract.follow_ups.len(), 3);
    }

    #[test]
    fn missing_required_field_yields_full_fallback() {
        // no insight field
        let raw = r#"{
            "operation": "overview",
            "description": "d",
            "transform": {"result": []},
            "chart_type": "table",
            "follow_ups": []
        }"#;
        assert_eq!(parse_response(raw), fallback_contract());
    }

    #[test]
    fn unknown_enum_values_yield_fallback() {
        let raw = valid_body().replace("group_summarize", "pivot");
        assert_eq!(parse_response(&raw), fallback_contract());
    }

    #[test]
    fn fallback_program_is_interpretable() {
        let fallback = fallback_contract();
        let steps = fallback
            .transform
            .get("result")
            .and_then(|v| v.as_array())
            .expect("fallback carries a result pipeline");
        assert_eq!(steps.len(), 1);
    }
}
