//! End-to-end pipeline tests: sandboxed execution, contract validation,
//! chart resolution and the orchestrator's fallback paths.

use arrow::array::{ArrayRef, Float64Array, StringArray};
use olap_assistant::{
    fallback_contract, parse_response, run_program, AssistantConfig, ModelClient, OperationKind,
    Orchestrator, SalesStore, SandboxFault, Table, TurnPhase, Value,
};
use serde_json::json;
use std::sync::Arc;

fn regional_sales() -> Table {
    Table::new(vec![
        (
            "region".to_string(),
            Arc::new(StringArray::from(vec![
                "North America",
                "North America",
                "Europe",
            ])) as ArrayRef,
        ),
        (
            "revenue".to_string(),
            Arc::new(Float64Array::from(vec![100.0, 200.0, 50.0])) as ArrayRef,
        ),
    ])
}

fn revenue_by_region_program() -> serde_json::Value {
    json!({"result": [
        {"op": "group", "by": ["region"], "aggregate": [
            {"column": "revenue", "agg": "sum", "as": "revenue"}
        ]},
        {"op": "sort", "by": ["revenue"], "descending": true},
        {"op": "round", "decimals": 2}
    ]})
}

#[test]
fn total_revenue_by_region_scenario() {
    let table = regional_sales();
    let result = run_program(&revenue_by_region_program(), &table).unwrap();

    assert_eq!(result.num_rows(), 2);
    let region = result.index_of("region").unwrap();
    let revenue = result.index_of("revenue").unwrap();
    assert_eq!(
        result.value_at(region, 0),
        Some(Value::Str("North America".to_string()))
    );
    assert_eq!(result.numeric_at(revenue, 0), Some(300.0));
    assert_eq!(
        result.value_at(region, 1),
        Some(Value::Str("Europe".to_string()))
    );
    assert_eq!(result.numeric_at(revenue, 1), Some(50.0));
}

#[test]
fn reexecution_is_row_for_row_identical() {
    let table = regional_sales();
    let program = revenue_by_region_program();
    let first = run_program(&program, &table).unwrap();
    let second = run_program(&program, &table).unwrap();

    assert_eq!(first.num_rows(), second.num_rows());
    assert_eq!(first.column_names(), second.column_names());
    for row in 0..first.num_rows() {
        for col in 0..first.num_columns() {
            assert_eq!(first.value_at(col, row), second.value_at(col, row));
        }
    }
}

#[test]
fn runtime_fault_never_escapes_the_sandbox() {
    let table = regional_sales();
    let program = json!({"result": [
        {"op": "group", "by": ["territory"], "aggregate": [
            {"column": "revenue", "agg": "sum", "as": "revenue"}
        ]}
    ]});
    match run_program(&program, &table) {
        Err(SandboxFault::Execution(message)) => assert!(message.contains("territory")),
        other => panic!("expected execution fault, got {:?}", other),
    }
}

#[test]
fn zero_revenue_guards_profit_margin() {
    let table = Table::new(vec![
        (
            "profit".to_string(),
            Arc::new(Float64Array::from(vec![25.0, 0.0])) as ArrayRef,
        ),
        (
            "revenue".to_string(),
            Arc::new(Float64Array::from(vec![100.0, 0.0])) as ArrayRef,
        ),
    ]);
    let program = json!({"result": [
        {"op": "derive", "as": "profit_margin", "expr": {
            "left": 100.0,
            "operator": "mul",
            "right": {"left": "profit", "operator": "div", "right": "revenue"}
        }}
    ]});
    let result = run_program(&program, &table).unwrap();
    let margin = result.index_of("profit_margin").unwrap();
    assert_eq!(result.numeric_at(margin, 0), Some(25.0));
    assert_eq!(result.numeric_at(margin, 1), Some(0.0));
    assert!(result.numeric_at(margin, 1).unwrap().is_finite());
}

#[test]
fn missing_contract_field_yields_the_full_fallback() {
    // transform is present but insight is missing
    let raw = r#"{
        "operation": "slice",
        "description": "only 2024",
        "transform": {"result": []},
        "chart_type": "table",
        "follow_ups": ["a"]
    }"#;
    assert_eq!(parse_response(raw), fallback_contract());
}

fn test_orchestrator() -> Orchestrator {
    let config = AssistantConfig::default();
    let client = ModelClient::new(&config);
    Orchestrator::new(SalesStore::generate(300), client, config)
}

#[test]
fn undefined_column_turn_falls_back_and_renders() {
    let mut assistant = test_orchestrator();
    let raw = json!({
        "operation": "group_summarize",
        "description": "by region",
        "transform": {"result": [
            {"op": "group", "by": ["no_such_dimension"], "aggregate": [
                {"column": "revenue", "agg": "sum", "as": "revenue"}
            ]}
        ]},
        "chart_type": "bar",
        "chart_config": {"x": "region", "y": "revenue", "color": null, "title": "t"},
        "insight": "i",
        "follow_ups": ["f1", "f2", "f3"]
    })
    .to_string();

    let turn = assistant.apply_response("revenue by mystery dimension", &raw);
    assert_eq!(turn.phase, TurnPhase::Rendered);
    assert_eq!(turn.table.num_rows(), 10);
    assert!(turn.warning.unwrap().contains("no_such_dimension"));
}

#[test]
fn non_json_model_text_turn_uses_fallback_contract() {
    let mut assistant = test_orchestrator();
    let turn = assistant.apply_response("anything", "Sorry, here is prose instead of JSON.");
    assert_eq!(turn.contract.operation, OperationKind::Error);
    assert_eq!(turn.contract.follow_ups.len(), 3);
    assert_eq!(
        turn.contract.follow_ups[0],
        "Show total revenue by region"
    );
    assert_eq!(turn.phase, TurnPhase::Rendered);
    // fallback program shows the first rows of the base table
    assert_eq!(turn.table.num_rows(), 10);
}

#[test]
fn resolved_chart_only_references_result_columns() {
    let mut assistant = test_orchestrator();
    let raw = json!({
        "operation": "group_summarize",
        "description": "by category",
        "transform": {"result": [
            {"op": "group", "by": ["category"], "aggregate": [
                {"column": "profit", "agg": "sum", "as": "profit"}
            ]}
        ]},
        "chart_type": "bar",
        // proposes columns that will not exist in the grouped result
        "chart_config": {"x": "quarter", "y": "revenue", "color": "year", "title": "Profit"},
        "insight": "i",
        "follow_ups": []
    })
    .to_string();

    let turn = assistant.apply_response("profit by category", &raw);
    let chart = turn.chart.expect("bar chart resolves");
    assert_eq!(chart.x, "category");
    assert_eq!(chart.y, "profit");
    assert_eq!(chart.color, None);
    assert!(turn.table.has_column(&chart.x));
    assert!(turn.table.has_column(&chart.y));
}

#[tokio::test]
async fn unreachable_model_still_renders_a_turn() {
    // default config has no API key, so the model call fails upstream
    let mut assistant = test_orchestrator();
    let turn = assistant.process("What is total revenue by region?").await;
    assert_eq!(turn.phase, TurnPhase::Rendered);
    assert_eq!(turn.contract.operation, OperationKind::Error);
    assert!(turn.warning.unwrap().contains("Model unavailable"));
    assert_eq!(turn.table.num_rows(), 10);
}
