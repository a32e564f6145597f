//! Interactive REPL for the OLAP assistant.
//!
//! Wires the explicit dependencies (store, model client, config) and loops
//! on stdin. `reset` clears the conversation, `exit` quits.

use anyhow::Result;
use olap_assistant::llm::SAMPLE_QUERIES;
use olap_assistant::{render, AssistantConfig, ModelClient, Orchestrator, SalesStore, Turn};
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let config = AssistantConfig::from_env();
    let max_rows = config.max_render_rows;

    let store = match &config.dataset_path {
        Some(path) => SalesStore::load_csv(path)?,
        None => SalesStore::generate(10_000),
    };

    let summary = store.summary();
    println!("OLAP Business Intelligence Assistant");
    println!("{}", "=".repeat(60));
    println!(
        "Dataset: {} records | revenue {} | profit {} | avg margin {:.1}%",
        summary.total_records,
        render::format_currency(summary.total_revenue),
        render::format_currency(summary.total_profit),
        summary.avg_profit_margin
    );
    if let Some((from, to)) = &summary.date_range {
        println!("Period:  {} to {}", from, to);
    }
    if config.api_key.is_none() {
        println!();
        println!("NOTE: no API key configured (set OLAP_API_KEY); queries will");
        println!("fall back to sample views instead of live analysis.");
    }
    println!();
    println!("Try:");
    for query in SAMPLE_QUERIES.iter().take(4) {
        println!("  - {}", query);
    }
    println!();
    println!("Commands: reset, exit");
    println!();

    let client = ModelClient::new(&config);
    let mut assistant = Orchestrator::new(store, client, config);

    loop {
        print!("query> ");
        io::stdout().flush()?;
        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        match input {
            "" => continue,
            "exit" | "quit" => break,
            "reset" => {
                assistant.reset();
                println!("Conversation cleared.\n");
                continue;
            }
            _ => {}
        }

        let turn = assistant.process(input).await;
        print_turn(&turn, max_rows);
    }

    Ok(())
}

fn print_turn(turn: &Turn, max_rows: usize) {
    println!();
    println!(
        "[{}] {}",
        render::operation_label(turn.contract.operation),
        turn.contract.description
    );
    if let Some(warning) = &turn.warning {
        println!("  ! {}", warning);
    }

    if let Some(chart) = &turn.chart {
        let color = chart
            .color
            .as_deref()
            .map(|c| format!(", color by {}", c))
            .unwrap_or_default();
        println!(
            "  chart: {:?} of {} by {}{} - {}",
            chart.kind, chart.y, chart.x, color, chart.title
        );
    }

    let rendered = render::table_rows(&turn.table, max_rows);
    print_table(&rendered);
    if rendered.total_rows > rendered.rows.len() {
        println!(
            "  ... {} of {} rows shown",
            rendered.rows.len(),
            rendered.total_rows
        );
    }

    if !turn.contract.insight.is_empty() {
        println!("  Insight: {}", turn.contract.insight);
    }
    if !turn.contract.follow_ups.is_empty() {
        println!("  Follow-ups:");
        for follow_up in &turn.contract.follow_ups {
            println!("    -> {}", follow_up);
        }
    }
    println!();
}

fn print_table(rendered: &render::RenderedTable) {
    let mut widths: Vec<usize> = rendered.columns.iter().map(|c| c.len()).collect();
    for row in &rendered.rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.len());
            }
        }
    }

    let header: Vec<String> = rendered
        .columns
        .iter()
        .zip(&widths)
        .map(|(name, w)| format!("{:<width$}", name, width = *w))
        .collect();
    println!("  {}", header.join(" | "));
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    println!("  {}", rule.join("-+-"));
    for row in &rendered.rows {
        let cells: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, w)| format!("{:<width$}", cell, width = *w))
            .collect();
        println!("  {}", cells.join(" | "));
    }
}
