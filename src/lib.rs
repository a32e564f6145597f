//! # OLAP Assistant Engine
//!
//! A natural-language interface over a tabular sales dataset. A user asks a
//! business question in plain text, an external language model translates it
//! into a structured transformation plan plus a visualization directive, the
//! plan executes deterministically against an in-memory columnar table, and
//! the result comes back as chart directive, table and narrative insight.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use olap_assistant::{AssistantConfig, ModelClient, Orchestrator, SalesStore};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AssistantConfig::from_env();
//!     let client = ModelClient::new(&config);
//!     let store = SalesStore::generate(10_000);
//!     let mut assistant = Orchestrator::new(store, client, config);
//!
//!     let turn = assistant.process("What is total revenue by region?").await;
//!     println!("{}", turn.contract.insight);
//! }
//! ```
//!
//! ## Pipeline
//!
//! - **Store** (`store`): owns the base dataset, membership filtering
//! - **Sandbox** (`sandbox` + `plan`): interprets the model's transformation
//!   program over a closed operation set, never raises past its boundary
//! - **Contract** (`contract`): validates the model's structured output,
//!   substituting a fixed fallback on any violation
//! - **Chart** (`chart`): resolves proposed axis bindings against the actual
//!   result columns
//! - **Orchestrator** (`orchestrator`): sequences a turn and keeps bounded
//!   conversation history

// Internal modules
pub mod chart;
pub mod config;
pub mod contract;
pub mod error;
pub mod llm;
pub mod orchestrator;
pub mod plan;
pub mod render;
pub mod sandbox;
pub mod store;
pub mod table;

// Public API - main types users need
pub use chart::ResolvedChart;
pub use config::AssistantConfig;
pub use contract::{
    fallback_contract, parse_response, ChartKind, ChartSpec, OperationKind, ResponseContract,
};
pub use error::AssistantError;
pub use llm::{ChatMessage, ModelClient};
pub use orchestrator::{Orchestrator, Turn, TurnPhase};
pub use sandbox::{run_program, SandboxFault};
pub use store::{DatasetSummary, SalesStore};
pub use table::{Table, Value};
