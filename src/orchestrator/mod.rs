//! Conversation orchestrator
//!
//! Sequences one user turn: validate the model's contract, execute the
//! transformation in the sandbox, resolve the chart directive, assemble a
//! Turn. Every failure path degrades to a rendered Turn; the conversation
//! never terminates on bad model output or a bad generated program.

use crate::chart::{self, ResolvedChart};
use crate::config::AssistantConfig;
use crate::contract::{self, ResponseContract};
use crate::llm::{ChatMessage, ModelClient};
use crate::sandbox;
use crate::store::SalesStore;
use crate::table::Table;
use tracing::{debug, info, warn};

/// Rows shown when a transformation fails and the turn falls back.
const FALLBACK_ROWS: usize = 10;

/// Lifecycle of one turn. `ExecutionFailed` branches from
/// `ContractReceived` and still continues to `Rendered`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnPhase {
    AwaitingQuery,
    ContractReceived,
    Executed,
    ExecutionFailed,
    Rendered,
}

/// One completed user turn, ready for the rendering boundary.
#[derive(Clone, Debug)]
pub struct Turn {
    pub query: String,
    pub contract: ResponseContract,
    pub table: Table,
    pub chart: Option<ResolvedChart>,
    /// User-visible warning naming the underlying fault, when a fallback
    /// was taken
    pub warning: Option<String>,
    pub phase: TurnPhase,
}

/// Drives the per-turn pipeline and owns the conversation state. All
/// collaborators are explicit dependencies constructed at startup.
pub struct Orchestrator {
    store: SalesStore,
    client: ModelClient,
    config: AssistantConfig,
    /// Model-facing history, capped at `max_history_turns` pairs
    history: Vec<ChatMessage>,
    /// Full turn list for replay
    turns: Vec<Turn>,
}

impl Orchestrator {
    pub fn new(store: SalesStore, client: ModelClient, config: AssistantConfig) -> Self {
        Self {
            store,
            client,
            config,
            history: Vec::new(),
            turns: Vec::new(),
        }
    }

    pub fn store(&self) -> &SalesStore {
        &self.store
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Clear both the model-facing history and the turn list.
    pub fn reset(&mut self) {
        self.history.clear();
        self.turns.clear();
        info!("conversation reset");
    }

    /// Process one user query end to end: model call, contract validation,
    /// sandboxed execution, chart resolution. An unreachable model surfaces
    /// as a warning on the turn; processing continues on the fallback
    /// contract.
    pub async fn process(&mut self, query: &str) -> Turn {
        let mut phase = TurnPhase::AwaitingQuery;
        debug!(?phase, query, "turn started");

        let messages = self.build_messages(query);
        match self.client.chat(&messages).await {
            Ok(raw) => self.apply_response(query, &raw),
            Err(e) => {
                warn!(error = %e, "model call failed, continuing with fallback contract");
                phase = TurnPhase::ContractReceived;
                debug!(?phase, "fallback contract substituted");
                let turn = self.execute_contract(
                    query.to_string(),
                    contract::fallback_contract(),
                    Some(format!("Model unavailable: {}", e)),
                );
                self.record(turn)
            }
        }
    }

    /// The post-model half of the pipeline: validate the raw response text
    /// and run the turn to `Rendered`. Public seam for tests and for
    /// embedders that bring their own transport.
    pub fn apply_response(&mut self, query: &str, raw: &str) -> Turn {
        let contract = match contract::try_parse(raw) {
            Some(contract) => {
                // Only coherent exchanges are worth replaying to the model.
                self.history.push(ChatMessage::user(query));
                self.history.push(ChatMessage::assistant(raw));
                self.trim_history();
                contract
            }
            None => contract::fallback_contract(),
        };
        let turn = self.execute_contract(query.to_string(), contract, None);
        self.record(turn)
    }

    /// Messages for the next model call: system instructions, prior turns,
    /// current query.
    pub fn build_messages(&self, query: &str) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(self.history.len() + 2);
        messages.push(ChatMessage::system(crate::llm::system_prompt()));
        messages.extend(self.history.iter().cloned());
        messages.push(ChatMessage::user(query));
        messages
    }

    fn execute_contract(
        &self,
        query: String,
        contract: ResponseContract,
        upstream_warning: Option<String>,
    ) -> Turn {
        let mut phase = TurnPhase::ContractReceived;
        let mut warning = upstream_warning;
        let snapshot = self.store.table().snapshot();

        let table = match sandbox::run_program(&contract.transform, &snapshot) {
            Ok(result) => {
                phase = TurnPhase::Executed;
                debug!(?phase, rows = result.num_rows(), "transformation executed");
                result
            }
            Err(fault) => {
                phase = TurnPhase::ExecutionFailed;
                warn!(?phase, %fault, "transformation failed, showing sample rows");
                let message = format!(
                    "Transformation failed: {}. Showing sample rows instead.",
                    fault
                );
                warning = Some(match warning {
                    Some(existing) => format!("{} {}", existing, message),
                    None => message,
                });
                snapshot.head(FALLBACK_ROWS)
            }
        };

        let chart = chart::resolve(contract.chart_type, &contract.chart_config, &table);
        phase = TurnPhase::Rendered;

        Turn {
            query,
            contract,
            table,
            chart,
            warning,
            phase,
        }
    }

    fn record(&mut self, turn: Turn) -> Turn {
        self.turns.push(turn.clone());
        turn
    }

    fn trim_history(&mut self) {
        let cap = self.config.max_history_turns * 2;
        if self.history.len() > cap {
            let excess = self.history.len() - cap;
            self.history.drain(0..excess);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::OperationKind;

    fn orchestrator() -> Orchestrator {
        let config = AssistantConfig::default();
        let client = ModelClient::new(&config);
        Orchestrator::new(SalesStore::generate(200), client, config)
    }

    fn raw_response(transform: serde_json::Value) -> String {
        serde_json::json!({
            "operation": "group_summarize",
            "description": "test analysis",
            "transform": transform,
            "chart_type": "bar",
            "chart_config": {"x": "region", "y": "revenue", "color": null, "title": "t"},
            "insight": "insight",
            "follow_ups": ["a", "b", "c"]
        })
        .to_string()
    }

    #[test]
    fn successful_turn_reaches_rendered() {
        let mut orch = orchestrator();
        let raw = raw_response(serde_json::json!({"result": [
            {"op": "group", "by": ["region"], "aggregate": [
                {"column": "revenue", "agg": "sum", "as": "revenue"}
            ]},
            {"op": "sort", "by": ["revenue"], "descending": true}
        ]}));
        let turn = orch.apply_response("revenue by region", &raw);
        assert_eq!(turn.phase, TurnPhase::Rendered);
        assert!(turn.warning.is_none());
        assert!(turn.chart.is_some());
        assert_eq!(turn.table.num_rows(), 4);
        assert_eq!(orch.turns().len(), 1);
    }

    #[test]
    fn failed_program_falls_back_to_sample_rows() {
        let mut orch = orchestrator();
        let raw = raw_response(serde_json::json!({"result": [
            {"op": "filter", "column": "nonexistent", "cmp": "eq", "value": 1}
        ]}));
        let turn = orch.apply_response("broken", &raw);
        assert_eq!(turn.phase, TurnPhase::Rendered);
        assert_eq!(turn.table.num_rows(), 10);
        let warning = turn.warning.expect("fault message surfaces");
        assert!(warning.contains("nonexistent"));
    }

    #[test]
    fn garbage_response_uses_fallback_contract_and_skips_history() {
        let mut orch = orchestrator();
        let turn = orch.apply_response("hello", "not json at all");
        assert_eq!(turn.contract.operation, OperationKind::Error);
        assert_eq!(turn.contract.follow_ups.len(), 3);
        assert_eq!(turn.phase, TurnPhase::Rendered);
        // incoherent exchange is not replayed to the model
        assert_eq!(orch.build_messages("next").len(), 2);
    }

    #[test]
    fn history_is_capped_in_pairs() {
        let mut orch = orchestrator();
        let raw = raw_response(serde_json::json!({"result": [
            {"op": "limit", "rows": 5}
        ]}));
        for i in 0..20 {
            orch.apply_response(&format!("query {}", i), &raw);
        }
        let cap = AssistantConfig::default().max_history_turns;
        // system + capped pairs + current query
        assert_eq!(orch.build_messages("next").len(), 2 * cap + 2);
        assert_eq!(orch.turns().len(), 20);
    }

    #[test]
    fn reset_clears_history_and_turns() {
        let mut orch = orchestrator();
        let raw = raw_response(serde_json::json!({"result": []}));
        orch.apply_response("q", &raw);
        orch.reset();
        assert!(orch.turns().is_empty());
        assert_eq!(orch.build_messages("next").len(), 2);
    }
}
