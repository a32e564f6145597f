/// Runtime configuration
///
/// Explicit configuration object constructed once at startup and handed to
/// the orchestrator. No hidden global lifecycle: the binary builds one of
/// these and passes it down.
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Assistant configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Chat-completions endpoint base URL
    pub base_url: String,

    /// Model identifier
    pub model: String,

    /// Bearer API key; absence is an upstream fault at call time
    pub api_key: Option<String>,

    /// Request timeout applied at the HTTP client boundary (seconds)
    pub request_timeout_secs: u64,

    /// Maximum completion tokens requested from the model
    pub max_tokens: u32,

    /// Model-facing history bound, in user/assistant pairs (oldest dropped)
    pub max_history_turns: usize,

    /// Row cap for rendered tables
    pub max_render_rows: usize,

    /// Optional CSV dataset path; when absent the sample dataset is generated
    pub dataset_path: Option<PathBuf>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            api_key: None,
            request_timeout_secs: 30,
            max_tokens: 1500,
            max_history_turns: 8,
            max_render_rows: 50,
            dataset_path: None,
        }
    }
}

impl AssistantConfig {
    /// Build a config from environment variables, falling back to defaults.
    ///
    /// Recognized variables: `OLAP_API_KEY` (also `GROQ_API_KEY`),
    /// `OLAP_BASE_URL`, `OLAP_MODEL`, `OLAP_DATASET`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(key) = std::env::var("OLAP_API_KEY").or_else(|_| std::env::var("GROQ_API_KEY")) {
            if !key.is_empty() {
                config.api_key = Some(key);
            }
        }
        if let Ok(url) = std::env::var("OLAP_BASE_URL") {
            if !url.is_empty() {
                config.base_url = url;
            }
        }
        if let Ok(model) = std::env::var("OLAP_MODEL") {
            if !model.is_empty() {
                config.model = model;
            }
        }
        if let Ok(path) = std::env::var("OLAP_DATASET") {
            if !path.is_empty() {
                config.dataset_path = Some(PathBuf::from(path));
            }
        }
        config
    }
}
