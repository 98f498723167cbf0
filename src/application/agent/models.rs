use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Cap on model/tool round-trips for one question. Guarantees termination
/// when the model keeps asking for tools.
pub const DEFAULT_MAX_TOOL_ROUNDS: usize = 10;

/// Returned when the round budget is exhausted and the last response carried
/// no usable text.
pub const FALLBACK_ANSWER: &str =
    "Je n'ai pas pu obtenir de réponse exploitable du modèle. Veuillez reformuler votre question.";

#[derive(Debug, Clone)]
pub struct AgentOptions {
    pub system_prompt: Option<String>,
    pub max_tool_rounds: usize,
    pub timeout: Option<Duration>,
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            system_prompt: None,
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
            timeout: None,
        }
    }
}

/// One executed tool invocation, kept for rendering and diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct AgentStep {
    pub tool: String,
    pub arguments: Value,
    pub output: String,
}

#[derive(Debug, Clone)]
pub struct AgentOutcome {
    pub answer: String,
    pub steps: Vec<AgentStep>,
}
