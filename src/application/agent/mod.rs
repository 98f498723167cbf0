mod errors;
mod models;
mod runner;

pub use errors::AgentError;
pub use models::{AgentOptions, AgentOutcome, AgentStep, DEFAULT_MAX_TOOL_ROUNDS, FALLBACK_ANSWER};
pub use runner::Agent;
