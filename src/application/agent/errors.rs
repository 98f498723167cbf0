use crate::infrastructure::mcp::McpClientError;
use crate::infrastructure::model::BackendError;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Discovery(#[from] McpClientError),
    #[error("question processing timed out after {timeout:?}")]
    Timeout { timeout: Duration },
}

impl AgentError {
    pub fn user_message(&self) -> String {
        match self {
            AgentError::Backend(err) => err.user_message(),
            AgentError::Discovery(err) => err.user_message(),
            AgentError::Timeout { timeout } => format!(
                "Le traitement de la question a dépassé le délai de {} secondes.",
                timeout.as_secs()
            ),
        }
    }
}
