use super::errors::AgentError;
use super::models::{AgentOptions, AgentOutcome, AgentStep, FALLBACK_ANSWER};
use crate::application::tooling::{ToolCatalog, ToolProvider, to_declarations};
use crate::domain::types::ConversationTurn;
use crate::infrastructure::model::{BackendReply, BackendRequest, ModelBackend, ToolDeclaration};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Drives the bounded model/tool loop for one question.
///
/// The conversation is owned here for the duration of the question and is
/// append-only: tool-result turns land in the exact order the corresponding
/// invocations were requested, and rounds are strictly sequenced.
pub struct Agent<B: ModelBackend> {
    backend: B,
    provider: Arc<dyn ToolProvider>,
    catalog: ToolCatalog,
    system_prompt: String,
}

impl<B: ModelBackend> Agent<B> {
    pub fn new(
        backend: B,
        provider: Arc<dyn ToolProvider>,
        system_prompt: impl Into<String>,
    ) -> Self {
        let catalog = ToolCatalog::new(provider.clone());
        Self {
            backend,
            provider,
            catalog,
            system_prompt: system_prompt.into(),
        }
    }

    pub fn with_catalog_ttl(mut self, ttl: Duration) -> Self {
        self.catalog = ToolCatalog::new(self.provider.clone()).with_ttl(ttl);
        self
    }

    /// Answer one question, honoring the overall deadline when one is set.
    /// In-flight calls are abandoned on expiry; the protocol client stays
    /// usable for the next question.
    pub async fn ask(
        &self,
        question: String,
        options: AgentOptions,
    ) -> Result<AgentOutcome, AgentError> {
        match options.timeout {
            Some(timeout) => tokio::time::timeout(timeout, self.drive(question, &options))
                .await
                .map_err(|_| AgentError::Timeout { timeout })?,
            None => self.drive(question, &options).await,
        }
    }

    async fn drive(
        &self,
        question: String,
        options: &AgentOptions,
    ) -> Result<AgentOutcome, AgentError> {
        info!("Agent run started");
        let tools = self.catalog.tools().await?;
        let declarations = to_declarations(&tools);
        let system = options
            .system_prompt
            .clone()
            .unwrap_or_else(|| self.system_prompt.clone());

        let mut turns = vec![ConversationTurn::user(question)];
        let mut steps = Vec::new();
        let mut reply = self.complete(&system, &turns, &declarations).await?;

        for round in 0..options.max_tool_rounds {
            if reply.is_final() {
                info!(rounds = round, "Agent returned final response");
                return Ok(AgentOutcome {
                    answer: reply.text,
                    steps,
                });
            }

            let calls = std::mem::take(&mut reply.tool_calls);
            debug!(round, requested = calls.len(), "Executing requested tools");
            turns.push(ConversationTurn::assistant(reply.text.clone(), calls.clone()));
            for call in calls {
                let output = self.provider.call_tool(&call.name, call.arguments.clone()).await;
                steps.push(AgentStep {
                    tool: call.name.clone(),
                    arguments: call.arguments,
                    output: output.clone(),
                });
                turns.push(ConversationTurn::tool_result(call.name, output));
            }

            reply = self.complete(&system, &turns, &declarations).await?;
        }

        warn!(
            max_tool_rounds = options.max_tool_rounds,
            "Round budget exhausted before a final response"
        );
        let answer = if reply.text.trim().is_empty() {
            FALLBACK_ANSWER.to_string()
        } else {
            reply.text
        };
        Ok(AgentOutcome { answer, steps })
    }

    async fn complete(
        &self,
        system: &str,
        turns: &[ConversationTurn],
        declarations: &[ToolDeclaration],
    ) -> Result<BackendReply, AgentError> {
        let reply = self
            .backend
            .complete(BackendRequest {
                system,
                turns,
                tools: declarations,
            })
            .await?;
        Ok(reply)
    }
}
