use crate::domain::types::ToolDescriptor;
use crate::infrastructure::mcp::{McpClientError, McpHttpClient};
use async_trait::async_trait;
use serde_json::Value;

/// Orchestrator-facing seam over the tool-provider service.
///
/// `call_tool` is deliberately infallible: invocation failures come back as
/// inline error text for the model to see.
#[async_trait]
pub trait ToolProvider: Send + Sync {
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, McpClientError>;

    async fn call_tool(&self, name: &str, arguments: Value) -> String;
}

#[async_trait]
impl ToolProvider for McpHttpClient {
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, McpClientError> {
        McpHttpClient::list_tools(self).await
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> String {
        McpHttpClient::call_tool(self, name, arguments).await
    }
}
