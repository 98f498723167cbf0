use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    Tool,
}

impl MessageRole {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
            MessageRole::Tool => "tool",
        }
    }
}

/// A tool invocation requested by the model backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}

/// One entry in the append-only conversation the orchestrator drives.
///
/// Tool-result turns carry the name of the tool that produced them so the
/// backend can correlate results with the calls it requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum ConversationTurn {
    User {
        text: String,
    },
    Assistant {
        text: String,
        #[serde(default)]
        tool_calls: Vec<ToolCall>,
    },
    Tool {
        tool: String,
        output: String,
    },
}

impl ConversationTurn {
    pub fn user(text: impl Into<String>) -> Self {
        ConversationTurn::User { text: text.into() }
    }

    pub fn assistant(text: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        ConversationTurn::Assistant {
            text: text.into(),
            tool_calls,
        }
    }

    pub fn tool_result(tool: impl Into<String>, output: impl Into<String>) -> Self {
        ConversationTurn::Tool {
            tool: tool.into(),
            output: output.into(),
        }
    }

    pub fn role(&self) -> MessageRole {
        match self {
            ConversationTurn::User { .. } => MessageRole::User,
            ConversationTurn::Assistant { .. } => MessageRole::Assistant,
            ConversationTurn::Tool { .. } => MessageRole::Tool,
        }
    }
}

/// A tool advertised by the provider service via `tools/list`.
///
/// The input schema is provider-supplied and open-ended, so it stays a raw
/// JSON document rather than a fixed struct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "inputSchema", default)]
    pub input_schema: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn turn_roles_match_variants() {
        assert_eq!(ConversationTurn::user("q").role(), MessageRole::User);
        assert_eq!(
            ConversationTurn::assistant("a", Vec::new()).role(),
            MessageRole::Assistant
        );
        assert_eq!(
            ConversationTurn::tool_result("search", "out").role(),
            MessageRole::Tool
        );
    }

    #[test]
    fn descriptor_tolerates_missing_fields() {
        let descriptor: ToolDescriptor =
            serde_json::from_value(json!({"name": "search_datasets"})).expect("parse descriptor");
        assert_eq!(descriptor.name, "search_datasets");
        assert!(descriptor.description.is_empty());
        assert!(descriptor.input_schema.is_null());
    }
}
