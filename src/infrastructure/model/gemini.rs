//! Gemini function-calling backend.

use super::traits::ModelBackend;
use super::types::{BackendError, BackendReply, BackendRequest};
use crate::domain::types::{ConversationTurn, ToolCall};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info};

pub const DEFAULT_GEMINI_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models";

const BACKEND_ID: &str = "gemini";

#[derive(Clone)]
pub struct GeminiBackend {
    endpoint: String,
    model: String,
    api_key: Option<String>,
    http: reqwest::Client,
}

impl GeminiBackend {
    pub fn new(model: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            endpoint: DEFAULT_GEMINI_ENDPOINT.to_string(),
            model: model.into(),
            api_key,
            http: reqwest::Client::new(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn request_url(&self) -> String {
        let base = self.endpoint.trim_end_matches('/');
        format!("{base}/{}:generateContent", self.model)
    }

    fn require_api_key(&self) -> Result<&str, BackendError> {
        self.api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| BackendError::missing_api_key(BACKEND_ID))
    }

    fn build_request_body(&self, request: &BackendRequest<'_>) -> Value {
        let mut contents = Vec::new();
        for turn in request.turns {
            match turn {
                ConversationTurn::User { text } => {
                    contents.push(json!({"role": "user", "parts": [{"text": text}]}));
                }
                ConversationTurn::Assistant { text, tool_calls } => {
                    let mut parts = Vec::new();
                    if !text.is_empty() {
                        parts.push(json!({"text": text}));
                    }
                    for call in tool_calls {
                        parts.push(json!({
                            "functionCall": {"name": call.name, "args": call.arguments}
                        }));
                    }
                    if !parts.is_empty() {
                        contents.push(json!({"role": "model", "parts": parts}));
                    }
                }
                ConversationTurn::Tool { tool, output } => {
                    contents.push(json!({
                        "role": "user",
                        "parts": [{
                            "functionResponse": {
                                "name": tool,
                                "response": {"content": output},
                            }
                        }]
                    }));
                }
            }
        }

        let mut body = json!({"contents": contents});
        if !request.system.is_empty() {
            body["systemInstruction"] = json!({"parts": [{"text": request.system}]});
        }
        if !request.tools.is_empty() {
            body["tools"] = json!([{"functionDeclarations": request.tools}]);
        }
        body
    }
}

#[async_trait]
impl ModelBackend for GeminiBackend {
    async fn complete(&self, request: BackendRequest<'_>) -> Result<BackendReply, BackendError> {
        let api_key = self.require_api_key()?;
        let url = format!("{}?key={}", self.request_url(), api_key);
        let body = self.build_request_body(&request);

        info!(
            model = self.model.as_str(),
            turns = request.turns.len(),
            tools = request.tools.len(),
            "Sending request to Gemini"
        );

        let response: GeminiResponse = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError::network(BACKEND_ID, e))?
            .error_for_status()
            .map_err(|e| BackendError::network(BACKEND_ID, e))?
            .json()
            .await
            .map_err(|e| BackendError::network(BACKEND_ID, e))?;
        debug!("Received response from Gemini");

        Ok(parse_reply(response))
    }
}

/// Collect text and requested invocations from the first candidate. Partial
/// or absent fields degrade to an empty reply rather than an error so the
/// orchestrator can classify the outcome itself.
fn parse_reply(response: GeminiResponse) -> BackendReply {
    let parts = response
        .candidates
        .unwrap_or_default()
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts)
        .unwrap_or_default();

    let mut reply = BackendReply::default();
    for part in parts {
        if let Some(text) = part.text {
            reply.text.push_str(&text);
        }
        if let Some(call) = part.function_call {
            reply.tool_calls.push(ToolCall::new(call.name, call.args));
        }
    }
    reply
}

#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Deserialize)]
struct GeminiPart {
    text: Option<String>,
    #[serde(rename = "functionCall")]
    function_call: Option<GeminiFunctionCall>,
}

#[derive(Deserialize)]
struct GeminiFunctionCall {
    name: String,
    #[serde(default)]
    args: Value,
}
