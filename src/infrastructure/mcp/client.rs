use super::error::McpClientError;
use crate::domain::types::ToolDescriptor;
use crate::infrastructure::rpc::{RpcRequest, RpcResponse};
use reqwest::{StatusCode, header};
use serde_json::{Value, json};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, warn};

pub const PROTOCOL_VERSION: &str = "2025-06-18";
pub const SESSION_HEADER: &str = "mcp-session-id";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

const ACCEPTED_KINDS: &str = "application/json, text/event-stream";
const EVENT_STREAM_MIME: &str = "text/event-stream";
const EVENT_DATA_PREFIX: &str = "data:";
const STREAM_SENTINEL: &str = "[DONE]";

/// JSON-RPC-over-HTTP client for one tool-provider endpoint.
///
/// Holds the session state for that endpoint: the server-assigned session
/// token, a strictly increasing request-id counter, and the initialization
/// flag. Initialization is lazy and idempotent; callers only ever use
/// [`list_tools`](Self::list_tools) and [`call_tool`](Self::call_tool).
pub struct McpHttpClient {
    endpoint: String,
    http: reqwest::Client,
    timeout: Duration,
    request_id: AtomicU64,
    session_token: Mutex<Option<String>>,
    // Held across the whole handshake so concurrent first calls
    // single-flight the initialization sequence.
    init: AsyncMutex<bool>,
}

impl McpHttpClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            http: reqwest::Client::new(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
            request_id: AtomicU64::new(1),
            session_token: Mutex::new(None),
            init: AsyncMutex::new(false),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Next request id. Ids are unique and strictly increasing for the
    /// lifetime of this client.
    fn next_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::SeqCst)
    }

    fn session_token(&self) -> Option<String> {
        self.session_token.lock().expect("session token lock").clone()
    }

    fn store_session_token(&self, value: &str) {
        let mut guard = self.session_token.lock().expect("session token lock");
        if guard.as_deref() != Some(value) {
            debug!(endpoint = self.endpoint.as_str(), "Captured session token");
            *guard = Some(value.to_string());
        }
    }

    /// Runs the `initialize` / `notifications/initialized` handshake once.
    /// A failed handshake leaves the flag unset, so the next operation
    /// retries it.
    async fn ensure_initialized(&self) -> Result<(), McpClientError> {
        let mut ready = self.init.lock().await;
        if *ready {
            return Ok(());
        }

        debug!(endpoint = self.endpoint.as_str(), "Starting session handshake");
        let params = json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {},
            "clientInfo": {
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
            },
        });
        let request = RpcRequest::request(self.next_id(), "initialize", params);
        self.post_rpc(&request).await?;
        self.post_rpc(&RpcRequest::notification(
            "notifications/initialized",
            json!({}),
        ))
        .await?;

        *ready = true;
        info!(endpoint = self.endpoint.as_str(), "Session initialized");
        Ok(())
    }

    /// Discover the tool catalog. Runs lazy init first; an absent
    /// `result.tools` field yields an empty catalog.
    pub async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, McpClientError> {
        self.ensure_initialized().await?;
        let request = RpcRequest::request(self.next_id(), "tools/list", json!({}));
        let response = self.post_rpc(&request).await?;

        let tools = match response.result().get("tools") {
            Some(tools) => serde_json::from_value(tools.clone())
                .map_err(|err| McpClientError::malformed(format!("tool catalog: {err}")))?,
            None => Vec::new(),
        };
        info!(count = tools.len(), "Fetched tool catalog");
        Ok(tools)
    }

    /// Invoke one tool and return the concatenation of the text fragments of
    /// its result. Never fails: transport and protocol errors come back as
    /// inline error text so one broken data source cannot abort a question.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> String {
        match self.try_call_tool(name, arguments).await {
            Ok(text) => text,
            Err(err) => {
                warn!(tool = name, error = %err, "Tool invocation failed");
                format!("Tool '{name}' could not be executed: {err}")
            }
        }
    }

    async fn try_call_tool(&self, name: &str, arguments: Value) -> Result<String, McpClientError> {
        self.ensure_initialized().await?;
        let params = json!({"name": name, "arguments": arguments});
        let request = RpcRequest::request(self.next_id(), "tools/call", params);
        let response = self.post_rpc(&request).await?;
        Ok(collect_text(response.result()))
    }

    /// Send one envelope and decode the response under either framing.
    async fn post_rpc(&self, request: &RpcRequest) -> Result<RpcResponse, McpClientError> {
        let mut builder = self
            .http
            .post(&self.endpoint)
            .timeout(self.timeout)
            .header(header::ACCEPT, ACCEPTED_KINDS)
            .json(request);
        if let Some(token) = self.session_token() {
            builder = builder.header(SESSION_HEADER, token);
        }

        debug!(method = request.method.as_str(), id = ?request.id, "Posting RPC request");
        let response = builder.send().await.map_err(McpClientError::http)?;

        if let Some(value) = response
            .headers()
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
        {
            self.store_session_token(value);
        }

        let status = response.status();
        if status == StatusCode::ACCEPTED || status == StatusCode::NO_CONTENT {
            return Ok(RpcResponse::empty());
        }
        if !status.is_success() {
            return Err(McpClientError::Status {
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = response.text().await.map_err(McpClientError::http)?;

        let envelope = if content_type.starts_with(EVENT_STREAM_MIME) {
            scan_event_stream(&body)
        } else if body.trim().is_empty() {
            RpcResponse::empty()
        } else {
            serde_json::from_str(&body).map_err(|err| McpClientError::malformed(err.to_string()))?
        };

        if let Some(error) = &envelope.error {
            return Err(McpClientError::Rpc {
                code: error.code,
                message: error.message.clone(),
            });
        }
        Ok(envelope)
    }
}

/// Scan an event-stream body and return the first `data:` line whose payload
/// parses as an envelope. Unparseable lines and the terminal sentinel are
/// skipped; an exhausted scan yields an empty envelope.
fn scan_event_stream(body: &str) -> RpcResponse {
    for line in body.lines() {
        let Some(payload) = line.strip_prefix(EVENT_DATA_PREFIX) else {
            continue;
        };
        let payload = payload.trim();
        if payload.is_empty() || payload == STREAM_SENTINEL {
            continue;
        }
        if let Ok(envelope) = serde_json::from_str(payload) {
            return envelope;
        }
    }
    RpcResponse::empty()
}

/// Concatenate the `type == "text"` fragments of a `tools/call` result in
/// order. Anything else (images, resources, missing content) contributes
/// nothing.
fn collect_text(result: &Value) -> String {
    let Some(content) = result.get("content").and_then(Value::as_array) else {
        return String::new();
    };
    let mut text = String::new();
    for fragment in content {
        if fragment.get("type").and_then(Value::as_str) != Some("text") {
            continue;
        }
        if let Some(piece) = fragment.get("text").and_then(Value::as_str) {
            text.push_str(piece);
        }
    }
    text
}
