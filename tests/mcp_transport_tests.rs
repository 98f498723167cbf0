use datagouv_assistant::mcp::{McpHttpClient, SESSION_HEADER};
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> McpHttpClient {
    McpHttpClient::new(format!("{}/mcp", server.uri()))
}

fn envelope_with_tools() -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": 0,
        "result": {
            "tools": [
                {
                    "name": "search_datasets",
                    "description": "Recherche de jeux de données",
                    "inputSchema": {"$schema": "draft", "type": "object"},
                }
            ]
        }
    })
}

#[tokio::test]
async fn handshake_runs_once_and_session_token_sticks() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/mcp"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header(SESSION_HEADER, "sess-123")
                .set_body_json(envelope_with_tools()),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let first = client.list_tools().await.expect("first list_tools");
    let second = client.list_tools().await.expect("second list_tools");
    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);

    let requests = server.received_requests().await.expect("recorded requests");
    // initialize, initialized notification, then one tools/list per call.
    assert_eq!(requests.len(), 4);

    let bodies: Vec<Value> = requests
        .iter()
        .map(|request| serde_json::from_slice(&request.body).expect("json body"))
        .collect();
    assert_eq!(bodies[0]["method"], "initialize");
    assert_eq!(bodies[1]["method"], "notifications/initialized");
    assert!(bodies[1].get("id").is_none());
    assert_eq!(bodies[2]["method"], "tools/list");
    assert_eq!(bodies[3]["method"], "tools/list");

    // No token on the very first request; the server-issued token afterwards.
    assert!(requests[0].headers.get(SESSION_HEADER).is_none());
    for request in &requests[1..] {
        let token = request
            .headers
            .get(SESSION_HEADER)
            .expect("session token header");
        assert_eq!(token.to_str().expect("ascii token"), "sess-123");
    }

    // Both response framings are declared acceptable on every request.
    for request in &requests {
        let accept = request.headers.get("accept").expect("accept header");
        let accept = accept.to_str().expect("ascii accept header");
        assert!(accept.contains("application/json"));
        assert!(accept.contains("text/event-stream"));
    }

    // Request ids are strictly increasing across the session.
    let ids: Vec<u64> = bodies
        .iter()
        .filter_map(|body| body.get("id").and_then(Value::as_u64))
        .collect();
    assert_eq!(ids.len(), 3);
    assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
}

#[tokio::test]
async fn event_stream_response_is_scanned_for_first_data_payload() {
    let server = MockServer::start().await;
    let stream_body = concat!(
        "event: message\n",
        "data: pas du json\n",
        "data: {\"jsonrpc\":\"2.0\",\"id\":3,\"result\":{\"content\":[{\"type\":\"text\",\"text\":\"bonjour\"}]}}\n",
        "data: [DONE]\n",
    );
    Mock::given(method("POST"))
        .and(path("/mcp"))
        .and(body_partial_json(json!({"method": "tools/call"})))
        .respond_with(ResponseTemplate::new(200).set_body_raw(stream_body, "text/event-stream"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/mcp"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0", "id": 0, "result": {}
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let text = client
        .call_tool("search_datasets", json!({"q": "air"}))
        .await;
    assert_eq!(text, "bonjour");
}

#[tokio::test]
async fn notification_accepted_with_empty_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/mcp"))
        .and(body_partial_json(json!({"method": "notifications/initialized"})))
        .respond_with(ResponseTemplate::new(202))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/mcp"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope_with_tools()))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let tools = client.list_tools().await.expect("list_tools");
    assert_eq!(tools[0].name, "search_datasets");
}

#[tokio::test]
async fn malformed_body_becomes_inline_error_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/mcp"))
        .and(body_partial_json(json!({"method": "tools/call"})))
        .respond_with(ResponseTemplate::new(200).set_body_raw("{{{", "application/json"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/mcp"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0", "id": 0, "result": {}
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let text = client.call_tool("search_datasets", json!({})).await;
    assert!(text.contains("could not be executed"));

    // The session survives a failed call.
    let tools = client.list_tools().await.expect("list_tools after failure");
    assert!(tools.is_empty());
}

#[tokio::test]
async fn rpc_error_member_becomes_inline_error_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/mcp"))
        .and(body_partial_json(json!({"method": "tools/call"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 9,
            "error": {"code": -32602, "message": "unknown tool"},
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/mcp"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0", "id": 0, "result": {}
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let text = client.call_tool("does_not_exist", json!({})).await;
    assert!(text.contains("unknown tool"));
}

#[tokio::test]
async fn unreachable_endpoint_degrades_to_error_text() {
    // Port 9 is discard; nothing listens there.
    let client = McpHttpClient::new("http://127.0.0.1:9/mcp");
    let text = client.call_tool("search_datasets", json!({})).await;
    assert!(text.contains("could not be executed"));
}
