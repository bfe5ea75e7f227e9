//! MCP request dispatch: one JSON-RPC message in, at most one out.

use serde_json::{json, Value};
use std::io::{self, BufRead, Write};

use crate::protocol::{
    JsonRpcError, JsonRpcRequest, JsonRpcResponse, INTERNAL_ERROR, INVALID_REQUEST,
    JSONRPC_VERSION, MCP_PROTOCOL_VERSION, PARSE_ERROR,
};
use crate::state::ServerState;
use crate::tools;
use crate::transport::StdioTransport;

pub const SERVER_NAME: &str = "ppt-mcp-server";

pub struct McpServer {
    state: ServerState,
}

impl McpServer {
    pub fn new(state: ServerState) -> Self {
        Self { state }
    }

    /// Serve until the input closes.
    pub fn run<R: BufRead, W: Write>(&mut self, transport: &mut StdioTransport<R, W>) -> io::Result<()> {
        log::info!("{SERVER_NAME} ready, {} tools", tools::definitions().len());
        while let Some(line) = transport.read_message()? {
            if let Some(response) = self.handle_line(&line) {
                transport.write_message(&response)?;
            }
        }
        log::info!(
            "input closed with {} presentation(s) open (current: {})",
            self.state.store.len(),
            self.state.store.current_id().unwrap_or("none")
        );
        Ok(())
    }

    /// Handle one raw message. Notifications produce no response.
    pub fn handle_line(&mut self, line: &str) -> Option<String> {
        let response = match serde_json::from_str::<Value>(line) {
            Err(e) => Some(JsonRpcResponse::failure(
                Value::Null,
                JsonRpcError::new(PARSE_ERROR, format!("Parse error: {e}")),
            )),
            Ok(message) => self.handle_message(message),
        }?;
        match serde_json::to_string(&response) {
            Ok(text) => Some(text),
            Err(e) => {
                log::error!("failed to serialize response: {e}");
                None
            }
        }
    }

    fn handle_message(&mut self, message: Value) -> Option<JsonRpcResponse> {
        let id = message.get("id").cloned();
        let request: JsonRpcRequest = match serde_json::from_value(message) {
            Ok(request) => request,
            Err(e) => {
                return Some(JsonRpcResponse::failure(
                    id.unwrap_or(Value::Null),
                    JsonRpcError::new(INVALID_REQUEST, format!("Invalid request: {e}")),
                ));
            }
        };
        if request.jsonrpc != JSONRPC_VERSION {
            return Some(JsonRpcResponse::failure(
                request.id.unwrap_or(Value::Null),
                JsonRpcError::new(INVALID_REQUEST, "Invalid request: jsonrpc must be \"2.0\""),
            ));
        }

        if request.is_notification() {
            log::debug!("notification {}", request.method);
            return None;
        }
        let result = self.handle_request(&request.method, request.params.unwrap_or(Value::Null));
        let id = request.id.unwrap_or(Value::Null);
        Some(match result {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(error) => {
                log::debug!("{} failed: {}", request.method, error.message);
                JsonRpcResponse::failure(id, error)
            }
        })
    }

    fn handle_request(&mut self, method: &str, params: Value) -> Result<Value, JsonRpcError> {
        match method {
            "initialize" => Ok(json!({
                "protocolVersion": MCP_PROTOCOL_VERSION,
                "capabilities": {"tools": {}},
                "serverInfo": {"name": SERVER_NAME, "version": env!("CARGO_PKG_VERSION")},
            })),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": tools::definitions() })),
            "tools/call" => self.call_tool(&params),
            other => Err(JsonRpcError::method_not_found(other)),
        }
    }

    fn call_tool(&mut self, params: &Value) -> Result<Value, JsonRpcError> {
        let name = params
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| JsonRpcError::invalid_params("Missing tool name"))?;
        let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);

        log::debug!("tools/call {name}");
        let result = tools::call_tool(&mut self.state, name, &arguments)
            .ok_or_else(|| JsonRpcError::invalid_params(format!("Unknown tool: {name}")))?;
        let text = serde_json::to_string_pretty(&result)
            .map_err(|e| JsonRpcError::new(INTERNAL_ERROR, e.to_string()))?;
        Ok(json!({
            "content": [{"type": "text", "text": text}],
            "isError": tools::is_error(&result),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{INVALID_PARAMS, METHOD_NOT_FOUND};
    use crate::tools::testing;
    use std::io::Cursor;

    fn server() -> McpServer {
        McpServer::new(testing::state())
    }

    fn request(server: &mut McpServer, message: Value) -> Value {
        let line = server
            .handle_line(&message.to_string())
            .expect("request should get a response");
        serde_json::from_str(&line).unwrap()
    }

    fn tool_payload(response: &Value) -> Value {
        let text = response["result"]["content"][0]["text"].as_str().unwrap();
        serde_json::from_str(text).unwrap()
    }

    #[test]
    fn test_initialize_and_list() {
        let mut server = server();
        let response = request(
            &mut server,
            json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}),
        );
        assert_eq!(response["id"], 1);
        assert_eq!(response["result"]["protocolVersion"], MCP_PROTOCOL_VERSION);
        assert_eq!(response["result"]["serverInfo"]["name"], SERVER_NAME);

        let response = request(&mut server, json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}));
        let tools = response["result"]["tools"].as_array().unwrap();
        assert!(tools.iter().any(|t| t["name"] == "add_slide"));
        assert!(tools.iter().all(|t| t["inputSchema"]["type"] == "object"));
    }

    #[test]
    fn test_notifications_get_no_response() {
        let mut server = server();
        let line = json!({"jsonrpc": "2.0", "method": "notifications/initialized"}).to_string();
        assert!(server.handle_line(&line).is_none());
    }

    #[test]
    fn test_tool_call_results_and_errors() {
        let mut server = server();
        let response = request(
            &mut server,
            json!({"jsonrpc": "2.0", "id": "a", "method": "tools/call",
                   "params": {"name": "create_presentation", "arguments": {"id": "deck"}}}),
        );
        assert_eq!(response["result"]["isError"], false);
        assert_eq!(tool_payload(&response)["presentation_id"], "deck");
        assert_eq!(server.state.store.current_id(), Some("deck"));

        let response = request(
            &mut server,
            json!({"jsonrpc": "2.0", "id": "b", "method": "tools/call",
                   "params": {"name": "get_slide_info", "arguments": {"slide_index": 4}}}),
        );
        assert_eq!(response["result"]["isError"], true);
        assert_eq!(
            tool_payload(&response)["error"],
            "Invalid slide index: 4. No slides available"
        );
    }

    #[test]
    fn test_protocol_errors() {
        let mut server = server();
        let response: Value = serde_json::from_str(&server.handle_line("{not json").unwrap()).unwrap();
        assert_eq!(response["error"]["code"], PARSE_ERROR);
        assert!(response["id"].is_null());

        let response = request(&mut server, json!({"jsonrpc": "2.0", "id": 3, "method": "resources/list"}));
        assert_eq!(response["error"]["code"], METHOD_NOT_FOUND);

        let response = request(
            &mut server,
            json!({"jsonrpc": "2.0", "id": 4, "method": "tools/call", "params": {"name": "nope"}}),
        );
        assert_eq!(response["error"]["code"], INVALID_PARAMS);
        assert_eq!(response["error"]["message"], "Unknown tool: nope");

        let response = request(&mut server, json!({"jsonrpc": "1.0", "id": 5, "method": "ping"}));
        assert_eq!(response["error"]["code"], INVALID_REQUEST);
    }

    #[test]
    fn test_run_over_a_stream() {
        let input = [
            json!({"jsonrpc": "2.0", "id": 1, "method": "ping"}).to_string(),
            json!({"jsonrpc": "2.0", "method": "notifications/initialized"}).to_string(),
            json!({"jsonrpc": "2.0", "id": 2, "method": "tools/call", "params": {"name": "create_presentation"}}).to_string(),
        ]
        .join("\n");
        let mut transport = StdioTransport::new(Cursor::new(input), Vec::new());
        let mut server = server();
        server.run(&mut transport).unwrap();

        let output = String::from_utf8(transport.into_writer()).unwrap();
        let lines: Vec<Value> = output.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["result"], json!({}));
        assert_eq!(tool_payload(&lines[1])["presentation_id"], "presentation_1");
    }
}
