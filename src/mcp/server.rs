//! Line-delimited JSON-RPC loop over stdio.

use std::io::{BufRead, Write};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use super::prompts::{get_prompt, list_prompts};
use super::protocol::*;
use super::resources::{TEMPLATES, list_resources, read_resource};
use super::tools::{find_tool, list_tools};
use crate::store::MetadataStore;

pub const SERVER_NAME: &str = "dsmeta";

/// Every request is answered from disk; the server keeps no state between
/// calls beyond the store's validated metadata cache.
pub struct McpServer {
    store: MetadataStore,
}

impl McpServer {
    pub fn new(store: MetadataStore) -> Self {
        Self { store }
    }

    /// Read requests from `input` until EOF, writing one response line per
    /// request. Notifications get no response. A line that is not UTF-8 is
    /// answered with a parse error and the loop keeps reading.
    pub fn run(&self, mut input: impl BufRead, mut output: impl Write) -> anyhow::Result<()> {
        tracing::info!("protocol server started");
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            let response = match std::str::from_utf8(&buf) {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => self.handle(line),
                Err(e) => {
                    tracing::warn!(error = %e, "dropping request that is not UTF-8");
                    Some(JsonRpcResponse::error(Value::Null, PARSE_ERROR, e.to_string()))
                }
            };
            let Some(response) = response else {
                continue;
            };
            let out = serde_json::to_string(&response)?;
            writeln!(output, "{out}")?;
            output.flush()?;
        }
        tracing::info!("protocol server shutting down");
        Ok(())
    }

    /// Handle one message. `None` for notifications.
    pub fn handle(&self, msg: &str) -> Option<JsonRpcResponse> {
        let raw: Value = match serde_json::from_str(msg) {
            Ok(v) => v,
            Err(e) => return Some(JsonRpcResponse::error(Value::Null, PARSE_ERROR, e.to_string())),
        };
        let req: JsonRpcRequest = match serde_json::from_value(raw) {
            Ok(r) => r,
            Err(e) => {
                return Some(JsonRpcResponse::error(Value::Null, INVALID_REQUEST, e.to_string()));
            }
        };

        if req.is_notification() {
            tracing::debug!(method = %req.method, "notification");
            return None;
        }
        let id = req.id.clone().unwrap_or(Value::Null);
        tracing::debug!(method = %req.method, "request");

        let result = match req.method.as_str() {
            "initialize" => to_value(InitializeResult {
                protocol_version: PROTOCOL_VERSION.into(),
                capabilities: ServerCapabilities {
                    tools: ListChanged::default(),
                    resources: ListChanged::default(),
                    prompts: ListChanged::default(),
                },
                server_info: ServerInfo {
                    name: SERVER_NAME.into(),
                    version: env!("CARGO_PKG_VERSION").into(),
                },
            }),
            "ping" => Ok(json!({})),
            "tools/list" => to_value(ToolsListResult { tools: list_tools() }),
            "tools/call" => self.call_tool(req.params),
            "resources/list" => Ok(json!({ "resources": list_resources(&self.store) })),
            "resources/templates/list" => Ok(json!({ "resourceTemplates": TEMPLATES })),
            "resources/read" => self.read_resource(req.params),
            "prompts/list" => Ok(json!({ "prompts": list_prompts() })),
            "prompts/get" => self.get_prompt(req.params),
            other => {
                tracing::warn!(method = other, "unknown method");
                Err((METHOD_NOT_FOUND, format!("Unknown method: {other}")))
            }
        };

        Some(match result {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err((code, message)) => JsonRpcResponse::error(id, code, message),
        })
    }

    fn call_tool(&self, params: Value) -> RpcResult {
        let params: ToolCallParams = params_of(params)?;
        let tool = find_tool(&params.name)
            .ok_or_else(|| (INVALID_PARAMS, format!("Unknown tool: {}", params.name)))?;
        to_value(tool.call(&self.store, params.arguments))
    }

    fn read_resource(&self, params: Value) -> RpcResult {
        let params: ResourceReadParams = params_of(params)?;
        let contents =
            read_resource(&self.store, &params.uri).map_err(|e| (INVALID_PARAMS, e.to_string()))?;
        to_value(ResourceReadResult {
            contents: vec![contents],
        })
    }

    fn get_prompt(&self, params: Value) -> RpcResult {
        let params: PromptGetParams = params_of(params)?;
        let result = get_prompt(&self.store, &params.name, &params.arguments)
            .map_err(|e| (INVALID_PARAMS, e.to_string()))?;
        to_value(result)
    }
}

type RpcResult = Result<Value, (i32, String)>;

fn params_of<T: DeserializeOwned>(params: Value) -> Result<T, (i32, String)> {
    serde_json::from_value(params).map_err(|e| (INVALID_PARAMS, format!("Invalid params: {e}")))
}

fn to_value<T: Serialize>(value: T) -> RpcResult {
    serde_json::to_value(value).map_err(|e| (INTERNAL_ERROR, format!("Serialization error: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::Project;

    fn server(project: &Project) -> McpServer {
        McpServer::new(MetadataStore::new(project.config()))
    }

    fn request(server: &McpServer, id: u64, method: &str, params: Value) -> Value {
        let msg = json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params });
        let response = server.handle(&msg.to_string()).unwrap();
        serde_json::to_value(response).unwrap()
    }

    #[test]
    fn initialize_advertises_capabilities() {
        let project = Project::with_store();
        let resp = request(&server(&project), 1, "initialize", json!({}));
        assert_eq!(resp["id"], 1);
        assert_eq!(resp["result"]["protocolVersion"], "2024-11-05");
        assert_eq!(resp["result"]["serverInfo"]["name"], "dsmeta");
        for capability in ["tools", "resources", "prompts"] {
            assert!(resp["result"]["capabilities"][capability].is_object());
        }
    }

    #[test]
    fn notifications_get_no_response() {
        let project = Project::with_store();
        let msg = json!({ "jsonrpc": "2.0", "method": "notifications/initialized" });
        assert!(server(&project).handle(&msg.to_string()).is_none());
    }

    #[test]
    fn error_codes() {
        let project = Project::with_store();
        let s = server(&project);

        let parse = serde_json::to_value(s.handle("{not json").unwrap()).unwrap();
        assert_eq!(parse["error"]["code"], -32700);
        assert_eq!(parse["id"], Value::Null);

        let unknown = request(&s, 2, "tools/destroy", json!({}));
        assert_eq!(unknown["error"]["code"], -32601);

        let bad_params = request(&s, 3, "tools/call", json!({ "arguments": {} }));
        assert_eq!(bad_params["error"]["code"], -32602);

        let bad_tool = request(&s, 4, "tools/call", json!({ "name": "rm_rf" }));
        assert_eq!(bad_tool["error"]["code"], -32602);

        let bad_uri = request(&s, 5, "resources/read", json!({ "uri": "nope://x" }));
        assert_eq!(bad_uri["error"]["code"], -32602);
    }

    #[test]
    fn tool_call_round_trip() {
        let project = Project::with_store();
        let resp = request(
            &server(&project),
            7,
            "tools/call",
            json!({ "name": "get_component_info", "arguments": { "componentName": "Badge" } }),
        );
        let text = resp["result"]["content"][0]["text"].as_str().unwrap();
        let meta: Value = serde_json::from_str(text).unwrap();
        assert_eq!(meta["name"], "Badge");
        assert!(resp["result"].get("isError").is_none());
    }

    #[test]
    fn listings() {
        let project = Project::with_store();
        let s = server(&project);
        assert_eq!(request(&s, 1, "tools/list", Value::Null)["result"]["tools"].as_array().unwrap().len(), 9);
        assert_eq!(
            request(&s, 2, "resources/templates/list", Value::Null)["result"]["resourceTemplates"]
                .as_array()
                .unwrap()
                .len(),
            4
        );
        assert_eq!(request(&s, 3, "prompts/list", Value::Null)["result"]["prompts"].as_array().unwrap().len(), 4);
        assert_eq!(request(&s, 4, "ping", Value::Null)["result"], json!({}));
    }

    #[test]
    fn resource_read_and_prompt_get() {
        let project = Project::with_store();
        let s = server(&project);
        let read = request(&s, 1, "resources/read", json!({ "uri": "migration://Table" }));
        assert_eq!(read["result"]["contents"][0]["mimeType"], "text/markdown");
        assert!(read["result"]["contents"][0]["text"].as_str().unwrap().starts_with("# Migrate @mui/material Table → DataTable"));

        let prompt = request(&s, 2, "prompts/get", json!({ "name": "choose-component", "arguments": { "uiDescription": "a toggle" } }));
        assert_eq!(prompt["result"]["messages"][0]["role"], "user");

        let missing = request(&s, 3, "prompts/get", json!({ "name": "choose-component" }));
        assert_eq!(missing["error"]["code"], -32602);
    }

    #[test]
    fn run_loop_writes_one_line_per_request() {
        let project = Project::with_store();
        let input = [
            json!({ "jsonrpc": "2.0", "id": 1, "method": "ping" }).to_string(),
            String::new(),
            json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }).to_string(),
            json!({ "jsonrpc": "2.0", "id": 2, "method": "tools/list" }).to_string(),
        ]
        .join("\n");
        let mut out = Vec::new();
        server(&project).run(input.as_bytes(), &mut out).unwrap();
        let lines: Vec<Value> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["id"], 1);
        assert_eq!(lines[1]["id"], 2);
    }

    #[test]
    fn invalid_utf8_line_is_a_parse_error_and_loop_continues() {
        let project = Project::with_store();
        let mut input = b"\xff\xfe garbage\n".to_vec();
        let ping = json!({ "jsonrpc": "2.0", "id": 1, "method": "ping" }).to_string();
        input.extend_from_slice(ping.as_bytes());
        input.push(b'\n');
        let mut out = Vec::new();
        server(&project).run(input.as_slice(), &mut out).unwrap();
        let lines: Vec<Value> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["error"]["code"], PARSE_ERROR);
        assert_eq!(lines[0]["id"], Value::Null);
        assert_eq!(lines[1]["id"], 1);
        assert!(lines[1].get("error").is_none());
    }
}
