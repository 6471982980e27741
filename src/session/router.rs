//! Session router — maps JSON-RPC methods onto the bridge.

use serde_json::{json, Value};

use crate::bridge::InvocationBridge;
use crate::session::protocol::{RpcError, RpcRequest, RpcResponse};
use crate::types::{Error, Result};

/// Protocol revision answered when the client does not name one.
pub const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";

pub const SERVER_NAME: &str = "n8n-mcp-bridge";

/// Handle one decoded request. Notifications produce no response.
pub async fn handle(bridge: &InvocationBridge, request: RpcRequest) -> Option<RpcResponse> {
    let RpcRequest {
        id, method, params, ..
    } = request;

    let Some(id) = id else {
        tracing::debug!(method = %method, "Notification received");
        return None;
    };

    let params = params.unwrap_or_else(|| Value::Object(serde_json::Map::new()));
    match route_request(bridge, &method, params).await {
        Ok(result) => Some(RpcResponse::result(id, result)),
        Err(err) => {
            tracing::warn!(method = %method, error = %err, "Request failed");
            Some(RpcResponse::error(id, RpcError::from(&err)))
        }
    }
}

/// Route a request to the appropriate handler.
pub async fn route_request(bridge: &InvocationBridge, method: &str, params: Value) -> Result<Value> {
    match method {
        "initialize" => Ok(initialize_result(&params)),
        "ping" => Ok(json!({})),
        "tools/list" => {
            let tools: Vec<Value> = bridge.list_tools().iter().map(|t| t.to_listing()).collect();
            Ok(json!({ "tools": tools }))
        }
        "tools/call" => {
            let name = str_field(&params, "name")?;
            let arguments = params
                .get("arguments")
                .cloned()
                .filter(|v| !v.is_null())
                .unwrap_or_else(|| Value::Object(serde_json::Map::new()));

            let envelope = bridge.call(&name, &arguments).await?;
            Ok(serde_json::to_value(envelope)?)
        }
        _ => Err(Error::method_not_found(method)),
    }
}

fn initialize_result(params: &Value) -> Value {
    let protocol_version = params
        .get("protocolVersion")
        .and_then(|v| v.as_str())
        .unwrap_or(DEFAULT_PROTOCOL_VERSION);

    json!({
        "protocolVersion": protocol_version,
        "capabilities": { "tools": {} },
        "serverInfo": {
            "name": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION"),
        },
    })
}

pub fn str_field(body: &Value, key: &str) -> Result<String> {
    body.get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| Error::validation(format!("Missing required field: {}", key)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{ActionBackend, BackendReply, OutboundPayload};
    use crate::tools::ToolCatalog;
    use crate::types::rpc_code;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Debug)]
    struct Echo;

    #[async_trait::async_trait]
    impl ActionBackend for Echo {
        async fn dispatch(&self, payload: &OutboundPayload) -> Result<BackendReply> {
            Ok(BackendReply {
                status: 200,
                body: format!("{}@{}", payload.command, payload.target),
            })
        }
    }

    fn bridge() -> InvocationBridge {
        InvocationBridge::new(
            ToolCatalog::builtin(),
            Arc::new(Echo),
            "test",
            Duration::from_secs(1),
        )
    }

    fn request(id: Option<Value>, method: &str, params: Option<Value>) -> RpcRequest {
        RpcRequest {
            jsonrpc: "2.0".to_string(),
            id,
            method: method.to_string(),
            params,
        }
    }

    #[tokio::test]
    async fn test_initialize_echoes_protocol_version() {
        let result = route_request(&bridge(), "initialize", json!({"protocolVersion": "2025-03-26"}))
            .await
            .unwrap();
        assert_eq!(result["protocolVersion"], "2025-03-26");
        assert_eq!(result["serverInfo"]["name"], SERVER_NAME);
        assert_eq!(result["capabilities"], json!({"tools": {}}));
    }

    #[tokio::test]
    async fn test_initialize_defaults_protocol_version() {
        let result = route_request(&bridge(), "initialize", json!({})).await.unwrap();
        assert_eq!(result["protocolVersion"], DEFAULT_PROTOCOL_VERSION);
    }

    #[tokio::test]
    async fn test_tools_list() {
        let result = route_request(&bridge(), "tools/list", json!({})).await.unwrap();
        let tools = result["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0]["name"], "execute_action");
        assert_eq!(tools[0]["inputSchema"]["required"], json!(["action"]));
    }

    #[tokio::test]
    async fn test_tools_call_success() {
        let result = route_request(
            &bridge(),
            "tools/call",
            json!({"name": "execute_action", "arguments": {"action": "encender_luces", "target": "salon"}}),
        )
        .await
        .unwrap();
        assert_eq!(
            result,
            json!({"content": [{"type": "text", "text": "Action \"encender_luces\" completed. Response: encender_luces@salon"}]})
        );
    }

    #[tokio::test]
    async fn test_tools_call_unknown_tool_is_rpc_error() {
        let response = handle(
            &bridge(),
            request(
                Some(json!(9)),
                "tools/call",
                Some(json!({"name": "turn_on_tv", "arguments": {}})),
            ),
        )
        .await
        .unwrap();
        assert_eq!(response.id, json!(9));
        assert!(response.result.is_none());
        let error = response.error.unwrap();
        assert_eq!(error.code, rpc_code::INVALID_PARAMS);
        assert!(error.message.contains("turn_on_tv"));
    }

    #[tokio::test]
    async fn test_tools_call_without_name_is_rpc_error() {
        let err = route_request(&bridge(), "tools/call", json!({"arguments": {}}))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let response = handle(&bridge(), request(Some(json!("x")), "resources/list", None))
            .await
            .unwrap();
        assert_eq!(response.error.unwrap().code, rpc_code::METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_notification_gets_no_response() {
        let response = handle(
            &bridge(),
            request(None, "notifications/initialized", None),
        )
        .await;
        assert!(response.is_none());
    }

    #[tokio::test]
    async fn test_null_id_call_is_answered() {
        let frame = r#"{"jsonrpc":"2.0","id":null,"method":"tools/call",
            "params":{"name":"execute_action","arguments":{"action":"encender_luces"}}}"#;
        let crate::session::protocol::Decoded::Request(req) =
            crate::session::protocol::decode(frame)
        else {
            panic!("expected a request");
        };

        let response = handle(&bridge(), req).await.unwrap();
        assert_eq!(response.id, Value::Null);
        assert!(response.result.is_some());
    }

    #[tokio::test]
    async fn test_ping() {
        let response = handle(&bridge(), request(Some(json!(1)), "ping", None))
            .await
            .unwrap();
        assert_eq!(response.result, Some(json!({})));
    }
}
