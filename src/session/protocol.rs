//! JSON-RPC 2.0 framing for the upstream session.
//!
//! Each WebSocket text frame carries exactly one message:
//! ```text
//! request       {"jsonrpc":"2.0","id":7,"method":"tools/call","params":{...}}
//! notification  {"jsonrpc":"2.0","method":"notifications/initialized"}
//! response      {"jsonrpc":"2.0","id":7,"result":{...}}
//! error         {"jsonrpc":"2.0","id":7,"error":{"code":-32602,"message":"..."}}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{rpc_code, Error};

pub const JSONRPC_VERSION: &str = "2.0";

/// Incoming request or notification.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    /// Absent for notifications. An explicit `null` id is still a request.
    #[serde(default, deserialize_with = "present")]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

impl RpcRequest {
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Error object of a failed response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

impl From<&Error> for RpcError {
    fn from(err: &Error) -> Self {
        Self {
            code: err.to_rpc_code(),
            message: err.to_string(),
        }
    }
}

/// Outgoing response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl RpcResponse {
    pub fn result(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Value, error: RpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

/// Outcome of decoding one text frame.
#[derive(Debug)]
pub enum Decoded {
    Request(RpcRequest),
    /// A response from the peer to something we never send; ignored.
    Response,
    /// Undecodable frame, answered with this error response.
    Invalid(RpcResponse),
}

/// Decode one text frame.
pub fn decode(text: &str) -> Decoded {
    let value: Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(e) => {
            return Decoded::Invalid(RpcResponse::error(
                Value::Null,
                RpcError {
                    code: rpc_code::PARSE_ERROR,
                    message: format!("Parse error: {}", e),
                },
            ))
        }
    };

    if value.get("method").is_none()
        && (value.get("result").is_some() || value.get("error").is_some())
    {
        return Decoded::Response;
    }

    let id = value.get("id").cloned().unwrap_or(Value::Null);
    match serde_json::from_value::<RpcRequest>(value) {
        Ok(request) if request.jsonrpc == JSONRPC_VERSION => Decoded::Request(request),
        Ok(request) => Decoded::Invalid(RpcResponse::error(
            id,
            RpcError::from(&Error::protocol(format!(
                "unsupported jsonrpc version {:?}",
                request.jsonrpc
            ))),
        )),
        Err(e) => Decoded::Invalid(RpcResponse::error(
            id,
            RpcError::from(&Error::protocol(format!("invalid request: {}", e))),
        )),
    }
}

/// Encode a response as a text frame.
pub fn encode(response: &RpcResponse) -> Result<String, Error> {
    Ok(serde_json::to_string(response)?)
}
