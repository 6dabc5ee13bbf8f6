//! JSON-RPC envelope used by every admin API method except login/logout.
//!
//! Requests look like `{"id": "3", "method": "Blogs.List", "params": []}`;
//! the single parameter object, when present, is wrapped in a one-element
//! array. Responses carry either a `result` or a non-null `error`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RpcCall {
    pub id: String,
    pub method: String,
    pub params: Vec<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub result: Value,
    #[serde(default)]
    pub error: Value,
}

impl RpcResponse {
    /// The server-reported error message, if any. Falsy values (`null`,
    /// `false`, `0`, `""`) count as no error; other non-string errors are
    /// rendered as JSON.
    pub fn error_message(&self) -> Option<String> {
        match &self.error {
            Value::Null | Value::Bool(false) => None,
            Value::Number(n) if n.as_f64() == Some(0.0) => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}
