//! JSON-RPC Parsing Utilities
//!
//! Safe extraction of results and hex quantities from JSON-RPC replies.

use crate::error::{ForgeError, ForgeResult};
use serde_json::Value;

/// Build a JSON-RPC 2.0 request body
pub fn rpc_request(method: &str, params: Value, id: u64) -> Value {
    serde_json::json!({
        "jsonrpc": "2.0",
        "method": method,
        "params": params,
        "id": id,
    })
}

/// Extract the `result` of a JSON-RPC reply, turning an `error` member into
/// a parse error carrying the node's message.
pub fn rpc_result(reply: &Value) -> ForgeResult<&Value> {
    if let Some(err) = reply.get("error").filter(|e| !e.is_null()) {
        let message = err
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("unknown error");
        return Err(ForgeError::parse_error(format!("JSON-RPC error: {}", message)));
    }

    match reply.get("result") {
        Some(result) if !result.is_null() => Ok(result),
        _ => Err(ForgeError::parse_error("JSON-RPC reply has no result")),
    }
}

/// Parse a hex quantity (`0x`-prefixed) to u64 safely
pub fn parse_hex_u64(hex_str: &str) -> ForgeResult<u64> {
    let cleaned = hex_str
        .strip_prefix("0x")
        .or_else(|| hex_str.strip_prefix("0X"))
        .ok_or_else(|| ForgeError::parse_error(format!("Quantity '{}' lacks 0x prefix", hex_str)))?;
    if cleaned.is_empty() {
        return Err(ForgeError::parse_error("Empty hex quantity"));
    }
    u64::from_str_radix(cleaned, 16)
        .map_err(|e| ForgeError::parse_error(format!("Invalid hex u64 '{}': {}", hex_str, e)))
}

/// Extract a hex quantity result from a JSON-RPC reply
pub fn rpc_result_u64(reply: &Value) -> ForgeResult<u64> {
    let result = rpc_result(reply)?;
    let hex = result
        .as_str()
        .ok_or_else(|| ForgeError::parse_error("JSON-RPC result is not a string"))?;
    parse_hex_u64(hex)
}
