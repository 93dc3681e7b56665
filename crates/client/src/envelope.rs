//! Canonical response envelope.
//!
//! The backend answers either `{ "success": bool, "data": .., "message": .. }`
//! or the bare entity. Everything is normalized here so callers only ever
//! see the payload.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ClientError, ClientResult};

/// Extract the payload from a response body.
pub fn unwrap_payload(body: Value) -> ClientResult<Value> {
    let Value::Object(mut fields) = body else {
        return Ok(body);
    };

    let Some(success) = fields.get("success") else {
        return Ok(Value::Object(fields));
    };

    if success.as_bool() != Some(true) {
        let message = error_message(&Value::Object(fields))
            .unwrap_or_else(|| "request failed".to_string());
        return Err(ClientError::Rejected(message));
    }

    Ok(fields.remove("data").unwrap_or(Value::Null))
}

/// Extract and decode the payload.
pub fn decode<T: DeserializeOwned>(body: Value) -> ClientResult<T> {
    let payload = unwrap_payload(body)?;
    serde_json::from_value(payload).map_err(ClientError::from)
}

/// Best-effort human message from an error body.
pub fn error_message(body: &Value) -> Option<String> {
    ["message", "error"]
        .iter()
        .find_map(|k| body.get(*k).and_then(Value::as_str))
        .map(str::to_string)
}
