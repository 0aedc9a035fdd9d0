//! JSON method codec used on every channel.
//!
//! Calls travel as `{"method": ..., "args": ...}`. Replies are envelopes:
//! `[value]` for success, `[code, message, details]` for errors and an empty
//! message when the method is not implemented.

use serde_json::{json, Value};
use thiserror::Error;

/// A decoded method invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    pub method: String,
    pub arguments: Value,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, arguments: Value) -> Self {
        Self {
            method: method.into(),
            arguments,
        }
    }
}

/// The single reply produced for a call.
#[derive(Debug, Clone, PartialEq)]
pub enum MethodResponse {
    Success(Value),
    Error {
        code: String,
        message: Option<String>,
        details: Value,
    },
    NotImplemented,
}

impl MethodResponse {
    pub fn success(value: impl Into<Value>) -> Self {
        MethodResponse::Success(value.into())
    }
}

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("message is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("message is not a method call")]
    NotAMethodCall,
    #[error("malformed reply envelope")]
    MalformedEnvelope,
}

pub fn encode_method_call(call: &MethodCall) -> Vec<u8> {
    json!({ "method": call.method, "args": call.arguments })
        .to_string()
        .into_bytes()
}

pub fn decode_method_call(message: &[u8]) -> Result<MethodCall, CodecError> {
    let value: Value = serde_json::from_slice(message)?;
    let Value::Object(mut map) = value else {
        return Err(CodecError::NotAMethodCall);
    };
    let method = match map.remove("method") {
        Some(Value::String(method)) => method,
        _ => return Err(CodecError::NotAMethodCall),
    };
    let arguments = map.remove("args").unwrap_or(Value::Null);
    Ok(MethodCall { method, arguments })
}

pub fn encode_response(response: &MethodResponse) -> Vec<u8> {
    let envelope = match response {
        MethodResponse::Success(value) => json!([value]),
        MethodResponse::Error {
            code,
            message,
            details,
        } => json!([code, message, details]),
        MethodResponse::NotImplemented => return Vec::new(),
    };
    envelope.to_string().into_bytes()
}

pub fn decode_response(reply: &[u8]) -> Result<MethodResponse, CodecError> {
    if reply.is_empty() {
        return Ok(MethodResponse::NotImplemented);
    }
    let value: Value = serde_json::from_slice(reply)?;
    let Value::Array(mut items) = value else {
        return Err(CodecError::MalformedEnvelope);
    };
    match items.len() {
        1 => Ok(MethodResponse::Success(items.remove(0))),
        3 => {
            let details = items.remove(2);
            let message = match items.remove(1) {
                Value::String(message) => Some(message),
                Value::Null => None,
                _ => return Err(CodecError::MalformedEnvelope),
            };
            let code = match items.remove(0) {
                Value::String(code) => code,
                _ => return Err(CodecError::MalformedEnvelope),
            };
            Ok(MethodResponse::Error {
                code,
                message,
                details,
            })
        }
        _ => Err(CodecError::MalformedEnvelope),
    }
}

/// Render a reply as the JSON value written by the CLI host.
pub fn reply_to_value(reply: Option<&[u8]>) -> Result<Value, CodecError> {
    match reply {
        None => Ok(Value::Null),
        Some([]) => Ok(Value::Array(Vec::new())),
        Some(bytes) => Ok(serde_json::from_slice(bytes)?),
    }
}
