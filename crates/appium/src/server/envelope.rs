// Copyright 2026 appium-rs contributors
// Licensed under the Apache License, Version 2.0
//
// Protocol Envelope - decoding of `{status, value, sessionId?}` responses
//
// Two server generations share the wire:
// - JSON Wire Protocol: numeric `status`, 0 = success, `value` is a string
//   message (or object) on failure
// - W3C WebDriver: no `status`; failures carry `value.error` and
//   `value.message` with a non-2xx HTTP status
//
// Decoding never asserts the shape of `status` or `value`. Anything that is
// not valid JSON becomes `Error::Decode` with the raw body attached.

use crate::error::{Error, Result};
use crate::server::transport::{HttpResponse, Method};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Key under which legacy servers return element references
pub const ELEMENT_KEY: &str = "ELEMENT";

/// Key under which W3C servers return element references
pub const W3C_ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Message used when a failure carries no usable text
const UNKNOWN_ERROR_MESSAGE: &str = "unknown error";

/// A successfully decoded protocol response
///
/// Only produced for responses whose status indicates success. Keeps the
/// request method/path and raw body so later typed decoding can report a
/// precise `Error::Decode`.
#[derive(Debug, Clone)]
pub struct ProtocolResponse {
    /// Command-specific payload; `Null` when the server omitted it
    pub value: Value,
    /// Top-level `sessionId`, when present and a string
    pub session_id: Option<String>,
    method: Method,
    path: String,
    raw: Bytes,
}

impl ProtocolResponse {
    /// Converts `value` into a typed result
    pub fn value_as<R: DeserializeOwned>(&self) -> Result<R> {
        R::deserialize(&self.value).map_err(|e| {
            self.decode_error(format!(
                "unexpected value shape for {}: {}",
                std::any::type_name::<R>(),
                e
            ))
        })
    }

    /// Builds a `Error::Decode` for this response
    pub fn decode_error(&self, reason: impl Into<String>) -> Error {
        Error::Decode {
            method: self.method.to_string(),
            path: self.path.clone(),
            reason: reason.into(),
            body: raw_text(&self.raw),
        }
    }
}

/// Outcome of interpreting the envelope status
#[derive(Debug, Clone, PartialEq, Eq)]
enum Outcome {
    Success,
    Failure {
        status: String,
        error: Option<String>,
        message: String,
    },
}

/// Decodes a transport response into a success value or a protocol error
pub fn decode_response(method: Method, path: &str, response: &HttpResponse) -> Result<ProtocolResponse> {
    let decode_error = |reason: String| Error::Decode {
        method: method.to_string(),
        path: path.to_string(),
        reason,
        body: raw_text(&response.body),
    };

    if response.body.iter().all(u8::is_ascii_whitespace) {
        return Err(decode_error(format!(
            "empty response body (HTTP {})",
            response.status
        )));
    }

    let parsed: Value = serde_json::from_slice(&response.body)
        .map_err(|e| decode_error(format!("invalid JSON (HTTP {}): {}", response.status, e)))?;

    let (status, value, session_id) = match parsed {
        Value::Object(mut envelope) => {
            let status = envelope.remove("status");
            let value = envelope.remove("value").unwrap_or(Value::Null);
            let session_id = match envelope.remove("sessionId") {
                Some(Value::String(id)) if !id.is_empty() => Some(id),
                _ => None,
            };
            (status, value, session_id)
        }
        // Some older endpoints answer with a bare array instead of an envelope
        Value::Array(items) => (None, Value::Array(items), None),
        other => {
            return Err(decode_error(format!(
                "expected a JSON object envelope, got {}",
                json_kind(&other)
            )));
        }
    };

    match interpret(status.as_ref(), &value, response.status) {
        Outcome::Success => Ok(ProtocolResponse {
            value,
            session_id,
            method,
            path: path.to_string(),
            raw: response.body.clone(),
        }),
        Outcome::Failure {
            status,
            error,
            message,
        } => {
            tracing::debug!(
                %method,
                path,
                status = %status,
                error = ?error,
                "Command rejected by server: {}",
                message
            );
            Err(Error::Command {
                method: method.to_string(),
                path: path.to_string(),
                status,
                error,
                message,
            })
        }
    }
}

/// Decides success/failure from the envelope `status`, the `value` shape and
/// the HTTP status code.
///
/// An explicit envelope status always wins. Without one, a W3C error object or
/// a non-2xx HTTP status means failure.
fn interpret(status: Option<&Value>, value: &Value, http_status: u16) -> Outcome {
    let failure = |status: String| Outcome::Failure {
        status,
        error: w3c_error_code(value),
        message: extract_message(value),
    };

    match status {
        Some(Value::Number(n)) => {
            if n.as_i64() == Some(0) || n.as_u64() == Some(0) || n.as_f64() == Some(0.0) {
                Outcome::Success
            } else {
                failure(n.to_string())
            }
        }
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed == "0" || trimmed.eq_ignore_ascii_case("success") {
                Outcome::Success
            } else {
                failure(s.clone())
            }
        }
        None | Some(Value::Null) => {
            if w3c_error_code(value).is_some() || !(200..300).contains(&http_status) {
                failure(http_status.to_string())
            } else {
                Outcome::Success
            }
        }
        Some(other) => failure(other.to_string()),
    }
}

/// W3C error code (`value.error`), if the value carries one
fn w3c_error_code(value: &Value) -> Option<String> {
    value
        .get("error")
        .and_then(Value::as_str)
        .filter(|code| !code.is_empty())
        .map(str::to_string)
}

/// Best-effort human-readable message from a failure payload
pub fn extract_message(value: &Value) -> String {
    match value {
        Value::String(s) if !s.is_empty() => s.clone(),
        Value::Object(map) => match map.get("message") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            _ => value.to_string(),
        },
        Value::Null | Value::String(_) => UNKNOWN_ERROR_MESSAGE.to_string(),
        other => other.to_string(),
    }
}

/// Element id from a `{ELEMENT: ..}` or W3C element reference object
pub fn element_id(value: &Value) -> Option<String> {
    [ELEMENT_KEY, W3C_ELEMENT_KEY]
        .iter()
        .filter_map(|key| value.get(*key).and_then(Value::as_str))
        .find(|id| !id.is_empty())
        .map(str::to_string)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn raw_text(body: &[u8]) -> String {
    String::from_utf8_lossy(body).into_owned()
}
