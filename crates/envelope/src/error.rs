//! Structured tool errors.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Classifies a tool failure for programmatic callers.
///
/// The kind is carried in the error envelope alongside the message so
/// that callers do not have to disambiguate by message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A declared required argument was absent.
    MissingArgument,
    /// An argument was present but malformed or out of range.
    InvalidArgument,
    /// The operation needs a configured credential and none is set.
    AuthRequired,
    /// The upstream rejected the presented credential (401).
    AuthFailed,
    /// The upstream denied access or rate-limited the caller (403).
    Forbidden,
    /// The upstream resource does not exist (404).
    NotFound,
    /// Any other non-success upstream response.
    Upstream,
    /// Network-level failure: timeout, connection refused, DNS.
    Transport,
    /// An error reported by the database driver.
    Database,
    /// The requested tool name is not registered.
    UnknownTool,
}

/// A failed tool invocation.
///
/// Collapses to `{"error": message, "kind": ..., <context>}` at the
/// boundary; see [`crate::render`].
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ToolError {
    pub kind: ErrorKind,
    pub message: String,
    context: Map<String, Value>,
}

impl ToolError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            context: Map::new(),
        }
    }

    /// Attach an echoed context field (repository, tool name, ...).
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Shorthand for a missing required argument.
    pub fn missing(param: &str) -> Self {
        Self::new(
            ErrorKind::MissingArgument,
            format!("Missing required parameter: {param}"),
        )
    }

    /// Shorthand for a malformed argument.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    /// The error envelope object.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("error".to_string(), Value::String(self.message.clone()));
        map.insert(
            "kind".to_string(),
            serde_json::to_value(self.kind).unwrap_or(Value::Null),
        );
        for (k, v) in &self.context {
            map.insert(k.clone(), v.clone());
        }
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_serializes_snake_case() {
        let v = serde_json::to_value(ErrorKind::AuthRequired).unwrap();
        assert_eq!(v, "auth_required");
    }

    #[test]
    fn missing_message_matches_convention() {
        let err = ToolError::missing("owner");
        assert_eq!(err.message, "Missing required parameter: owner");
        assert_eq!(err.kind, ErrorKind::MissingArgument);
    }

    #[test]
    fn context_does_not_clobber_error_key() {
        let err = ToolError::new(ErrorKind::UnknownTool, "Unknown tool: nope")
            .with_context("available_tools", vec!["a", "b"]);
        let v = err.to_value();
        assert_eq!(v["error"], "Unknown tool: nope");
        assert_eq!(v["available_tools"][1], "b");
    }
}
