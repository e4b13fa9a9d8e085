//! Typed access to a tool-call argument bag.
//!
//! Arguments arrive as an untyped JSON object from `tools/call`. Each
//! accessor validates presence and shape at the boundary so that tool
//! methods only see well-formed input.

use crate::error::ToolError;
use serde_json::{Map, Value};

/// Default page size for paginated listing operations.
pub const DEFAULT_PER_PAGE: u32 = 30;

/// Wrapper over the raw argument object of one tool call.
#[derive(Debug, Clone, Default)]
pub struct Args(Map<String, Value>);

impl Args {
    pub fn new(arguments: Option<Value>) -> Self {
        match arguments {
            Some(Value::Object(map)) => Self(map),
            _ => Self(Map::new()),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        // Explicit null is treated as absent, like the source language's .get().
        self.0.get(key).filter(|v| !v.is_null())
    }

    /// Required non-empty string.
    pub fn req_str(&self, key: &str) -> Result<&str, ToolError> {
        match self.get(key) {
            Some(Value::String(s)) if !s.is_empty() => Ok(s),
            Some(Value::String(_)) | None => Err(ToolError::missing(key)),
            Some(_) => Err(ToolError::invalid(format!("{key} must be a string"))),
        }
    }

    pub fn opt_str(&self, key: &str) -> Result<Option<&str>, ToolError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(_) => Err(ToolError::invalid(format!("{key} must be a string"))),
        }
    }

    /// Optional string with a default.
    pub fn str_or<'a>(&'a self, key: &str, default: &'a str) -> Result<&'a str, ToolError> {
        Ok(self.opt_str(key)?.unwrap_or(default))
    }

    /// String (with default) restricted to an allowed set.
    pub fn enumerated<'a>(
        &'a self,
        key: &str,
        default: &'a str,
        allowed: &[&str],
    ) -> Result<&'a str, ToolError> {
        let value = self.str_or(key, default)?;
        if allowed.contains(&value) {
            Ok(value)
        } else {
            Err(ToolError::invalid(format!(
                "{key} must be one of: {}",
                allowed.join(", ")
            )))
        }
    }

    /// Required integer (e.g. pull_number, comment_id).
    pub fn req_i64(&self, key: &str) -> Result<i64, ToolError> {
        match self.get(key) {
            Some(Value::Number(n)) => n
                .as_i64()
                .ok_or_else(|| ToolError::invalid(format!("{key} must be an integer"))),
            Some(_) => Err(ToolError::invalid(format!("{key} must be an integer"))),
            None => Err(ToolError::missing(key)),
        }
    }

    pub fn opt_i64(&self, key: &str) -> Result<Option<i64>, ToolError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Number(n)) => Ok(Some(n.as_i64().ok_or_else(|| {
                ToolError::invalid(format!("{key} must be an integer"))
            })?)),
            Some(_) => Err(ToolError::invalid(format!("{key} must be an integer"))),
        }
    }

    pub fn bool_or(&self, key: &str, default: bool) -> Result<bool, ToolError> {
        match self.get(key) {
            None => Ok(default),
            Some(Value::Bool(b)) => Ok(*b),
            Some(_) => Err(ToolError::invalid(format!("{key} must be a boolean"))),
        }
    }

    pub fn opt_array(&self, key: &str) -> Result<Option<&Vec<Value>>, ToolError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Array(items)) => Ok(Some(items)),
            Some(_) => Err(ToolError::invalid(format!("{key} must be a list"))),
        }
    }

    pub fn opt_object(&self, key: &str) -> Result<Option<&Map<String, Value>>, ToolError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Object(map)) => Ok(Some(map)),
            Some(_) => Err(ToolError::invalid(format!("{key} must be an object"))),
        }
    }

    /// Required non-empty object (update filters, update docs).
    pub fn req_object(&self, key: &str) -> Result<&Map<String, Value>, ToolError> {
        match self.get(key) {
            Some(Value::Object(map)) if !map.is_empty() => Ok(map),
            Some(Value::Object(_)) => {
                Err(ToolError::invalid(format!("{key} must not be empty")))
            }
            Some(_) => Err(ToolError::invalid(format!("{key} must be an object"))),
            None => Err(ToolError::missing(key)),
        }
    }

    /// Page size, defaulting to 30 and rejected outside [1, 100].
    ///
    /// Runs before any network or database call.
    pub fn per_page(&self) -> Result<u32, ToolError> {
        match self.get("per_page") {
            None => Ok(DEFAULT_PER_PAGE),
            Some(Value::Number(n)) => match n.as_i64() {
                Some(v @ 1..=100) => Ok(v as u32),
                _ => Err(ToolError::invalid(
                    "per_page must be an integer between 1 and 100",
                )),
            },
            Some(_) => Err(ToolError::invalid(
                "per_page must be an integer between 1 and 100",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    fn args(v: Value) -> Args {
        Args::new(Some(v))
    }

    #[test]
    fn req_str_rejects_missing_empty_and_null() {
        let a = args(json!({"repo": "", "ref": null}));
        assert_eq!(a.req_str("repo").unwrap_err().kind, ErrorKind::MissingArgument);
        assert_eq!(a.req_str("ref").unwrap_err().kind, ErrorKind::MissingArgument);
        assert_eq!(a.req_str("owner").unwrap_err().kind, ErrorKind::MissingArgument);
    }

    #[test]
    fn req_str_rejects_wrong_type() {
        let a = args(json!({"owner": 7}));
        assert_eq!(a.req_str("owner").unwrap_err().kind, ErrorKind::InvalidArgument);
    }

    #[test]
    fn per_page_defaults_and_bounds() {
        assert_eq!(args(json!({})).per_page().unwrap(), 30);
        assert_eq!(args(json!({"per_page": 100})).per_page().unwrap(), 100);
        assert_eq!(args(json!({"per_page": 1})).per_page().unwrap(), 1);
        for bad in [json!({"per_page": 0}), json!({"per_page": 101}),
                    json!({"per_page": -3}), json!({"per_page": 2.5}),
                    json!({"per_page": "30"})] {
            assert_eq!(args(bad).per_page().unwrap_err().kind, ErrorKind::InvalidArgument);
        }
    }

    #[test]
    fn enumerated_rejects_outside_set() {
        let a = args(json!({"state": "merged"}));
        let err = a.enumerated("state", "open", &["open", "closed", "all"]).unwrap_err();
        assert!(err.message.contains("open, closed, all"));

        let a = args(json!({}));
        assert_eq!(a.enumerated("state", "open", &["open", "closed", "all"]).unwrap(), "open");
    }

    #[test]
    fn req_object_rejects_empty() {
        let a = args(json!({"filter": {}}));
        assert_eq!(a.req_object("filter").unwrap_err().kind, ErrorKind::InvalidArgument);
        let a = args(json!({"filter": {"x": 1}}));
        assert_eq!(a.req_object("filter").unwrap().len(), 1);
    }

    #[test]
    fn non_object_arguments_read_as_empty() {
        let a = Args::new(Some(json!([1, 2])));
        assert!(a.get("anything").is_none());
        let a = Args::new(None);
        assert!(a.get("anything").is_none());
    }
}
