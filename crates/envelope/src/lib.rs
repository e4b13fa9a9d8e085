//! Shared tool-call plumbing: the JSON result envelope, structured
//! tool errors, and typed access to argument bags.
//!
//! Every tool in the workspace returns [`Outcome`] internally and is
//! serialized to its wire string exactly once, at [`render`]. The
//! string is either the success payload object or an object with an
//! `error` key plus limited context, never both.

mod args;
mod error;
mod info;

pub use args::Args;
pub use error::{ErrorKind, ToolError};
pub use info::{Category, ToolInfo};

use serde_json::Value;

/// Result of a single tool invocation, before boundary serialization.
pub type Outcome = Result<Value, ToolError>;

/// Serialize an outcome to the pretty-printed wire string.
///
/// This is the only place the error shape is produced; everything
/// upstream propagates [`ToolError`] by value.
pub fn render(outcome: Outcome) -> String {
    let value = match outcome {
        Ok(payload) => payload,
        Err(err) => err.to_value(),
    };
    // Value never contains non-string keys or NaN, so this cannot fail.
    serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_has_no_error_key() {
        let out = render(Ok(json!({"operation": "noop", "count": 0})));
        let v: Value = serde_json::from_str(&out).unwrap();
        assert!(v.get("operation").is_some());
        assert!(v.get("error").is_none());
    }

    #[test]
    fn error_has_only_error_and_context() {
        let err = ToolError::new(ErrorKind::NotFound, "Resource not found")
            .with_context("repository", "octocat/hello");
        let out = render(Err(err));
        let v: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["error"], "Resource not found");
        assert_eq!(v["kind"], "not_found");
        assert_eq!(v["repository"], "octocat/hello");
        assert!(v.get("operation").is_none());
    }

    #[test]
    fn render_is_pretty_printed() {
        let out = render(Ok(json!({"a": 1})));
        assert!(out.contains('\n'));
    }
}
