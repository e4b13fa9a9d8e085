//! Authenticated GitHub REST client.

use std::time::Duration;

use envelope::{ErrorKind, ToolError};
use reqwest::Method;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use serde_json::{Value, json};
use tracing::debug;

const BASE_URL: &str = "https://api.github.com";
const ACCEPT_HEADER: &str = "application/vnd.github.v3+json";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Long-lived HTTP handle, created once at startup and shared
/// read-only across calls.
#[derive(Debug)]
pub struct GitHubClient {
    http: reqwest::Client,
    has_token: bool,
}

impl GitHubClient {
    pub fn new(token: Option<&str>) -> Result<Self, ToolError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HEADER));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("stevedore-github/", env!("CARGO_PKG_VERSION"))),
        );
        if let Some(token) = token {
            let value = HeaderValue::from_str(&format!("token {token}"))
                .map_err(|_| ToolError::invalid("GITHUB_TOKEN contains invalid characters"))?;
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .default_headers(headers)
            .build()
            .map_err(|e| {
                ToolError::new(ErrorKind::Transport, format!("failed to build client: {e}"))
            })?;

        Ok(Self {
            http,
            has_token: token.is_some(),
        })
    }

    /// Whether an Authorization header is configured.
    pub fn has_token(&self) -> bool {
        self.has_token
    }

    /// Authenticated operations short-circuit here before any network
    /// call when no token is configured.
    pub fn require_token(&self, purpose: &str) -> Result<(), ToolError> {
        if self.has_token {
            Ok(())
        } else {
            Err(ToolError::new(
                ErrorKind::AuthRequired,
                format!("GitHub token required {purpose}"),
            ))
        }
    }

    pub async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value, ToolError> {
        self.send(Method::GET, path, query, None).await
    }

    pub async fn post(&self, path: &str, body: Value) -> Result<Value, ToolError> {
        self.send(Method::POST, path, &[], Some(body)).await
    }

    pub async fn patch(&self, path: &str, body: Value) -> Result<Value, ToolError> {
        self.send(Method::PATCH, path, &[], Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value, ToolError> {
        self.send(Method::DELETE, path, &[], None).await
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> Result<Value, ToolError> {
        let url = format!("{}/{}", BASE_URL, path.trim_start_matches('/'));
        debug!(%method, %url, "GitHub request");

        let mut request = self.http.request(method, &url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(transport_error)?;
        interpret(response).await
    }
}

/// Map upstream status codes to error kinds; parse 2xx bodies.
async fn interpret(response: reqwest::Response) -> Result<Value, ToolError> {
    let status = response.status();
    match status.as_u16() {
        401 => Err(ToolError::new(
            ErrorKind::AuthFailed,
            "Authentication failed. Please check your GitHub token.",
        )),
        403 => Err(ToolError::new(
            ErrorKind::Forbidden,
            "Access forbidden. Check repository permissions or rate limits.",
        )),
        404 => Err(ToolError::new(
            ErrorKind::NotFound,
            "Resource not found. Check repository name and permissions.",
        )),
        code if !status.is_success() => {
            let text = response.text().await.unwrap_or_default();
            Err(ToolError::new(
                ErrorKind::Upstream,
                format!("GitHub API error: {code} - {text}"),
            ))
        }
        _ => {
            let bytes = response.bytes().await.map_err(transport_error)?;
            if bytes.is_empty() {
                // 204 on deletes and similar.
                Ok(json!({"success": true}))
            } else {
                serde_json::from_slice(&bytes).map_err(|e| {
                    ToolError::new(
                        ErrorKind::Upstream,
                        format!("GitHub API returned invalid JSON: {e}"),
                    )
                })
            }
        }
    }
}

fn transport_error(e: reqwest::Error) -> ToolError {
    ToolError::new(ErrorKind::Transport, format!("Request failed: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_tracks_token_presence() {
        let anon = GitHubClient::new(None).unwrap();
        assert!(!anon.has_token());
        assert!(anon.require_token("for creating issues").is_err());

        let auth = GitHubClient::new(Some("ghp_test")).unwrap();
        assert!(auth.has_token());
        assert!(auth.require_token("for creating issues").is_ok());
    }

    #[test]
    fn require_token_error_is_auth_required() {
        let anon = GitHubClient::new(None).unwrap();
        let err = anon.require_token("for creating issues").unwrap_err();
        assert_eq!(err.kind, ErrorKind::AuthRequired);
        assert_eq!(err.message, "GitHub token required for creating issues");
    }

    #[test]
    fn invalid_token_characters_rejected() {
        let err = GitHubClient::new(Some("bad\ntoken")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
    }
}
