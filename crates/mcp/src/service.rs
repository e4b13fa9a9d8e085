//! Stdio serve loop and the tool-set seam.

use std::future::Future;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use envelope::{Args, Outcome, ToolInfo, render};

use crate::error::Result;
use crate::protocol::{
    CallToolParams, CallToolResult, InitializeResult, JsonRpcError, JsonRpcMessage,
    JsonRpcResponse, ListToolsResult, PROTOCOL_VERSION, ServerCapabilities, ServerInfo, Tool,
    ToolsCapability,
};

/// A named collection of tools served over MCP.
///
/// This is the boundary between the protocol layer and side effects:
/// the service knows framing and methods, implementations know how to
/// reach GitHub or MongoDB.
pub trait ToolSet: Send + Sync {
    /// Server name advertised during initialization.
    fn name(&self) -> &'static str;

    /// Tool definitions for `tools/list`.
    fn tools(&self) -> Vec<Tool>;

    /// Name and static category of every tool (introspection).
    fn catalog(&self) -> Vec<ToolInfo>;

    /// Execute one tool call.
    ///
    /// Implementations validate arguments first and must return an
    /// error outcome rather than panic; the envelope string is
    /// produced by the service.
    fn call(&self, name: &str, args: Args) -> impl Future<Output = Outcome> + Send;
}

/// MCP server over stdin/stdout, one JSON-RPC message per line.
pub struct StdioService<T> {
    toolset: T,
    version: String,
}

impl<T: ToolSet> StdioService<T> {
    pub fn new(toolset: T) -> Self {
        Self {
            toolset,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Serve until stdin reaches EOF.
    pub async fn run(&self) -> Result<()> {
        let mut stdin = BufReader::new(tokio::io::stdin());
        let mut stdout = tokio::io::stdout();
        let mut line = String::new();

        info!(server = self.toolset.name(), "serving MCP on stdio");

        loop {
            line.clear();
            if stdin.read_line(&mut line).await? == 0 {
                break;
            }
            if line.trim().is_empty() {
                continue;
            }

            if let Some(response) = self.handle_line(&line).await {
                let json = serde_json::to_string(&response)?;
                stdout.write_all(json.as_bytes()).await?;
                stdout.write_all(b"\n").await?;
                stdout.flush().await?;
            }
        }

        info!(server = self.toolset.name(), "stdin closed, shutting down");
        Ok(())
    }

    /// Handle one raw line; `None` means no response (notification).
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let message: JsonRpcMessage = match serde_json::from_str(line) {
            Ok(m) => m,
            Err(e) => {
                warn!("unparseable message: {e}");
                return Some(JsonRpcResponse::error(
                    None,
                    JsonRpcError::parse_error(e.to_string()),
                ));
            }
        };
        self.handle_message(message).await
    }

    async fn handle_message(&self, message: JsonRpcMessage) -> Option<JsonRpcResponse> {
        let Some(id) = message.id else {
            // Notification: nothing to answer.
            debug!(method = %message.method, "notification");
            return None;
        };

        let response = match message.method.as_str() {
            "initialize" => JsonRpcResponse::result(id, self.initialize_result()),
            "ping" => JsonRpcResponse::result(id, serde_json::json!({})),
            "tools/list" => JsonRpcResponse::result(
                id,
                ListToolsResult {
                    tools: self.toolset.tools(),
                },
            ),
            "tools/call" => {
                let params: CallToolParams =
                    match serde_json::from_value(message.params.unwrap_or_default()) {
                        Ok(p) => p,
                        Err(e) => {
                            return Some(JsonRpcResponse::error(
                                Some(id),
                                JsonRpcError::invalid_params(e.to_string()),
                            ));
                        }
                    };
                debug!(tool = %params.name, "tool call");
                let outcome = self
                    .toolset
                    .call(&params.name, Args::new(params.arguments))
                    .await;
                let is_error = outcome.is_err();
                JsonRpcResponse::result(id, CallToolResult::text(render(outcome), is_error))
            }
            other => JsonRpcResponse::error(Some(id), JsonRpcError::method_not_found(other)),
        };

        Some(response)
    }

    fn initialize_result(&self) -> InitializeResult {
        InitializeResult {
            protocol_version: PROTOCOL_VERSION,
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
            },
            server_info: ServerInfo {
                name: self.toolset.name().to_string(),
                version: self.version.clone(),
            },
        }
    }
}
