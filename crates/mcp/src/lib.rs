//! MCP (Model Context Protocol) server library.
//!
//! This crate provides the protocol half of an MCP server speaking
//! JSON-RPC 2.0 over stdio. Tool behavior is plugged in through the
//! [`ToolSet`] trait.
//!
//! # Example
//!
//! ```ignore
//! use mcp::StdioService;
//!
//! # async fn example(tools: impl mcp::ToolSet) -> mcp::Result<()> {
//! StdioService::new(tools).run().await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod protocol;
mod service;

pub use error::{Error, Result};
pub use protocol::{
    CallToolParams, CallToolResult, InitializeResult, JsonRpcError, JsonRpcMessage,
    JsonRpcResponse, ListToolsResult, PROTOCOL_VERSION, RequestId, ServerCapabilities, ServerInfo,
    Tool, ToolContent,
};
pub use service::{StdioService, ToolSet};
