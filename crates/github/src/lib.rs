//! GitHub tool set: REST client, response projections, and dispatch.
//!
//! Wraps the GitHub REST v3 API as MCP tools. Read operations work
//! anonymously (subject to rate limits); write operations and the
//! `my_*` tools require `GITHUB_TOKEN`.

mod client;
mod config;
mod project;
mod router;
mod tool;

pub use client::GitHubClient;
pub use config::GitHubConfig;
pub use router::{GithubRouter, catalog};
pub use tool::GitHubTool;
