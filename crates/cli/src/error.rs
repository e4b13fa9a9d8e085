//! CLI error types.

use thiserror::Error;

/// Top-level errors for the `stevedore` binary.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A tool set could not be constructed at startup.
    #[error("startup error: {0}")]
    Startup(#[from] envelope::ToolError),

    /// The stdio serve loop failed.
    #[error(transparent)]
    Serve(#[from] mcp::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
