//! Error types for macrotab

use thiserror::Error;

/// macrotab error type
#[derive(Error, Debug)]
pub enum Error {
    /// The toolchain could not locate the header under the given flags
    #[error("Header not found: <{header}>: {detail}")]
    HeaderNotFound { header: String, detail: String },

    /// The compiler (or pkg-config) could not be invoked at all
    #[error("Toolchain unavailable: {0}")]
    ToolchainUnavailable(String),

    /// A dependency rule was produced but lacks the expected absolute paths
    #[error("Malformed dependency output: {0}")]
    MalformedDependencyOutput(String),

    /// No literal macro matched the required prefix
    #[error("No entries extracted for prefix '{prefix}' from {source_name}")]
    NoEntriesExtracted { prefix: String, source_name: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid macro pattern: {0}")]
    Pattern(String),
}

/// Result type alias for macrotab
pub type Result<T> = std::result::Result<T, Error>;
