//! macrotab Core
//!
//! Core types, error taxonomy and configuration shared by the header
//! resolver, the table generator and the CLI.

pub mod config;
pub mod error;
pub mod types;

pub use config::{Config, ToolchainConfig};
pub use error::{Error, Result};
pub use types::*;
