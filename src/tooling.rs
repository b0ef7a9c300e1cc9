//! Tooling & Integration Layer
//!
//! Command-line front end and terminal rendering.

pub mod cli;
pub mod format;

pub use cli::{CacheCommands, Cli, CliContext, Commands, OutputFormat};
pub use format::TextRenderer;
