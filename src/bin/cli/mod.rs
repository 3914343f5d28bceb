//! CLI Module Organization
//!
//! This module organizes the CLI functionality into cohesive sub-modules:
//! - args: CLI argument structures
//! - commands: Command execution logic
//! - config_layer: Defaults, config file and flag layering
//! - output: Console output for diffs, previews and status lines

pub mod args;
pub mod commands;
pub mod config_layer;
pub mod output;

// Re-export commonly used items for convenience
pub use args::*;
pub use commands::*;
