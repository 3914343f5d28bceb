//! # Literalist: Magic Literal Extraction for Python Codebases
//!
//! Literalist finds literal values (text, integers, reals, byte strings) that
//! are repeated across a Python code base, gives each a symbolic name and
//! rewrites the occurrences to reference it, either as a constant local to
//! the single file that uses it or from a shared constants module.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        API Layer                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Core         │  Language    │  Analysis     │  Refactor    │
//! │               │              │               │              │
//! │ • Config      │ • Scanner    │ • Loader      │ • Buffer     │
//! │ • Errors      │ • Literals   │ • Session     │ • Patch      │
//! │ • Discovery   │ • Registry   │ • Naming      │ • Store      │
//! │ • File I/O    │              │ • Report      │ • Diff       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use literalist::{ExtractionConfig, LiteralistEngine, RefactorMode};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExtractionConfig::with_root("./src");
//!     let mut engine = LiteralistEngine::new(config)?;
//!
//!     let report = engine.analyze()?;
//!     let outcome = engine.refactor(&report, RefactorMode::Preview)?;
//!     print!("{}", outcome.diff);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Core configuration, errors and file handling
pub mod core {
    //! Configuration, error types and file system helpers.

    pub mod config;
    pub mod errors;
    pub mod file_discovery;
    pub mod file_utils;
}

// Language-specific literal scanning
pub mod lang;

// Grouping, naming and report handling
pub mod analysis {
    //! Literal deduplication, naming and the report model.

    pub mod loader;
    pub mod naming;
    pub mod report;
    pub mod session;
}

// Text patching
pub mod refactor;

// Public API and engine interface
pub mod api {
    //! High-level API and engine interface.

    pub mod engine;
}

// Re-export primary types for convenience
pub use analysis::report::{validate_report_value, Report, ReportEntry, Scope};
pub use analysis::session::SessionSummary;
pub use api::engine::LiteralistEngine;
pub use core::config::{ExtractionConfig, NamingStrategy};
pub use core::errors::{LiteralistError, Result, ResultExt};
pub use lang::common::{LiteralValue, Occurrence};
pub use refactor::{RefactorMode, RefactorOutcome};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
