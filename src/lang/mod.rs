//! Language-specific parsing and literal discovery modules.

pub mod common;
pub mod python_literal;
pub mod registry;

/// Tree-sitter front ends
pub mod adapters {
    pub mod python;
}

// Re-export common types and traits for easier access
pub use adapters::python::PythonScanner;
pub use common::{
    ConstantDefinition, DiscoveredLiteral, LiteralKind, LiteralValue, Occurrence, ScannedFile,
    SourceAnalyzer, ValueKey,
};
pub use python_literal::{decode_string_token, render_python_literal, StringToken};
pub use registry::{
    adapter_for_language, create_parser_for_language, get_tree_sitter_language,
    language_key_for_path,
};
