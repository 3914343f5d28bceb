//! Factory utilities and metadata for language front ends.

use std::path::Path;
use tree_sitter::Language;

use crate::core::errors::{LiteralistError, Result};
use crate::lang::adapters::python::PythonScanner;
use crate::lang::common::SourceAnalyzer;

/// Metadata describing one of the built-in language front ends.
#[derive(Debug, Clone, Copy)]
pub struct LanguageInfo {
    /// Canonical short key (matches CLI/config usage, e.g. "py").
    pub key: &'static str,
    /// Human-friendly display name.
    pub name: &'static str,
    /// Supported file extensions (without leading dots).
    pub extensions: &'static [&'static str],
}

const REGISTERED_LANGUAGES: &[LanguageInfo] = &[LanguageInfo {
    key: "py",
    name: "Python",
    extensions: &["py"],
}];

/// Return the languages that are compiled into this build.
pub fn registered_languages() -> &'static [LanguageInfo] {
    REGISTERED_LANGUAGES
}

/// Identify the canonical language key for a file path.
pub fn language_key_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?;
    find_language_by_extension(ext).map(|info| info.key)
}

/// Create a source analyzer for a specific language key.
pub fn adapter_for_language(language: &str) -> Result<Box<dyn SourceAnalyzer>> {
    match normalize_language_key(language) {
        Some("py") => Ok(Box::new(PythonScanner::new()?)),
        _ => Err(LiteralistError::config(format!(
            "No source analyzer for language '{language}'"
        ))),
    }
}

/// Get tree-sitter language for a given language key
pub fn get_tree_sitter_language(language_key: &str) -> Result<Language> {
    match normalize_language_key(language_key) {
        Some("py") => Ok(tree_sitter_python::LANGUAGE.into()),
        _ => Err(LiteralistError::config(format!(
            "No tree-sitter grammar for: {language_key}"
        ))),
    }
}

/// Create a new parser for the given language
pub fn create_parser_for_language(language_key: &str) -> Result<tree_sitter::Parser> {
    let mut parser = tree_sitter::Parser::new();
    let tree_sitter_language = get_tree_sitter_language(language_key)?;
    parser.set_language(&tree_sitter_language).map_err(|e| {
        LiteralistError::parse(
            language_key,
            format!("Failed to set parser language: {e}"),
        )
    })?;
    Ok(parser)
}

fn find_language_by_extension(ext: &str) -> Option<&'static LanguageInfo> {
    let target = ext.trim_start_matches('.');
    registered_languages().iter().find(|info| {
        info.extensions
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(target))
    })
}

fn normalize_language_key(language: &str) -> Option<&'static str> {
    match language.to_ascii_lowercase().as_str() {
        "py" | "python" => Some("py"),
        _ => None,
    }
}
