//! Naming heuristics: literal value to candidate constant identifier.
//!
//! Pure functions. The derived strategy normalizes the literal's own
//! characters; the generic strategy returns sequential `CONST_<n>` names.
//! Degenerate inputs fall back to the reserved `STR_EMPTY` / `STR_CONST_<n>`
//! family, which derived names never produce.

use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};

use crate::core::config::NamingStrategy;
use crate::lang::common::LiteralValue;
use crate::lang::python_literal::python_float_repr;

/// Maximum identifier length before truncation.
pub const MAX_NAME_LEN: usize = 50;

/// Names shorter than this fall back to `STR_CONST_<n>`.
pub const MIN_NAME_LEN: usize = 3;

const TRUNCATION_MARKER: &str = "_ETC";

static CAMEL_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(.)([A-Z][a-z]+)").expect("valid camel-case pattern"));
static CAMEL_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-z0-9])([A-Z])").expect("valid camel-case pattern"));
static NON_ALNUM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-zA-Z0-9]+").expect("valid separator pattern"));
static FALLBACK_FAMILY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(STR_EMPTY|STR_CONST_[0-9]+|CONST_[0-9]+)$").expect("valid fallback pattern")
});

/// How a text literal is used, inferred from its content or call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeHint {
    /// Pattern argument of a regular-expression call
    Regex,
    /// SQL statement
    Sql,
    /// http(s) address
    Url,
    /// Filesystem path
    Path,
}

impl TypeHint {
    fn suffix(self) -> &'static str {
        match self {
            TypeHint::Regex => "_RE",
            TypeHint::Sql => "_SQL",
            TypeHint::Url => "_URL",
            TypeHint::Path => "_PATH",
        }
    }
}

/// Infer the usage hint of a value. Only text values carry hints.
pub fn determine_type_hint(value: &LiteralValue, is_regex_arg: bool) -> Option<TypeHint> {
    let LiteralValue::Text(text) = value else {
        return None;
    };
    if is_regex_arg {
        return Some(TypeHint::Regex);
    }

    let trimmed = text.trim();
    let upper = trimmed.to_uppercase();
    if ["SELECT ", "INSERT ", "UPDATE ", "DELETE ", "CREATE "]
        .iter()
        .any(|kw| upper.starts_with(kw))
    {
        return Some(TypeHint::Sql);
    }
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        return Some(TypeHint::Url);
    }
    if trimmed.starts_with('/') || trimmed.starts_with("./") || trimmed.starts_with("../") {
        return Some(TypeHint::Path);
    }
    None
}

/// Candidate identifier for a value. `index` is the run's sequential counter.
pub fn generate_name(
    value: &LiteralValue,
    strategy: NamingStrategy,
    index: usize,
    hint: Option<TypeHint>,
) -> String {
    if strategy == NamingStrategy::Generic {
        return format!("CONST_{index}");
    }
    match value {
        LiteralValue::Text(text) => name_from_text(text, index, hint),
        LiteralValue::Int(v) => format!("INT_{}", v.to_string().replace('-', "NEG_")),
        LiteralValue::Real(v) => format!(
            "FLOAT_{}",
            python_float_repr(*v)
                .replace('.', "_")
                .replace('-', "NEG_")
                .replace('+', "_")
        ),
        LiteralValue::Bytes(bytes) => name_from_bytes(bytes),
    }
}

/// Insert underscores at camel-case boundaries (`FieldState` -> `Field_State`).
pub fn split_camel_case(text: &str) -> String {
    let first = CAMEL_WORD.replace_all(text, "${1}_${2}");
    CAMEL_BOUNDARY.replace_all(&first, "${1}_${2}").into_owned()
}

fn clean_identifier(text: &str) -> String {
    NON_ALNUM
        .replace_all(text, "_")
        .trim_matches('_')
        .to_ascii_uppercase()
}

fn name_from_text(text: &str, index: usize, hint: Option<TypeHint>) -> String {
    if text.is_empty() {
        return "STR_EMPTY".to_string();
    }

    let mut name = clean_identifier(&split_camel_case(text));
    if name.is_empty() {
        return format!("STR_CONST_{index}");
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        name = format!("STR_{name}");
    }
    if FALLBACK_FAMILY.is_match(&name) {
        name.push_str("_STR");
    }
    if let Some(hint) = hint {
        if !name.ends_with(hint.suffix()) {
            name.push_str(hint.suffix());
        }
    }

    if name.len() > MAX_NAME_LEN {
        name.truncate(MAX_NAME_LEN - TRUNCATION_MARKER.len());
        name.push_str(TRUNCATION_MARKER);
    }
    if name.len() < MIN_NAME_LEN {
        return format!("STR_CONST_{index}");
    }
    name
}

fn name_from_bytes(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        return "BYTES_EMPTY".to_string();
    }
    if bytes.iter().all(|b| (0x20..=0x7e).contains(b)) {
        let text = String::from_utf8_lossy(bytes);
        let clean = clean_identifier(&text);
        if !clean.is_empty() {
            let mut name = format!("BYTES_{clean}");
            name.truncate(MAX_NAME_LEN);
            return name;
        }
    }
    let digest = Sha256::digest(bytes);
    let hex: String = digest.iter().take(4).map(|b| format!("{b:02X}")).collect();
    format!("BYTES_{hex}")
}

/// Whether `name` is a valid Python identifier made of ASCII characters.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
