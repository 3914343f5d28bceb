//! Common literal and parsing abstractions shared by the scanner, the
//! analysis session and the patch engine.

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::core::config::ExtractionConfig;
use crate::core::errors::Result;

/// Runtime type of a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiteralKind {
    /// Text string
    Str,
    /// Integer
    Int,
    /// Real number
    Float,
    /// Byte string
    Bytes,
}

impl LiteralKind {
    /// Short type tag used in logs and reports.
    pub fn as_str(self) -> &'static str {
        match self {
            LiteralKind::Str => "str",
            LiteralKind::Int => "int",
            LiteralKind::Float => "float",
            LiteralKind::Bytes => "bytes",
        }
    }
}

/// Semantic value of a literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "ValueRepr", try_from = "ValueRepr")]
pub enum LiteralValue {
    /// Text string
    Text(String),
    /// Integer
    Int(i64),
    /// Real number
    Real(f64),
    /// Byte string
    Bytes(Vec<u8>),
}

impl LiteralValue {
    /// Runtime type of this value.
    pub fn kind(&self) -> LiteralKind {
        match self {
            LiteralValue::Text(_) => LiteralKind::Str,
            LiteralValue::Int(_) => LiteralKind::Int,
            LiteralValue::Real(_) => LiteralKind::Float,
            LiteralValue::Bytes(_) => LiteralKind::Bytes,
        }
    }

    /// Identity key used to group occurrences. Integer `1` and real `1.0`
    /// produce distinct keys; `0.0` and `-0.0` share one.
    pub fn key(&self) -> ValueKey {
        match self {
            LiteralValue::Text(s) => ValueKey::Text(s.clone()),
            LiteralValue::Int(v) => ValueKey::Int(*v),
            LiteralValue::Real(v) => {
                let normalized = if *v == 0.0 { 0.0f64 } else { *v };
                ValueKey::Real(normalized.to_bits())
            }
            LiteralValue::Bytes(b) => ValueKey::Bytes(b.clone()),
        }
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Text(s) => write!(f, "{s:?}"),
            LiteralValue::Int(v) => write!(f, "{v}"),
            LiteralValue::Real(v) => write!(f, "{v:?}"),
            LiteralValue::Bytes(b) => write!(f, "b{:?}", String::from_utf8_lossy(b)),
        }
    }
}

/// Wire representation of [`LiteralValue`]: JSON string, integer, float, or
/// `{"bytes": "<base64>"}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum ValueRepr {
    Text(String),
    Int(i64),
    Real(f64),
    Bytes { bytes: String },
}

impl From<LiteralValue> for ValueRepr {
    fn from(value: LiteralValue) -> Self {
        match value {
            LiteralValue::Text(s) => ValueRepr::Text(s),
            LiteralValue::Int(v) => ValueRepr::Int(v),
            LiteralValue::Real(v) => ValueRepr::Real(v),
            LiteralValue::Bytes(b) => ValueRepr::Bytes {
                bytes: BASE64.encode(b),
            },
        }
    }
}

impl TryFrom<ValueRepr> for LiteralValue {
    type Error = String;

    fn try_from(repr: ValueRepr) -> std::result::Result<Self, Self::Error> {
        Ok(match repr {
            ValueRepr::Text(s) => LiteralValue::Text(s),
            ValueRepr::Int(v) => LiteralValue::Int(v),
            ValueRepr::Real(v) => LiteralValue::Real(v),
            ValueRepr::Bytes { bytes } => LiteralValue::Bytes(
                BASE64
                    .decode(bytes.as_bytes())
                    .map_err(|e| format!("invalid base64 byte literal: {e}"))?,
            ),
        })
    }
}

/// Hashable (type, value) identity of a literal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValueKey {
    /// Text string
    Text(String),
    /// Integer
    Int(i64),
    /// Real number, by bit pattern
    Real(u64),
    /// Byte string
    Bytes(Vec<u8>),
}

/// One occurrence of a literal, addressed by its exact source span.
///
/// Lines are 1-based, columns are 0-based UTF-8 byte offsets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    /// File containing the literal
    pub filepath: String,
    /// Start line (1-based)
    pub lineno: usize,
    /// Start column (0-based byte offset)
    pub col_offset: usize,
    /// End line (1-based)
    pub end_lineno: usize,
    /// End column (0-based byte offset, exclusive)
    pub end_col_offset: usize,
    /// Identifier this literal is the right-hand side of (`NAME = <literal>`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition_of: Option<String>,
    /// Literal is the pattern argument of a regular-expression call
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_regex_arg: bool,
}

impl Occurrence {
    /// Whether the span covers more than one line.
    pub fn is_multiline(&self) -> bool {
        self.end_lineno > self.lineno
    }
}

/// A literal discovered by a scanner, with its value.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveredLiteral {
    /// Semantic value
    pub value: LiteralValue,
    /// Location and context flags
    pub occurrence: Occurrence,
}

/// Result of scanning one source file.
#[derive(Debug, Clone, Default)]
pub struct ScannedFile {
    /// Scanned file
    pub path: PathBuf,
    /// Literals in discovery order
    pub literals: Vec<DiscoveredLiteral>,
    /// Identifiers bound at module level
    pub top_level_names: BTreeSet<String>,
    /// Subset of `top_level_names` bound by import statements
    pub imported_names: BTreeSet<String>,
}

/// A module-level `NAME = <expr>` binding found in a constants file.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantDefinition {
    /// Bound identifier
    pub name: String,
    /// Literal value when the right-hand side is a plain literal
    pub value: Option<LiteralValue>,
}

/// Structural queries the engine needs from a language front end.
///
/// Implementations own their parser state, hence `&mut self`.
pub trait SourceAnalyzer {
    /// Scan a source file for literal occurrences and top-level names.
    /// Fails when the source does not parse.
    fn scan_source(
        &mut self,
        source: &str,
        file_path: &str,
        config: &ExtractionConfig,
    ) -> Result<ScannedFile>;

    /// Module-level single-identifier bindings. Fails when the source does
    /// not parse.
    fn constant_definitions(&mut self, source: &str) -> Result<Vec<ConstantDefinition>>;

    /// 0-based line index where new imports and definitions belong: after
    /// the last top-level import, otherwise after a shebang and/or module
    /// docstring, otherwise 0.
    fn insertion_line(&mut self, source: &str) -> usize;
}
