//! Configuration types and management for literalist.
//!
//! A single [`ExtractionConfig`] drives scanning, analysis and patching. It can
//! be loaded from YAML, layered with CLI overrides by the binary, and must pass
//! [`ExtractionConfig::validate`] before any file is scanned.

pub mod validation;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::{LiteralistError, Result};

pub use validation::{validate_non_empty, validate_positive_usize};

/// Directory names that are never scanned.
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    ".git",
    "__pycache__",
    "venv",
    "env",
    "node_modules",
    ".idea",
    ".vscode",
    "build",
    "dist",
    ".tox",
    ".eggs",
    "tests",
    "test",
    "docs",
];

/// Integers considered too trivial to extract.
pub const TRIVIAL_NUMBERS: &[i64] = &[0, 1, 2, -1];

/// Default file name of the shared constants store.
pub const DEFAULT_CONSTANTS_FILE: &str = "constants.py";

/// Default report file used by `validate`.
pub const DEFAULT_REPORT_FILE: &str = "literalist_report.json";

/// Strategy used to turn a literal value into a constant name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingStrategy {
    /// Derive the name from the literal's own characters
    #[default]
    Derived,
    /// Sequential `CONST_<n>` names
    Generic,
}

/// A single ignored number, either integral or real.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberLiteral {
    /// Integer entry
    Int(i64),
    /// Real entry
    Real(f64),
}

impl NumberLiteral {
    /// Parse a CLI token. Tokens containing `.` are reals, everything else
    /// must be an integer.
    pub fn parse_token(token: &str) -> Result<Self> {
        let trimmed = token.trim();
        if trimmed.contains('.') {
            trimmed.parse::<f64>().map(Self::Real).map_err(|e| {
                LiteralistError::config_field(
                    format!("cannot parse '{token}' as a number: {e}"),
                    "ignored_numbers",
                )
            })
        } else {
            trimmed.parse::<i64>().map(Self::Int).map_err(|e| {
                LiteralistError::config_field(
                    format!("cannot parse '{token}' as a number: {e}"),
                    "ignored_numbers",
                )
            })
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Self::Int(v) => v as f64,
            Self::Real(v) => v,
        }
    }
}

/// Set of numbers that are never reported. Membership is by numeric value,
/// so an entry `1` also matches the real `1.0` and vice versa.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IgnoredNumbers {
    entries: Vec<NumberLiteral>,
}

impl Default for IgnoredNumbers {
    fn default() -> Self {
        Self {
            entries: TRIVIAL_NUMBERS.iter().copied().map(NumberLiteral::Int).collect(),
        }
    }
}

impl IgnoredNumbers {
    /// An empty set (nothing ignored).
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add a number to the set.
    pub fn insert(&mut self, number: NumberLiteral) {
        if !self.matches(number.as_f64()) {
            self.entries.push(number);
        }
    }

    /// Remove every entry numerically equal to `number`.
    pub fn remove(&mut self, number: NumberLiteral) {
        let target = number.as_f64();
        self.entries.retain(|entry| entry.as_f64() != target);
    }

    /// Apply `--ignore-num` then `--include-num` tokens.
    pub fn apply_tokens(&mut self, ignore: &[String], include: &[String]) -> Result<()> {
        for token in ignore {
            self.insert(NumberLiteral::parse_token(token)?);
        }
        for token in include {
            self.remove(NumberLiteral::parse_token(token)?);
        }
        Ok(())
    }

    /// Whether an integer literal is ignored.
    pub fn contains_int(&self, value: i64) -> bool {
        self.entries.iter().any(|entry| match entry {
            NumberLiteral::Int(v) => *v == value,
            NumberLiteral::Real(v) => *v == value as f64,
        })
    }

    /// Whether a real literal is ignored.
    pub fn contains_real(&self, value: f64) -> bool {
        self.matches(value)
    }

    fn matches(&self, value: f64) -> bool {
        self.entries.iter().any(|entry| entry.as_f64() == value)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is ignored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Configuration for one extraction run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Directory to scan and refactor
    pub root: PathBuf,

    /// File name (relative to `root`) of the shared constants store
    pub constants_file: String,

    /// Minimum length of text and byte literals
    pub min_length: usize,

    /// Minimum number of occurrences before a value becomes a constant
    pub min_count: usize,

    /// Allow constants used by a single file to stay local to that file
    pub use_local_scope: bool,

    /// Scan integer literals
    pub scan_ints: bool,

    /// Scan real literals
    pub scan_floats: bool,

    /// Scan byte-string literals
    pub scan_bytes: bool,

    /// Dotted call names whose arguments are never scanned
    pub ignored_calls: BTreeSet<String>,

    /// Directory names skipped during discovery
    pub excluded_dirs: BTreeSet<String>,

    /// Numbers that are never extracted
    pub ignored_numbers: IgnoredNumbers,

    /// Text values that are never extracted
    pub ignored_strings: BTreeSet<String>,

    /// Naming strategy
    pub naming: NamingStrategy,

    /// Additional files holding pre-existing constant definitions
    pub extra_constants: Vec<PathBuf>,

    /// Report file consumed by `validate`
    pub report_file: PathBuf,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            constants_file: DEFAULT_CONSTANTS_FILE.to_string(),
            min_length: 4,
            min_count: 2,
            use_local_scope: true,
            scan_ints: true,
            scan_floats: true,
            scan_bytes: true,
            ignored_calls: BTreeSet::new(),
            excluded_dirs: DEFAULT_EXCLUDED_DIRS.iter().map(|d| d.to_string()).collect(),
            ignored_numbers: IgnoredNumbers::default(),
            ignored_strings: BTreeSet::new(),
            naming: NamingStrategy::Derived,
            extra_constants: Vec::new(),
            report_file: PathBuf::from(DEFAULT_REPORT_FILE),
        }
    }
}

impl ExtractionConfig {
    /// Default configuration rooted at `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| {
            LiteralistError::io(format!("Failed to read config file: {}", path.display()), e)
        })?;

        serde_yaml::from_str(&content).map_err(Into::into)
    }

    /// Save configuration to a YAML file
    pub fn to_yaml_file(&self, path: impl Into<PathBuf>) -> Result<()> {
        let path = path.into();
        let content = serde_yaml::to_string(self)?;
        std::fs::write(&path, content).map_err(|e| {
            LiteralistError::io(
                format!("Failed to write config file: {}", path.display()),
                e,
            )
        })
    }

    /// Absolute-or-relative path of the shared constants store.
    pub fn constants_path(&self) -> PathBuf {
        self.root.join(&self.constants_file)
    }

    /// Whether `path` is the shared constants store.
    pub fn is_constants_path(&self, path: &Path) -> bool {
        path == self.constants_path()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<()> {
        validate_positive_usize(self.min_length, "min_length")?;
        validate_positive_usize(self.min_count, "min_count")?;
        validate_non_empty(&self.constants_file, "constants_file")?;
        if !self.constants_file.ends_with(".py") {
            return Err(LiteralistError::config_field(
                format!(
                    "constants_file must be a Python module, got '{}'",
                    self.constants_file
                ),
                "constants_file",
            ));
        }
        Ok(())
    }
}
