//! Report model, JSON I/O and schema validation.
//!
//! A report maps each final constant name to its entry, in the order the
//! analysis session produced them.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::errors::{LiteralistError, Result};
use crate::lang::common::{LiteralValue, Occurrence};

/// Fields every report entry must carry.
pub const REQUIRED_FIELDS: &[&str] = &["value", "is_new", "scope", "occurrences"];

/// Where a constant is defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Defined in the single file that uses it
    Local,
    /// Defined in the shared constants store and imported by users
    Global,
}

impl Scope {
    /// Lowercase label used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Scope::Local => "local",
            Scope::Global => "global",
        }
    }
}

/// One constant decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    /// Literal value
    pub value: LiteralValue,
    /// Occurrences to rewrite
    pub occurrences: Vec<Occurrence>,
    /// Whether a definition must be written
    pub is_new: bool,
    /// File (or store) where the constant is, or will be, defined
    #[serde(default)]
    pub source_path: Option<String>,
    /// Local or global
    pub scope: Scope,
}

/// Name-ordered collection of report entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Report {
    entries: IndexMap<String, ReportEntry>,
}

impl Report {
    /// Empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry, keeping first-insertion order. Names must be unique.
    pub fn insert(&mut self, name: impl Into<String>, entry: ReportEntry) {
        let name = name.into();
        debug_assert!(!self.contains(&name), "duplicate report entry {name}");
        self.entries.insert(name, entry);
    }

    /// Entry by name.
    pub fn get(&self, name: &str) -> Option<&ReportEntry> {
        self.entries.get(name)
    }

    /// Whether a name is present.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Entries in report order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ReportEntry)> {
        self.entries.iter()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the report has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(Into::into)
    }

    /// Parse a report, failing with a `Report` error naming the first missing
    /// field when the schema is violated.
    pub fn from_json_str(input: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(input)?;
        Self::from_json_value(value)
    }

    /// Build a report from already-parsed JSON.
    pub fn from_json_value(value: Value) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(LiteralistError::report("Report root must be a JSON object"));
        };

        let mut report = Report::new();
        for (name, raw) in map {
            if let Some(field) = first_missing_field(&raw) {
                return Err(LiteralistError::report_missing(&name, field));
            }
            let entry: ReportEntry = serde_json::from_value(raw).map_err(|e| {
                LiteralistError::report(format!("Invalid entry '{name}': {e}"))
            })?;
            report.insert(name, entry);
        }
        Ok(report)
    }
}

fn first_missing_field(raw: &Value) -> Option<&'static str> {
    let Value::Object(props) = raw else {
        return Some("value");
    };
    if let Some(field) = REQUIRED_FIELDS.iter().find(|f| !props.contains_key(**f)) {
        return Some(field);
    }
    if props.get("scope").and_then(Value::as_str) == Some("global")
        && !props.contains_key("source_path")
    {
        return Some("source_path");
    }
    None
}

/// Check a JSON document against the report schema and return every problem
/// found, in document order. An empty list means the report is valid.
pub fn validate_report_value(value: &Value) -> Vec<String> {
    let Value::Object(map) = value else {
        return vec!["Report root must be a JSON object".to_string()];
    };

    let mut errors = Vec::new();
    for (name, props) in map {
        let Value::Object(props) = props else {
            errors.push(format!("Constant '{name}' is not an object"));
            continue;
        };
        for field in REQUIRED_FIELDS {
            if !props.contains_key(*field) {
                errors.push(format!("Constant '{name}' missing '{field}'"));
            }
        }
        if props.get("scope").and_then(Value::as_str) == Some("global")
            && !props.contains_key("source_path")
        {
            errors.push(format!("Constant '{name}' (global) missing 'source_path'"));
        }
    }
    errors
}
