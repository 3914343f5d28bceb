//! Error types for the literalist library.
//!
//! Only conditions that must stop a run are represented here. Recoverable
//! problems (a file that fails to parse, a file that cannot be read while
//! patching) are logged and recorded in the run outcome instead of being
//! returned as errors.

use std::io;

use thiserror::Error;

/// Main result type for literalist operations.
pub type Result<T> = std::result::Result<T, LiteralistError>;

/// Error type for all fatal literalist conditions.
#[derive(Error, Debug)]
pub enum LiteralistError {
    /// I/O related errors (reading config files, writing the constants store)
    #[error("I/O error: {message}")]
    Io {
        /// Human-readable error message
        message: String,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Invalid configuration, detected before any scanning occurs
    #[error("Invalid configuration: {message}")]
    Config {
        /// Error description
        message: String,
        /// Configuration field that caused the error
        field: Option<String>,
    },

    /// Parsing and language processing errors
    #[error("Parse error in {language}: {message}")]
    Parse {
        /// Programming language being parsed
        language: String,
        /// Error description
        message: String,
        /// File path where error occurred
        file_path: Option<String>,
        /// Line number (if available)
        line: Option<usize>,
        /// Column number (if available)
        column: Option<usize>,
    },

    /// A report handed to the patch engine is missing required data
    #[error("Malformed report: {message}")]
    Report {
        /// Error description
        message: String,
        /// Report field that was missing or invalid
        field: Option<String>,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error description
        message: String,
        /// Data type being serialized
        data_type: Option<String>,
        /// Underlying serialization error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Validation errors for input data
    #[error("Validation error: {message}")]
    Validation {
        /// Error description
        message: String,
        /// Field or input that failed validation
        field: Option<String>,
    },
}

impl LiteralistError {
    /// Create a new I/O error with context
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            field: None,
        }
    }

    /// Create a new configuration error with field context
    pub fn config_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a new parse error
    pub fn parse(language: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            language: language.into(),
            message: message.into(),
            file_path: None,
            line: None,
            column: None,
        }
    }

    /// Create a new parse error with file context
    pub fn parse_with_location(
        language: impl Into<String>,
        message: impl Into<String>,
        file_path: impl Into<String>,
        line: Option<usize>,
        column: Option<usize>,
    ) -> Self {
        Self::Parse {
            language: language.into(),
            message: message.into(),
            file_path: Some(file_path.into()),
            line,
            column,
        }
    }

    /// Create a malformed-report error
    pub fn report(message: impl Into<String>) -> Self {
        Self::Report {
            message: message.into(),
            field: None,
        }
    }

    /// Create a malformed-report error naming the missing field
    pub fn report_missing(entry: &str, field: impl Into<String>) -> Self {
        let field = field.into();
        Self::Report {
            message: format!("Missing key '{field}' in entry '{entry}'"),
            field: Some(field),
        }
    }

    /// Create a new validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: None,
        }
    }

    /// Whether this error belongs to the fatal configuration/data category
    /// rather than an environmental failure.
    pub fn is_fatal_input(&self) -> bool {
        matches!(self, Self::Config { .. } | Self::Report { .. })
    }

    /// Add context to an existing error. I/O errors take the context as
    /// their message; other errors get it as a prefix.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        let context = context.into();
        match &mut self {
            Self::Io { message, .. } => *message = context,
            Self::Config { message, .. }
            | Self::Parse { message, .. }
            | Self::Report { message, .. }
            | Self::Serialization { message, .. }
            | Self::Validation { message, .. } => *message = format!("{context}: {message}"),
        }
        self
    }
}

impl From<io::Error> for LiteralistError {
    fn from(err: io::Error) -> Self {
        Self::io("I/O operation failed", err)
    }
}

impl From<serde_json::Error> for LiteralistError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: format!("JSON serialization failed: {err}"),
            data_type: Some("JSON".to_string()),
            source: Some(Box::new(err)),
        }
    }
}

impl From<serde_yaml::Error> for LiteralistError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization {
            message: format!("YAML serialization failed: {err}"),
            data_type: Some("YAML".to_string()),
            source: Some(Box::new(err)),
        }
    }
}

/// Result extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;

    /// Add static context to an error result
    fn context(self, msg: &'static str) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<LiteralistError>,
{
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.into().with_context(f()))
    }

    fn context(self, msg: &'static str) -> Result<T> {
        self.map_err(|e| e.into().with_context(msg))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = LiteralistError::config("min_count must be greater than 0");
        assert!(matches!(err, LiteralistError::Config { .. }));

        let err = LiteralistError::parse("python", "Syntax error");
        assert!(matches!(err, LiteralistError::Parse { .. }));
    }

    #[test]
    fn test_report_missing_names_field() {
        let err = LiteralistError::report_missing("CONST_FOO", "value");
        let display = err.to_string();
        assert!(display.contains("Malformed report"));
        assert!(display.contains("'value'"));

        if let LiteralistError::Report { field, .. } = err {
            assert_eq!(field.as_deref(), Some("value"));
        } else {
            panic!("Expected Report error");
        }
    }

    #[test]
    fn test_fatal_input_category() {
        assert!(LiteralistError::config("bad").is_fatal_input());
        assert!(LiteralistError::report("bad").is_fatal_input());
        assert!(!LiteralistError::validation("bad").is_fatal_input());
        assert!(!LiteralistError::parse("python", "bad").is_fatal_input());
    }

    #[test]
    fn test_io_context_becomes_message() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "Access denied");
        let result: std::result::Result<(), std::io::Error> = Err(io_err);
        let err = result
            .with_context(|| "Writing constants.py".to_string())
            .unwrap_err();

        if let LiteralistError::Io { message, source } = &err {
            assert_eq!(message, "Writing constants.py");
            assert_eq!(source.kind(), std::io::ErrorKind::PermissionDenied);
        } else {
            panic!("Expected Io error");
        }
    }

    #[test]
    fn test_context_prefixes_other_errors() {
        let err = LiteralistError::report("bad entry").with_context("Loading report.json");
        assert_eq!(err.to_string(), "Malformed report: Loading report.json: bad entry");
        assert!(err.is_fatal_input());
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<i32>("invalid json").unwrap_err();
        let err: LiteralistError = json_err.into();

        if let LiteralistError::Serialization { data_type, .. } = err {
            assert_eq!(data_type, Some("JSON".to_string()));
        } else {
            panic!("Expected Serialization error");
        }
    }

    #[test]
    fn test_parse_with_location_display() {
        let err = LiteralistError::parse_with_location(
            "python",
            "Syntax error",
            "broken.py",
            Some(10),
            Some(5),
        );
        let display = format!("{}", err);
        assert!(display.contains("Parse error in python"));
        assert!(display.contains("Syntax error"));
    }
}
