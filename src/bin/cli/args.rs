//! CLI Argument Structures
//!
//! This module contains all CLI argument definitions and command structures
//! used by the literalist binary. Options shared by every mode are global,
//! so they are accepted before or after a subcommand.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use literalist::NamingStrategy;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Find repeated magic literals and refactor them into named constants
#[derive(Parser, Debug)]
#[command(name = "literalist")]
#[command(version = VERSION)]
#[command(about = "Literalist - find and refactor magic literals in Python code")]
#[command(long_about = "
Find repeated literal values in a Python code base and refactor them into
named constants, local to the file that uses them or shared from a
constants module.

Direct mode (no command) scans the path and previews the changes as a
unified diff. Add --apply to modify the files in place:

  literalist --path src/
  literalist --path src/ --apply

Pipeline mode splits the same work into steps:

  literalist report --path src/ > report.json
  literalist validate --report-file report.json
  literalist refactor --path src/ --apply < report.json
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub options: ScanArgs,

    /// Modify files instead of printing a diff
    #[arg(long, global = true)]
    pub apply: bool,

    /// Enable verbose logging for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Analyze and print the JSON report on stdout
    Report,

    /// Validate a report file against the report schema
    Validate,

    /// Read a JSON report from stdin and preview or apply it
    Refactor,
}

/// Options that shape scanning, naming and patching.
#[derive(Args, Debug, Clone, Default)]
pub struct ScanArgs {
    /// Path to scan and refactor [default: .]
    #[arg(long, global = true)]
    pub path: Option<PathBuf>,

    /// Shared constants module, relative to the scan path [default: constants.py]
    #[arg(long, global = true)]
    pub constants_file: Option<String>,

    /// Minimum length of text and byte literals [default: 4]
    #[arg(long, global = true)]
    pub min_length: Option<usize>,

    /// Minimum occurrences before a value is extracted [default: 2]
    #[arg(long, global = true)]
    pub min_count: Option<usize>,

    /// Force every constant into the shared module
    #[arg(long, global = true)]
    pub no_local_scope: bool,

    /// Report file read by `validate` [default: literalist_report.json]
    #[arg(long, global = true)]
    pub report_file: Option<PathBuf>,

    /// Ignore literals inside calls to this dotted name (repeatable)
    #[arg(long = "ignore-call", global = true, help_heading = "Filtering & Exclusion")]
    pub ignore_calls: Vec<String>,

    /// Exclude directories with this name (repeatable)
    #[arg(long = "exclude", global = true, help_heading = "Filtering & Exclusion")]
    pub excludes: Vec<String>,

    /// Ignore this number (repeatable)
    #[arg(
        long = "ignore-num",
        global = true,
        allow_hyphen_values = true,
        help_heading = "Filtering & Exclusion"
    )]
    pub ignore_nums: Vec<String>,

    /// Stop ignoring this number (repeatable)
    #[arg(
        long = "include-num",
        global = true,
        allow_hyphen_values = true,
        help_heading = "Filtering & Exclusion"
    )]
    pub include_nums: Vec<String>,

    /// Ignore this exact string (repeatable)
    #[arg(long = "ignore-str", global = true, help_heading = "Filtering & Exclusion")]
    pub ignore_strs: Vec<String>,

    /// Do not scan numbers
    #[arg(long, global = true, help_heading = "Type Selection")]
    pub no_numbers: bool,

    /// Do not scan integers
    #[arg(long, global = true, help_heading = "Type Selection")]
    pub no_ints: bool,

    /// Do not scan floats
    #[arg(long, global = true, help_heading = "Type Selection")]
    pub no_floats: bool,

    /// Do not scan byte strings
    #[arg(long, global = true, help_heading = "Type Selection")]
    pub no_bytes: bool,

    /// Naming strategy
    #[arg(long, global = true, value_enum)]
    pub naming: Option<NamingArg>,

    /// Additional module with existing constants (repeatable)
    #[arg(long = "extra-constants", global = true)]
    pub extra_constants: Vec<PathBuf>,

    /// Configuration file [default: .literalist.yml if present]
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

/// Naming strategy as accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NamingArg {
    /// Names derived from the literal itself
    Derived,
    /// Sequential CONST_<n> names
    Generic,
}

impl From<NamingArg> for NamingStrategy {
    fn from(arg: NamingArg) -> Self {
        match arg {
            NamingArg::Derived => NamingStrategy::Derived,
            NamingArg::Generic => NamingStrategy::Generic,
        }
    }
}
