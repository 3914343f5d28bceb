//! Console output for the literalist CLI.
//!
//! Diffs, store previews and JSON reports go to stdout so they can be piped;
//! every status line goes to stderr.

use owo_colors::OwoColorize;
use std::io::{self, Write};

use literalist::{RefactorMode, RefactorOutcome, SessionSummary};

/// Maximum number of validation errors listed.
pub const MAX_LISTED_ERRORS: usize = 5;

/// Print the analysis counters.
pub fn print_summary(summary: &SessionSummary) {
    eprintln!(
        "{} {} files, {} occurrences, {} distinct values",
        "Scanned".bright_blue().bold(),
        summary.files,
        summary.occurrences,
        summary.distinct_values
    );
    eprintln!(
        "{} {} new, {} reused, {} below threshold",
        "Constants".bright_blue().bold(),
        summary.new_definitions,
        summary.reused,
        summary.below_threshold
    );
}

/// Print what a refactor run did or would do.
pub fn print_outcome(
    outcome: &RefactorOutcome,
    mode: RefactorMode,
    store_label: &str,
) -> io::Result<()> {
    match mode {
        RefactorMode::Preview => {
            let mut stdout = io::stdout().lock();
            if let Some(preview) = &outcome.store_preview {
                writeln!(stdout, "{preview}")?;
            }
            write!(stdout, "{}", outcome.diff)?;
            stdout.flush()?;
        }
        RefactorMode::Apply => {
            if outcome.store_appended > 0 {
                eprintln!(
                    "{} {} globals to {}",
                    "Appended".green().bold(),
                    outcome.store_appended,
                    store_label.cyan()
                );
            }
            for path in &outcome.changed_files {
                eprintln!("{} {}", "Refactored".green().bold(), path.display());
            }
        }
    }

    for failure in &outcome.failures {
        eprintln!(
            "{} {}: {}",
            "Skipped".yellow().bold(),
            failure.path.display(),
            failure.message
        );
    }
    if !outcome.has_changes() {
        eprintln!("{}", "Nothing to refactor".dimmed());
    }
    Ok(())
}

/// Print report validation problems.
pub fn print_validation_errors(errors: &[String]) {
    eprintln!(
        "{} {} errors:",
        "Validation failed with".red().bold(),
        errors.len()
    );
    for error in errors.iter().take(MAX_LISTED_ERRORS) {
        eprintln!("  - {error}");
    }
}
