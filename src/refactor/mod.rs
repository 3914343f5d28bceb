//! Patch engine: turns a report into file edits.
//!
//! Every file is rewritten in memory from its original text before anything
//! is written, so a file is either left untouched or fully replaced. The
//! shared store is appended once per run, before any source file changes.

pub mod buffer;
pub mod patch;
pub mod store;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use similar::TextDiff;
use tracing::{debug, info, warn};

use crate::analysis::report::{Report, Scope};
use crate::core::config::ExtractionConfig;
use crate::core::errors::Result;
use crate::core::file_utils::{FileReader, FileWriter};
use crate::lang::common::SourceAnalyzer;
use crate::lang::python_literal::render_python_literal;

pub use buffer::{LineBuffer, Span};
pub use patch::{apply_plan, FilePlan, PatchStats, Replacement};

/// Whether edits are written or only described.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RefactorMode {
    /// Write changed files and append to the store
    Apply,
    /// Produce a unified diff and a store preview
    Preview,
}

/// A file whose edits were dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    /// File that could not be read or written
    pub path: PathBuf,
    /// What went wrong
    pub message: String,
}

/// Result of running the patch engine over a report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefactorOutcome {
    /// Files that changed (or would change in preview mode)
    pub changed_files: Vec<PathBuf>,
    /// Unified diff of every changed file (preview mode)
    pub diff: String,
    /// Text that would be appended to the store (preview mode)
    pub store_preview: Option<String>,
    /// Definitions appended to the store (apply mode)
    pub store_appended: usize,
    /// Files skipped because of I/O failures
    pub failures: Vec<FileFailure>,
}

impl RefactorOutcome {
    /// Whether the run would change or did change anything.
    pub fn has_changes(&self) -> bool {
        !self.changed_files.is_empty() || self.store_preview.is_some() || self.store_appended > 0
    }
}

/// Edit plans for every file a report touches, plus the new store
/// definitions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefactorPlan {
    /// Per-file plans keyed by path
    pub files: BTreeMap<PathBuf, FilePlan>,
    /// `NAME = <literal>` lines for new global constants, in report order
    pub store_definitions: Vec<String>,
}

impl RefactorPlan {
    /// Group a report's entries by the files they affect.
    pub fn from_report(report: &Report, root: &Path) -> Self {
        let mut plan = Self::default();
        for (name, entry) in report.iter() {
            let definition = format!("{name} = {}", render_python_literal(&entry.value));
            let defining_file = entry
                .source_path
                .clone()
                .or_else(|| entry.occurrences.first().map(|o| o.filepath.clone()));

            if entry.is_new {
                match (entry.scope, &defining_file) {
                    (Scope::Global, _) => plan.store_definitions.push(definition),
                    (Scope::Local, Some(file)) => plan
                        .files
                        .entry(PathBuf::from(file))
                        .or_default()
                        .local_definitions
                        .push(definition),
                    (Scope::Local, None) => {
                        warn!("Local constant {} has no defining file; skipping", name)
                    }
                }
            }

            let module = match (entry.scope, &defining_file) {
                (Scope::Global, Some(source)) => Some(module_path(Path::new(source), root)),
                _ => None,
            };
            for occurrence in &entry.occurrences {
                let path = PathBuf::from(&occurrence.filepath);
                let file_plan = plan.files.entry(path.clone()).or_default();
                file_plan.replacements.push(Replacement {
                    span: Span::from(occurrence),
                    name: name.clone(),
                    definition_of: occurrence.definition_of.clone(),
                });
                let defines_here = defining_file
                    .as_deref()
                    .is_some_and(|source| Path::new(source) == path);
                if let (Some(module), false) = (&module, defines_here) {
                    file_plan
                        .imports
                        .entry(module.clone())
                        .or_default()
                        .insert(name.clone());
                }
            }
        }
        plan
    }
}

/// Dotted module path of `source` relative to `root`. Paths outside `root`
/// fall back to the file stem.
pub fn module_path(source: &Path, root: &Path) -> String {
    let Ok(relative) = source.strip_prefix(root) else {
        return source
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
    };
    let mut parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if let Some(last) = parts.last_mut() {
        if let Some(stem) = last.strip_suffix(".py") {
            *last = stem.to_string();
        }
    }
    parts.join(".")
}

/// Path shown in diff headers.
fn display_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

/// Unified diff with `a/` and `b/` headers.
pub fn unified_diff(original: &str, updated: &str, relative: &str) -> String {
    let old_header = format!("a/{relative}");
    let new_header = format!("b/{relative}");
    let diff = TextDiff::from_lines(original, updated);
    diff.unified_diff()
        .context_radius(3)
        .header(&old_header, &new_header)
        .to_string()
}

/// Run the patch engine over `report`.
pub fn process_report(
    config: &ExtractionConfig,
    analyzer: &mut dyn SourceAnalyzer,
    report: &Report,
    mode: RefactorMode,
) -> Result<RefactorOutcome> {
    let plan = RefactorPlan::from_report(report, &config.root);
    let store = config.constants_path();
    let mut outcome = RefactorOutcome::default();

    match mode {
        RefactorMode::Apply => {
            outcome.store_appended = store::append_definitions(&store, &plan.store_definitions)?;
        }
        RefactorMode::Preview => {
            outcome.store_preview =
                store::preview(&store, &config.constants_file, &plan.store_definitions);
        }
    }

    for (path, file_plan) in &plan.files {
        let original = match FileReader::read_to_string(path) {
            Ok(original) => original,
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                outcome.failures.push(FileFailure {
                    path: path.clone(),
                    message: e.to_string(),
                });
                continue;
            }
        };

        let insertion_line = analyzer.insertion_line(&original);
        let (updated, stats) = apply_plan(&original, file_plan, insertion_line);
        let Some(updated) = updated else {
            debug!("No change for {}", path.display());
            continue;
        };
        debug!("Planned edits for {}: {:?}", path.display(), stats);

        match mode {
            RefactorMode::Apply => {
                if let Err(e) = FileWriter::write_atomic(path, &updated) {
                    warn!("Failed to write {}: {}", path.display(), e);
                    outcome.failures.push(FileFailure {
                        path: path.clone(),
                        message: e.to_string(),
                    });
                    continue;
                }
                info!("Refactored {}", path.display());
            }
            RefactorMode::Preview => {
                let relative = display_path(path, &config.root);
                outcome.diff.push_str(&unified_diff(&original, &updated, &relative));
            }
        }
        outcome.changed_files.push(path.clone());
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::report::ReportEntry;
    use crate::lang::common::{LiteralValue, Occurrence};

    fn occurrence(file: &str, line: usize, start: usize, end: usize) -> Occurrence {
        Occurrence {
            filepath: file.to_string(),
            lineno: line,
            col_offset: start,
            end_lineno: line,
            end_col_offset: end,
            definition_of: None,
            is_regex_arg: false,
        }
    }

    #[test]
    fn test_module_path() {
        let root = Path::new("/proj");
        assert_eq!(module_path(Path::new("/proj/constants.py"), root), "constants");
        assert_eq!(module_path(Path::new("/proj/pkg/shared.py"), root), "pkg.shared");
        assert_eq!(module_path(Path::new("/elsewhere/settings.py"), root), "settings");
    }

    #[test]
    fn test_plan_routes_definitions_and_imports() {
        let mut report = Report::new();
        report.insert(
            "SHARED",
            ReportEntry {
                value: LiteralValue::Text("shared".into()),
                occurrences: vec![
                    occurrence("/proj/a.py", 1, 4, 12),
                    occurrence("/proj/b.py", 2, 4, 12),
                ],
                is_new: true,
                source_path: Some("/proj/constants.py".into()),
                scope: Scope::Global,
            },
        );
        report.insert(
            "LOCAL_ONLY",
            ReportEntry {
                value: LiteralValue::Int(86400),
                occurrences: vec![occurrence("/proj/a.py", 3, 4, 9)],
                is_new: true,
                source_path: Some("/proj/a.py".into()),
                scope: Scope::Local,
            },
        );

        let plan = RefactorPlan::from_report(&report, Path::new("/proj"));
        assert_eq!(plan.store_definitions, vec!["SHARED = 'shared'".to_string()]);

        let a = &plan.files[Path::new("/proj/a.py")];
        assert_eq!(a.replacements.len(), 2);
        assert_eq!(a.local_definitions, vec!["LOCAL_ONLY = 86400".to_string()]);
        assert!(a.imports["constants"].contains("SHARED"));
        assert!(!a.imports["constants"].contains("LOCAL_ONLY"));

        let b = &plan.files[Path::new("/proj/b.py")];
        assert!(b.local_definitions.is_empty());
        assert_eq!(b.imports.len(), 1);
    }

    #[test]
    fn test_plan_never_imports_into_defining_file() {
        let mut report = Report::new();
        report.insert(
            "TIMEOUT",
            ReportEntry {
                value: LiteralValue::Int(30),
                occurrences: vec![
                    occurrence("/proj/settings.py", 1, 10, 12),
                    occurrence("/proj/a.py", 1, 4, 6),
                ],
                is_new: false,
                source_path: Some("/proj/settings.py".into()),
                scope: Scope::Global,
            },
        );
        let plan = RefactorPlan::from_report(&report, Path::new("/proj"));
        assert!(plan.store_definitions.is_empty());
        assert!(plan.files[Path::new("/proj/settings.py")].imports.is_empty());
        assert!(plan.files[Path::new("/proj/a.py")].imports["settings"].contains("TIMEOUT"));
    }

    #[test]
    fn test_unified_diff_headers() {
        let diff = unified_diff("x = 'token'\n", "x = TOKEN\n", "pkg/mod.py");
        assert!(diff.starts_with("--- a/pkg/mod.py\n+++ b/pkg/mod.py\n"));
        assert!(diff.contains("-x = 'token'\n"));
        assert!(diff.contains("+x = TOKEN\n"));
    }
}
