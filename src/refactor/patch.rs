//! Per-file edit plans and their application to a [`LineBuffer`].

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use crate::refactor::buffer::{LineBuffer, Span};

/// One occurrence to rewrite as a reference to `name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    /// Text to replace
    pub span: Span,
    /// Constant that replaces it
    pub name: String,
    /// Identifier the literal is the whole right-hand side of, if any
    pub definition_of: Option<String>,
}

impl Replacement {
    /// Rewriting `NAME = <literal>` to `NAME = NAME` would be a no-op at
    /// best and a self-reference at worst.
    pub fn is_self_definition(&self) -> bool {
        self.definition_of.as_deref() == Some(self.name.as_str())
    }
}

/// Everything that has to change in one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilePlan {
    /// Occurrence rewrites, in any order
    pub replacements: Vec<Replacement>,
    /// Global names to import, keyed by defining module
    pub imports: BTreeMap<String, BTreeSet<String>>,
    /// `NAME = <literal>` lines for new local constants, in report order
    pub local_definitions: Vec<String>,
}

impl FilePlan {
    /// Aggregated import statements, one per module, names sorted.
    pub fn import_statements(&self) -> Vec<(String, &BTreeSet<String>)> {
        self.imports
            .iter()
            .filter(|(_, names)| !names.is_empty())
            .map(|(module, names)| {
                let joined = names.iter().map(String::as_str).collect::<Vec<_>>().join(", ");
                (format!("from {module} import {joined}"), names)
            })
            .collect()
    }
}

/// Counters for one applied plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatchStats {
    /// Occurrences rewritten
    pub replaced: usize,
    /// Occurrences left alone because they define their own constant
    pub self_definitions: usize,
    /// Occurrences whose span did not fit the file
    pub invalid_spans: usize,
    /// Import statements inserted
    pub imports_added: usize,
    /// Redundant definitions removed after a promotion
    pub definitions_removed: usize,
    /// Local definitions inserted
    pub locals_added: usize,
}

impl PatchStats {
    /// Whether the plan modified the buffer.
    pub fn changed(&self) -> bool {
        self.replaced + self.imports_added + self.definitions_removed + self.locals_added > 0
    }
}

/// Apply `plan` to `original`. `insertion_line` is the slot index computed
/// from the original content where imports and local definitions go.
/// Returns the new content, or `None` when nothing changed.
pub fn apply_plan(
    original: &str,
    plan: &FilePlan,
    insertion_line: usize,
) -> (Option<String>, PatchStats) {
    let mut buffer = LineBuffer::from_text(original);
    let mut stats = PatchStats::default();

    // Last span first, so earlier coordinates stay valid.
    let mut replacements: Vec<&Replacement> = plan.replacements.iter().collect();
    replacements.sort_by(|a, b| b.span.cmp(&a.span));
    for replacement in replacements {
        if replacement.is_self_definition() {
            stats.self_definitions += 1;
            continue;
        }
        match buffer.replace_span(replacement.span, &replacement.name) {
            Ok(()) => stats.replaced += 1,
            Err(e) => {
                warn!("Skipping replacement with {}: {}", replacement.name, e);
                stats.invalid_spans += 1;
            }
        }
    }

    let mut inserted = Vec::new();
    let mut newly_imported = BTreeSet::new();
    for (statement, names) in plan.import_statements() {
        if buffer.contains_line(&statement) {
            debug!("Import already present: {}", statement);
            continue;
        }
        newly_imported.extend(names.iter().cloned());
        inserted.push(statement);
    }
    stats.imports_added = inserted.len();

    if !newly_imported.is_empty() {
        stats.definitions_removed = buffer.remove_assignments(&newly_imported);
    }

    stats.locals_added = plan.local_definitions.len();
    inserted.extend(plan.local_definitions.iter().cloned());
    if !inserted.is_empty() {
        buffer.insert_lines(insertion_line, &inserted);
    }

    if stats.changed() {
        (Some(buffer.render()), stats)
    } else {
        (None, stats)
    }
}
