//! Deduplication and naming session.
//!
//! One session covers one run. It groups scanned occurrences by value
//! identity, applies the occurrence threshold, reconciles values against
//! existing constants and assigns every remaining group a name and scope.
//! All naming state lives on the session so independent runs never share
//! counters.

use std::collections::{BTreeSet, HashMap, HashSet};

use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::analysis::loader::ConstantIndex;
use crate::analysis::naming::{determine_type_hint, generate_name};
use crate::analysis::report::{Report, ReportEntry, Scope};
use crate::core::config::ExtractionConfig;
use crate::lang::common::{LiteralValue, Occurrence, ScannedFile, ValueKey};

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;

/// Occurrences sharing one value identity.
#[derive(Debug, Clone)]
struct LiteralGroup {
    value: LiteralValue,
    occurrences: Vec<Occurrence>,
}

/// Name, scope and definition status chosen for a new group.
#[derive(Debug, Clone, PartialEq, Eq)]
struct NamingDecision {
    name: String,
    scope: Scope,
    source_path: String,
    is_new: bool,
}

/// Top-level identifiers of one scanned file.
#[derive(Debug, Clone, Default)]
struct FileBindings {
    all: BTreeSet<String>,
    imported: BTreeSet<String>,
}

/// Counters describing one finished session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Files that contributed occurrences
    pub files: usize,
    /// Literal occurrences collected
    pub occurrences: usize,
    /// Distinct values seen
    pub distinct_values: usize,
    /// Groups dropped by the occurrence threshold
    pub below_threshold: usize,
    /// Entries reusing an existing constant
    pub reused: usize,
    /// Entries introducing a new definition
    pub new_definitions: usize,
}

/// State carried across one analysis run.
pub struct ExtractionSession {
    config: ExtractionConfig,
    existing: ConstantIndex,
    global_reserved: BTreeSet<String>,
    file_names: HashMap<String, FileBindings>,
    groups: IndexMap<ValueKey, LiteralGroup>,
    claimed: HashSet<String>,
    suffix_counters: HashMap<String, usize>,
    next_index: usize,
    summary: SessionSummary,
}

impl ExtractionSession {
    /// Start a session against the constants already known to `existing`.
    pub fn new(config: ExtractionConfig, existing: ConstantIndex) -> Self {
        let global_reserved = existing.reserved_names().clone();
        Self {
            config,
            existing,
            global_reserved,
            file_names: HashMap::new(),
            groups: IndexMap::new(),
            claimed: HashSet::new(),
            suffix_counters: HashMap::new(),
            next_index: 1,
            summary: SessionSummary::default(),
        }
    }

    /// Add the result of scanning one file. Files must be added in discovery
    /// order, which breaks ties between equally frequent values.
    pub fn add_file(&mut self, scanned: ScannedFile) {
        let file_key = scanned.path.to_string_lossy().into_owned();
        let bindings = self.file_names.entry(file_key).or_default();
        bindings.all.extend(scanned.top_level_names);
        bindings.imported.extend(scanned.imported_names);

        self.summary.files += 1;
        self.summary.occurrences += scanned.literals.len();
        for literal in scanned.literals {
            self.groups
                .entry(literal.value.key())
                .or_insert_with(|| LiteralGroup {
                    value: literal.value,
                    occurrences: Vec::new(),
                })
                .occurrences
                .push(literal.occurrence);
        }
    }

    /// Decide every group and produce the report.
    pub fn finish(mut self) -> (Report, SessionSummary) {
        let mut groups: Vec<LiteralGroup> =
            std::mem::take(&mut self.groups).into_values().collect();
        self.summary.distinct_values = groups.len();
        // Stable sort keeps discovery order among equally frequent values.
        groups.sort_by(|a, b| b.occurrences.len().cmp(&a.occurrences.len()));

        let mut report = Report::new();
        for group in groups {
            if group.occurrences.len() < self.config.min_count {
                self.summary.below_threshold += 1;
                continue;
            }
            if let Some((name, entry)) = self.process_group(group) {
                if entry.is_new {
                    self.summary.new_definitions += 1;
                } else {
                    self.summary.reused += 1;
                }
                report.insert(name, entry);
            }
        }

        info!(
            "Analysis produced {} constants ({} new, {} reused) from {} occurrences in {} files",
            report.len(),
            self.summary.new_definitions,
            self.summary.reused,
            self.summary.occurrences,
            self.summary.files
        );
        (report, self.summary)
    }

    fn process_group(&mut self, group: LiteralGroup) -> Option<(String, ReportEntry)> {
        if let Some(existing) = self.existing.lookup(&group.value).cloned() {
            let occurrences = self.drop_shadowing_occurrences(&existing.name, group.occurrences);
            if occurrences.is_empty() {
                return None;
            }
            self.claimed.insert(existing.name.clone());
            debug!("Reusing existing constant {} for {}", existing.name, group.value);
            return Some((
                existing.name,
                ReportEntry {
                    value: group.value,
                    occurrences,
                    is_new: false,
                    source_path: Some(existing.source.to_string_lossy().into_owned()),
                    scope: Scope::Global,
                },
            ));
        }

        let decision = self.decide(&group.value, &group.occurrences);
        debug!(
            "Assigned {} ({}, new: {}) to {}",
            decision.name,
            decision.scope.as_str(),
            decision.is_new,
            group.value
        );
        Some((
            decision.name,
            ReportEntry {
                value: group.value,
                occurrences: group.occurrences,
                is_new: decision.is_new,
                source_path: Some(decision.source_path),
                scope: decision.scope,
            },
        ))
    }

    /// An existing constant cannot be renamed, so occurrences in files that
    /// bind the same identifier to something else are left untouched.
    fn drop_shadowing_occurrences(
        &self,
        name: &str,
        occurrences: Vec<Occurrence>,
    ) -> Vec<Occurrence> {
        let defining_files: HashSet<&str> = occurrences
            .iter()
            .filter(|o| o.definition_of.as_deref() == Some(name))
            .map(|o| o.filepath.as_str())
            .collect();
        let conflicting: HashSet<String> = occurrences
            .iter()
            .map(|o| o.filepath.as_str())
            .filter(|file| !defining_files.contains(file))
            .filter(|file| {
                self.file_names.get(*file).is_some_and(|bindings| {
                    bindings.all.contains(name) && !bindings.imported.contains(name)
                })
            })
            .map(str::to_string)
            .collect();

        if conflicting.is_empty() {
            return occurrences;
        }
        for file in &conflicting {
            warn!("{} already binds {}; leaving its literals in place", file, name);
        }
        occurrences
            .into_iter()
            .filter(|o| !conflicting.contains(&o.filepath))
            .collect()
    }

    fn decide(&mut self, value: &LiteralValue, occurrences: &[Occurrence]) -> NamingDecision {
        let files: BTreeSet<&str> = occurrences.iter().map(|o| o.filepath.as_str()).collect();
        let is_regex = occurrences.iter().any(|o| o.is_regex_arg);
        let hint = determine_type_hint(value, is_regex);
        let base = generate_name(value, self.config.naming, self.next_index, hint);
        let existing_defs: HashSet<&str> = occurrences
            .iter()
            .filter_map(|o| o.definition_of.as_deref())
            .collect();

        let global = !self.config.use_local_scope || files.len() > 1;
        // Reserved in scope: names bound in the store plus names bound at top
        // level in every file that will define or import the constant.
        let mut reserved = self.global_reserved.clone();
        for file in &files {
            if let Some(bindings) = self.file_names.get(*file) {
                reserved.extend(bindings.all.iter().cloned());
            }
        }
        let (scope, source_path) = match files.iter().next() {
            Some(file) if !global => (Scope::Local, (*file).to_string()),
            _ => (
                Scope::Global,
                self.config.constants_path().to_string_lossy().into_owned(),
            ),
        };
        if self.may_adopt_definition(&base, occurrences) {
            reserved.remove(&base);
        }

        let name = self.resolve_collision(&base, &reserved);
        let is_new = !(scope == Scope::Local && existing_defs.contains(name.as_str()));

        self.claimed.insert(name.clone());
        if is_new {
            self.next_index += 1;
        }
        NamingDecision {
            name,
            scope,
            source_path,
            is_new,
        }
    }

    /// Whether `name` may be taken although it is already bound: some
    /// occurrence is the literal of `name = <value>`, and no file touched by
    /// the group binds `name` any other way. Names bound in the store or the
    /// extra constants files are never adopted, whatever the scope, since an
    /// existing constant may claim them later in the run.
    fn may_adopt_definition(&self, name: &str, occurrences: &[Occurrence]) -> bool {
        let defining_files: HashSet<&str> = occurrences
            .iter()
            .filter(|o| o.definition_of.as_deref() == Some(name))
            .map(|o| o.filepath.as_str())
            .collect();
        if defining_files.is_empty() {
            return false;
        }
        if self.global_reserved.contains(name) {
            return false;
        }
        occurrences
            .iter()
            .map(|o| o.filepath.as_str())
            .filter(|file| !defining_files.contains(file))
            .all(|file| {
                self.file_names
                    .get(file)
                    .map_or(true, |bindings| !bindings.all.contains(name))
            })
    }

    /// First free name among `base`, `base_2`, `base_3`, ... A name is free
    /// when no earlier group claimed it and it is not reserved in scope.
    fn resolve_collision(&mut self, base: &str, reserved: &BTreeSet<String>) -> String {
        let is_free = |claimed: &HashSet<String>, name: &str| {
            !claimed.contains(name) && !reserved.contains(name)
        };
        if is_free(&self.claimed, base) {
            return base.to_string();
        }
        let counter = self.suffix_counters.entry(base.to_string()).or_insert(1);
        loop {
            *counter += 1;
            let candidate = format!("{base}_{counter}");
            if is_free(&self.claimed, &candidate) {
                return candidate;
            }
        }
    }
}
