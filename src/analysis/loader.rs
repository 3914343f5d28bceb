//! Index of constants that already exist before a run.
//!
//! Auxiliary constant files are read first and the shared store last, so a
//! value bound in both resolves to the store's name.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::core::file_utils::FileReader;
use crate::lang::common::{LiteralValue, SourceAnalyzer, ValueKey};

/// A value already bound to a name in a constants file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingConstant {
    /// Bound identifier
    pub name: String,
    /// Defining file
    pub source: PathBuf,
}

/// Reverse index from value to existing constant, plus every name bound in
/// the loaded files.
#[derive(Debug, Clone, Default)]
pub struct ConstantIndex {
    by_value: HashMap<ValueKey, ExistingConstant>,
    bound_keys: HashMap<String, ValueKey>,
    reserved: BTreeSet<String>,
}

impl ConstantIndex {
    /// Load the auxiliary files and the shared store. Missing, unreadable or
    /// unparseable files are skipped.
    pub fn load(analyzer: &mut dyn SourceAnalyzer, store: &Path, extra: &[PathBuf]) -> Self {
        let mut index = Self::default();
        for path in extra.iter().map(PathBuf::as_path).chain(std::iter::once(store)) {
            if !path.is_file() {
                debug!("No constants file at {}", path.display());
                continue;
            }
            match FileReader::read_to_string(path) {
                Ok(source) => index.ingest(analyzer, path, &source),
                Err(e) => warn!("Skipping constants file {}: {}", path.display(), e),
            }
        }
        debug!(
            "Loaded {} existing constants, {} reserved names",
            index.by_value.len(),
            index.reserved.len()
        );
        index
    }

    /// Record the bindings of one constants file.
    pub fn ingest(&mut self, analyzer: &mut dyn SourceAnalyzer, path: &Path, source: &str) {
        let definitions = match analyzer.constant_definitions(source) {
            Ok(definitions) => definitions,
            Err(e) => {
                warn!("Skipping constants file {}: {}", path.display(), e);
                return;
            }
        };
        for definition in definitions {
            self.bind(definition.name, definition.value.as_ref(), path);
        }
    }

    /// Record `name = value` from `source`. A later binding of the same name
    /// replaces the earlier one.
    pub fn bind(&mut self, name: String, value: Option<&LiteralValue>, source: &Path) {
        if let Some(previous) = self.bound_keys.remove(&name) {
            if self.by_value.get(&previous).is_some_and(|c| c.name == name) {
                self.by_value.remove(&previous);
            }
        }
        self.reserved.insert(name.clone());
        if let Some(value) = value {
            let key = value.key();
            self.bound_keys.insert(name.clone(), key.clone());
            self.by_value.insert(
                key,
                ExistingConstant {
                    name,
                    source: source.to_path_buf(),
                },
            );
        }
    }

    /// Existing constant bound to `value`, if any.
    pub fn lookup(&self, value: &LiteralValue) -> Option<&ExistingConstant> {
        self.by_value.get(&value.key())
    }

    /// Every identifier bound at top level in the loaded files.
    pub fn reserved_names(&self) -> &BTreeSet<String> {
        &self.reserved
    }

    /// Number of indexed values.
    pub fn len(&self) -> usize {
        self.by_value.len()
    }

    /// Whether no value is indexed.
    pub fn is_empty(&self) -> bool {
        self.by_value.is_empty()
    }
}
