//! Source file discovery.
//!
//! Walks the scan root in file-name order so discovery order (and with it
//! tie-breaking during naming) is deterministic across platforms.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::core::config::ExtractionConfig;
use crate::lang::registry::language_key_for_path;

/// Discover scannable source files under `config.root`.
///
/// Directories whose name appears in `excluded_dirs` are pruned (only path
/// components below the root are checked), and the shared constants store
/// is never returned.
pub fn discover_files(config: &ExtractionConfig) -> Vec<PathBuf> {
    let root = config.root.as_path();
    let store = config.constants_path();

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_excluded_dir(entry, root, config));

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable path during discovery: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if language_key_for_path(path).is_none() {
            continue;
        }
        if path == store.as_path() {
            debug!("Skipping constants store {}", path.display());
            continue;
        }
        files.push(path.to_path_buf());
    }

    info!("Discovered {} source files under {}", files.len(), root.display());
    files
}

fn is_excluded_dir(entry: &DirEntry, root: &Path, config: &ExtractionConfig) -> bool {
    if !entry.file_type().is_dir() || entry.depth() == 0 {
        return false;
    }
    let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
    relative.components().any(|component| {
        config
            .excluded_dirs
            .contains(component.as_os_str().to_string_lossy().as_ref())
    })
}
