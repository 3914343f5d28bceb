//! File utilities for safe and robust file operations.
//!
//! Source files are rewritten in place, so reads are strict UTF-8 (a lossy
//! conversion would silently corrupt the file on write) and writes go through
//! a sibling temporary file followed by a rename.

use std::fs::{self, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::errors::{Result, ResultExt};

/// Strict UTF-8 file reading
pub struct FileReader;

impl FileReader {
    /// Read a file to string. Non-UTF-8 content is an error.
    pub fn read_to_string(file_path: &Path) -> Result<String> {
        fs::read_to_string(file_path)
            .with_context(|| format!("Failed to read {}", file_path.display()))
    }

    /// Whether the file exists and has at least one byte.
    pub fn is_non_empty(file_path: &Path) -> bool {
        fs::metadata(file_path)
            .map(|meta| meta.is_file() && meta.len() > 0)
            .unwrap_or(false)
    }

    /// Whether the last byte of a non-empty file is `\n`. Returns `Ok(true)`
    /// for missing or empty files, which need no corrective newline.
    pub fn ends_with_newline(file_path: &Path) -> Result<bool> {
        if !Self::is_non_empty(file_path) {
            return Ok(true);
        }
        let mut file = fs::File::open(file_path)
            .with_context(|| format!("Failed to open {}", file_path.display()))?;
        let mut last = [0u8; 1];
        file.seek(SeekFrom::End(-1))
            .and_then(|_| file.read_exact(&mut last))
            .with_context(|| format!("Failed to read {}", file_path.display()))?;
        Ok(last[0] == b'\n')
    }
}

/// All-or-nothing file writing
pub struct FileWriter;

impl FileWriter {
    /// Replace a file's content. The new content is written to a sibling
    /// temporary file first and renamed over the target.
    pub fn write_atomic(file_path: &Path, content: &str) -> Result<()> {
        let temp_path = Self::temp_path(file_path);
        let write_result = fs::write(&temp_path, content)
            .and_then(|_| fs::rename(&temp_path, file_path));
        if write_result.is_err() {
            let _ = fs::remove_file(&temp_path);
        }
        write_result.with_context(|| format!("Failed to write {}", file_path.display()))?;
        debug!("Wrote {} bytes to {}", content.len(), file_path.display());
        Ok(())
    }

    /// Append text to a file, creating it if needed.
    pub fn append(file_path: &Path, content: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path)
            .with_context(|| format!("Failed to open {}", file_path.display()))?;
        file.write_all(content.as_bytes())
            .with_context(|| format!("Failed to append to {}", file_path.display()))
    }

    fn temp_path(file_path: &Path) -> PathBuf {
        let mut name = file_path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".literalist.tmp");
        file_path.with_file_name(name)
    }
}
