//! Shared constants store: the module new global constants are appended to.

use std::path::Path;

use tracing::info;

use crate::core::errors::Result;
use crate::core::file_utils::{FileReader, FileWriter};

/// First line written to a store that did not exist or was empty.
pub const STORE_HEADER: &str = "# Generated by literalist";

/// Text block holding `definitions`, with the header when the store has no
/// content yet.
pub fn render_block(definitions: &[String], needs_header: bool) -> String {
    let mut block = String::new();
    if needs_header {
        block.push_str(STORE_HEADER);
        block.push_str("\n\n");
    }
    for definition in definitions {
        block.push_str(definition);
        block.push('\n');
    }
    block
}

/// Preview of what [`append_definitions`] would write.
pub fn preview(store: &Path, label: &str, definitions: &[String]) -> Option<String> {
    if definitions.is_empty() {
        return None;
    }
    let block = render_block(definitions, !FileReader::is_non_empty(store));
    Some(format!("--- PREVIEW: Append to {label} ---\n{block}"))
}

/// Append `definitions` to the store, adding a newline first when the
/// existing content does not end with one. Returns the number appended.
pub fn append_definitions(store: &Path, definitions: &[String]) -> Result<usize> {
    if definitions.is_empty() {
        return Ok(0);
    }
    let needs_header = !FileReader::is_non_empty(store);
    let mut text = String::new();
    if !FileReader::ends_with_newline(store)? {
        text.push('\n');
    }
    text.push_str(&render_block(definitions, needs_header));
    FileWriter::append(store, &text)?;
    info!("Appended {} globals to {}", definitions.len(), store.display());
    Ok(definitions.len())
}
