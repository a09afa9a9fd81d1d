//! Stored-bytes aggregation

use std::path::Path;
use walkdir::WalkDir;

use crate::error::UsageError;

/// Sum of every regular file's size under `root`, sidecar artifacts included.
pub fn total_stored_bytes(root: &Path) -> Result<u64, UsageError> {
    let mut total = 0u64;
    for entry in WalkDir::new(root) {
        let entry = entry?;
        if entry.file_type().is_file() {
            total += entry.metadata()?.len();
        }
    }
    Ok(total)
}
