//! Storage result types
//!
//! Defines result structures returned by directory operations.

use std::path::PathBuf;

use crate::storage::entry::Entry;

/// Outcome of a folder creation
#[derive(Debug, Clone, PartialEq)]
pub enum FolderOutcome {
    /// A new folder entry was appended to the parent index
    Created(Entry),
    /// The parent index already listed a folder with this name
    AlreadyIndexed,
}

impl FolderOutcome {
    pub fn is_created(&self) -> bool {
        matches!(self, FolderOutcome::Created(_))
    }
}

/// Result of a download preparation
#[derive(Debug, Clone)]
pub struct DownloadTarget {
    pub file_path: PathBuf,
    pub display_name: String,
}
