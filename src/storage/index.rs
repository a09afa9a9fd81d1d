//! Sidecar index
//!
//! Each physical directory carries a JSON artifact listing the entries the
//! client sees in it. The artifact, not the directory listing, is the source
//! of truth for what a directory contains.

use log::warn;
use std::fs;
use std::io;
use std::path::Path;

use crate::error::IndexReadError;
use crate::storage::entry::Entry;
use crate::storage::filesystem::write_atomic;

/// File name of the sidecar artifact inside every indexed directory
pub const SIDECAR_FILE_NAME: &str = "meta.json";

/// Per-directory entry storage.
///
/// Implementations only need `read` and `save`; `load` layers the tolerant-read
/// policy on top.
pub trait IndexStore: Send + Sync {
    /// Reads the raw index for `dir`, reporting why nothing usable was found.
    fn read(&self, dir: &Path) -> Result<Vec<Entry>, IndexReadError>;

    /// Replaces the index for `dir` with `entries`.
    fn save(&self, dir: &Path, entries: &[Entry]) -> io::Result<()>;

    /// Name inside each directory that the store reserves for itself, if any.
    fn reserved_name(&self) -> Option<&str> {
        None
    }

    /// Reads the index for `dir`, treating every read failure as an empty index.
    fn load(&self, dir: &Path) -> Vec<Entry> {
        match self.read(dir) {
            Ok(entries) => entries,
            Err(IndexReadError::Missing) | Err(IndexReadError::Empty) => Vec::new(),
            Err(e) => {
                warn!("Treating index of {} as empty: {}", dir.display(), e);
                Vec::new()
            }
        }
    }
}

/// JSON array persisted as `meta.json` next to the content it describes
#[derive(Debug, Clone, Default)]
pub struct JsonSidecar;

impl IndexStore for JsonSidecar {
    fn read(&self, dir: &Path) -> Result<Vec<Entry>, IndexReadError> {
        let content = match fs::read_to_string(dir.join(SIDECAR_FILE_NAME)) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(IndexReadError::Missing),
            Err(e) => return Err(IndexReadError::Io(e)),
        };

        if content.trim().is_empty() {
            return Err(IndexReadError::Empty);
        }

        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, dir: &Path, entries: &[Entry]) -> io::Result<()> {
        let json = serde_json::to_vec_pretty(entries)?;
        write_atomic(&dir.join(SIDECAR_FILE_NAME), &json)
    }

    fn reserved_name(&self) -> Option<&str> {
        Some(SIDECAR_FILE_NAME)
    }
}
