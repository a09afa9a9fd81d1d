//! File system storage management
//!
//! Handles the sidecar index, path validation and the directory operations
//! built on top of them.

pub mod entry;
pub mod filesystem;
pub mod identifier;
pub mod index;
pub mod locks;
pub mod operations;
pub mod results;
pub mod validation;

// Re-export commonly used types
pub use entry::{Entry, EntryKind, SortKey};
pub use index::{IndexStore, JsonSidecar, SIDECAR_FILE_NAME};
pub use operations::FileStore;
pub use results::{DownloadTarget, FolderOutcome};
