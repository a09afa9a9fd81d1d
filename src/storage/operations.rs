//! Storage operations
//!
//! Directory operations for the file store: ingest, folder creation, list,
//! rename, delete, move and download preparation. Each one loads the sidecar
//! index of the directory it touches, performs the physical action, saves the
//! index and records an audit entry.

use log::{error, info, warn};
use parking_lot::{RwLockReadGuard, RwLockWriteGuard};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::audit::{AuditAction, AuditLog};
use crate::error::StoreError;
use crate::storage::entry::{Entry, SortKey, filter_by_name, sort_entries};
use crate::storage::filesystem::{
    create_directory, directory_exists, file_exists, move_path, remove_path, write_atomic,
};
use crate::storage::identifier::generate_stored_id;
use crate::storage::index::IndexStore;
use crate::storage::locks::{DirectoryLocks, TreeLocks};
use crate::storage::results::{DownloadTarget, FolderOutcome};
use crate::storage::validation::{
    normalize_relative_path, resolve_directory, validate_display_name, validate_folder_name,
};

/// Metadata-backed view over the physical category directories
pub struct FileStore {
    root: PathBuf,
    categories: Vec<String>,
    index: Arc<dyn IndexStore>,
    audit: Arc<AuditLog>,
    trees: TreeLocks,
    locks: DirectoryLocks,
}

impl FileStore {
    pub fn new(
        root: PathBuf,
        categories: Vec<String>,
        index: Arc<dyn IndexStore>,
        audit: Arc<AuditLog>,
    ) -> Self {
        Self {
            trees: TreeLocks::new(&categories),
            root,
            categories,
            index,
            audit,
            locks: DirectoryLocks::new(),
        }
    }

    /// Ensures the store root and every category directory exist
    pub fn init_layout(&self) -> Result<(), StoreError> {
        for category in &self.categories {
            create_directory(&self.root.join(category))?;
        }
        info!(
            "Store root {} with categories {:?}",
            self.root.display(),
            self.categories
        );
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn audit(&self) -> &Arc<AuditLog> {
        &self.audit
    }

    /// Physical directory for `category` + `relative_path`
    pub fn resolve(&self, category: &str, relative_path: &str) -> Result<PathBuf, StoreError> {
        resolve_directory(
            &self.root,
            &self.categories,
            category,
            relative_path,
            self.index.reserved_name(),
        )
    }

    /// Stores `content` under a fresh stored id and indexes it as `original_name`.
    pub fn ingest(
        &self,
        actor: &str,
        category: &str,
        relative_path: &str,
        original_name: &str,
        content: &[u8],
    ) -> Result<Entry, StoreError> {
        validate_display_name(original_name)?;
        let (dir, rel) = self.locate(category, relative_path)?;
        let _tree = self.shared_tree(category)?;

        create_directory(&dir)?;
        let stored_id = generate_stored_id(original_name);
        let file_path = dir.join(&stored_id);
        write_atomic(&file_path, content).map_err(|e| {
            error!("Failed to store {} at {}: {}", original_name, file_path.display(), e);
            e
        })?;

        let entry = Entry::file(stored_id, original_name);
        {
            let _guard = self.locks.acquire(&dir);
            let mut entries = self.index.load(&dir);
            entries.push(entry.clone());
            if let Err(e) = self.index.save(&dir, &entries) {
                error!("Failed to index {} in {}: {}", original_name, dir.display(), e);
                let _ = remove_path(&file_path);
                return Err(e.into());
            }
        }

        info!(
            "Ingested {} as {} ({} bytes) in {}/{}",
            original_name,
            entry.stored_id,
            content.len(),
            category,
            rel
        );
        self.audit
            .record(actor, AuditAction::Ingest, original_name, category, &rel);
        Ok(entry)
    }

    /// Creates a subdirectory and indexes it unless a folder of that name is already listed.
    pub fn create_folder(
        &self,
        actor: &str,
        category: &str,
        relative_path: &str,
        folder_name: &str,
    ) -> Result<FolderOutcome, StoreError> {
        validate_folder_name(folder_name, self.index.reserved_name())?;
        let (parent, rel) = self.locate(category, relative_path)?;
        let _tree = self.shared_tree(category)?;

        create_directory(&parent.join(folder_name))?;

        let outcome = {
            let _guard = self.locks.acquire(&parent);
            let mut entries = self.index.load(&parent);
            let exists = entries
                .iter()
                .any(|e| e.is_folder() && e.display_name == folder_name);
            if exists {
                FolderOutcome::AlreadyIndexed
            } else {
                let entry = Entry::folder(folder_name);
                entries.push(entry.clone());
                self.index.save(&parent, &entries)?;
                FolderOutcome::Created(entry)
            }
        };

        info!(
            "Folder {} in {}/{} ({})",
            folder_name,
            category,
            rel,
            if outcome.is_created() { "created" } else { "already indexed" }
        );
        self.audit
            .record(actor, AuditAction::CreateFolder, folder_name, category, &rel);
        Ok(outcome)
    }

    /// Lists a directory: optional name filter, primary sort, folders first.
    pub fn list(
        &self,
        category: &str,
        relative_path: &str,
        search: Option<&str>,
        sort: SortKey,
    ) -> Result<Vec<Entry>, StoreError> {
        let dir = self.resolve(category, relative_path)?;
        let mut entries = self.index.load(&dir);
        if let Some(term) = search {
            filter_by_name(&mut entries, term);
        }
        sort_entries(&mut entries, sort);
        Ok(entries)
    }

    /// Renames the first entry displayed as `old_name`.
    ///
    /// Files keep their stored id. Folders are renamed on disk too, so their
    /// children stay reachable under the new name.
    pub fn rename(
        &self,
        actor: &str,
        category: &str,
        relative_path: &str,
        old_name: &str,
        new_name: &str,
    ) -> Result<Entry, StoreError> {
        validate_display_name(new_name)?;
        let (dir, rel) = self.locate(category, relative_path)?;

        let renamed = {
            let _tree = self.exclusive_tree(category)?;
            let mut entries = self.index.load(&dir);
            let pos = entries
                .iter()
                .position(|e| e.display_name == old_name)
                .ok_or_else(|| StoreError::NotFound(old_name.to_string()))?;

            let mut physical_rename = None;
            if entries[pos].is_folder() && entries[pos].stored_id != new_name {
                validate_folder_name(new_name, self.index.reserved_name())?;
                let from = self.member_path(&dir, &entries[pos].stored_id)?;
                let to = dir.join(new_name);
                if to.exists() {
                    return Err(StoreError::AlreadyExists(new_name.to_string()));
                }
                if directory_exists(&from) {
                    move_path(&from, &to).map_err(|e| {
                        error!("Failed to rename folder {} to {}: {}", from.display(), to.display(), e);
                        e
                    })?;
                    physical_rename = Some((to, from));
                } else {
                    warn!("Folder {} missing on disk, recreating as {}", from.display(), to.display());
                    create_directory(&to)?;
                }
                entries[pos].stored_id = new_name.to_string();
            }
            entries[pos].display_name = new_name.to_string();

            if let Err(e) = self.index.save(&dir, &entries) {
                if let Some((to, from)) = physical_rename {
                    let _ = move_path(&to, &from);
                }
                return Err(e.into());
            }
            entries.swap_remove(pos)
        };

        let subject = format!("{old_name} -> {new_name}");
        info!("Renamed {} in {}/{}", subject, category, rel);
        self.audit
            .record(actor, AuditAction::Rename, &subject, category, &rel);
        Ok(renamed)
    }

    /// Removes an entry, matched by stored id first and display name second.
    ///
    /// The index is saved before the physical removal; a failed removal is
    /// reported without restoring the index.
    pub fn delete_entry(
        &self,
        actor: &str,
        category: &str,
        relative_path: &str,
        name: &str,
    ) -> Result<Entry, StoreError> {
        let (dir, rel) = self.locate(category, relative_path)?;

        let _tree = self.exclusive_tree(category)?;
        let mut entries = self.index.load(&dir);
        let pos = entries
            .iter()
            .position(|e| e.stored_id == name)
            .or_else(|| entries.iter().position(|e| e.display_name == name))
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;

        let entry = entries.remove(pos);
        self.index.save(&dir, &entries)?;

        let target = self.member_path(&dir, &entry.stored_id)?;
        remove_path(&target).map_err(|e| {
            error!("Failed to remove {} from disk: {}", target.display(), e);
            e
        })?;

        info!(
            "Deleted {:?} {} ({}) from {}/{}",
            entry.kind, entry.display_name, entry.stored_id, category, rel
        );
        self.audit
            .record(actor, AuditAction::Delete, &entry.display_name, category, &rel);
        Ok(entry)
    }

    /// Moves the entry `stored_id` from one directory of `category` to another.
    ///
    /// The physical move happens before either index changes, so a failed
    /// move leaves both indices as they were.
    pub fn move_entry(
        &self,
        actor: &str,
        category: &str,
        src_path: &str,
        dest_path: &str,
        stored_id: &str,
    ) -> Result<Entry, StoreError> {
        let (src_dir, src_rel) = self.locate(category, src_path)?;
        let (dest_dir, dest_rel) = self.locate(category, dest_path)?;

        let _tree = self.exclusive_tree(category)?;
        let mut src_entries = self.index.load(&src_dir);
        let mut dest_entries = self.index.load(&dest_dir);

        let pos = src_entries
            .iter()
            .position(|e| e.stored_id == stored_id)
            .ok_or_else(|| StoreError::NotFound(stored_id.to_string()))?;

        if src_dir == dest_dir {
            return Ok(src_entries.swap_remove(pos));
        }

        let from = self.member_path(&src_dir, stored_id)?;
        if src_entries[pos].is_folder() && dest_dir.starts_with(&from) {
            return Err(StoreError::InvalidPath(format!(
                "cannot move {stored_id} into itself"
            )));
        }

        create_directory(&dest_dir)?;
        let to = dest_dir.join(stored_id);
        move_path(&from, &to).map_err(|e| {
            error!("Failed to move {} to {}: {}", from.display(), to.display(), e);
            e
        })?;

        let entry = src_entries.remove(pos);
        self.index.save(&src_dir, &src_entries)?;
        dest_entries.retain(|e| e.stored_id != entry.stored_id);
        dest_entries.push(entry.clone());
        self.index.save(&dest_dir, &dest_entries)?;

        let dest_label = if dest_rel.is_empty() { "/" } else { dest_rel.as_str() };
        let subject = format!("{} -> {}", entry.display_name, dest_label);
        info!("Moved {} in {} (from {:?})", subject, category, src_rel);
        self.audit
            .record(actor, AuditAction::Move, &subject, category, &src_rel);
        Ok(entry)
    }

    /// Looks up a file entry for download and records the access.
    pub fn prepare_download(
        &self,
        actor: &str,
        category: &str,
        relative_path: &str,
        stored_id: &str,
    ) -> Result<DownloadTarget, StoreError> {
        let (dir, rel) = self.locate(category, relative_path)?;

        let entry = self
            .index
            .load(&dir)
            .into_iter()
            .find(|e| !e.is_folder() && e.stored_id == stored_id)
            .ok_or_else(|| StoreError::NotFound(stored_id.to_string()))?;

        let file_path = self.member_path(&dir, &entry.stored_id)?;
        if !file_exists(&file_path) {
            warn!("Indexed file {} missing on disk", file_path.display());
            return Err(StoreError::NotFound(format!("{stored_id} (on disk)")));
        }

        self.audit
            .record(actor, AuditAction::Download, &entry.display_name, category, &rel);
        Ok(DownloadTarget {
            file_path,
            display_name: entry.display_name,
        })
    }

    fn shared_tree(&self, category: &str) -> Result<RwLockReadGuard<'_, ()>, StoreError> {
        self.trees
            .shared(category)
            .ok_or_else(|| StoreError::UnknownCategory(category.to_string()))
    }

    fn exclusive_tree(&self, category: &str) -> Result<RwLockWriteGuard<'_, ()>, StoreError> {
        self.trees
            .exclusive(category)
            .ok_or_else(|| StoreError::UnknownCategory(category.to_string()))
    }

    fn locate(&self, category: &str, relative_path: &str) -> Result<(PathBuf, String), StoreError> {
        let dir = self.resolve(category, relative_path)?;
        let rel = normalize_relative_path(relative_path)?;
        Ok((dir, rel))
    }

    /// Path of an indexed member, refusing stored ids that are not a single segment
    fn member_path(&self, dir: &Path, stored_id: &str) -> Result<PathBuf, StoreError> {
        validate_folder_name(stored_id, self.index.reserved_name())
            .map_err(|_| StoreError::InvalidName(stored_id.to_string()))?;
        Ok(dir.join(stored_id))
    }
}
