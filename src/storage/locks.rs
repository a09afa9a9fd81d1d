//! Directory and tree locking
//!
//! Two levels: a reader-writer lock per category tree and a mutex per
//! physical directory. Operations that only add entries to one directory
//! (ingest, folder creation) share the tree and serialise on the directory.
//! Operations that can relocate or remove a subtree (rename, delete, move)
//! hold the tree exclusively, so no writer can be working inside a folder
//! while it is renamed, moved or removed.

use parking_lot::lock_api::ArcMutexGuard;
use parking_lot::{Mutex, RawMutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Held for the duration of a directory mutation
pub type DirectoryGuard = ArcMutexGuard<RawMutex, ()>;

/// Idle locks are dropped once the table grows past this size
const PRUNE_THRESHOLD: usize = 256;

#[derive(Default)]
pub struct DirectoryLocks {
    table: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl DirectoryLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blocks until `dir` is free, then holds it until the guard drops.
    pub fn acquire(&self, dir: &Path) -> DirectoryGuard {
        let lock = self.handle(dir);
        lock.lock_arc()
    }

    fn handle(&self, dir: &Path) -> Arc<Mutex<()>> {
        let mut table = self.table.lock();
        if table.len() > PRUNE_THRESHOLD {
            table.retain(|_, lock| Arc::strong_count(lock) > 1);
        }
        Arc::clone(table.entry(dir.to_path_buf()).or_default())
    }
}

/// One reader-writer lock per category tree
pub struct TreeLocks {
    trees: HashMap<String, RwLock<()>>,
}

impl TreeLocks {
    pub fn new(categories: &[String]) -> Self {
        Self {
            trees: categories
                .iter()
                .map(|category| (category.clone(), RwLock::new(())))
                .collect(),
        }
    }

    /// Shared access for writers confined to a single directory
    pub fn shared(&self, category: &str) -> Option<RwLockReadGuard<'_, ()>> {
        self.trees.get(category).map(|tree| tree.read())
    }

    /// Exclusive access for operations that restructure the tree
    pub fn exclusive(&self, category: &str) -> Option<RwLockWriteGuard<'_, ()>> {
        self.trees.get(category).map(|tree| tree.write())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_same_directory_is_serialised() {
        let locks = Arc::new(DirectoryLocks::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let overlap = Arc::new(AtomicUsize::new(0));

        let workers: Vec<_> = (0..4)
            .map(|_| {
                let locks = Arc::clone(&locks);
                let inside = Arc::clone(&inside);
                let overlap = Arc::clone(&overlap);
                thread::spawn(move || {
                    for _ in 0..10 {
                        let _guard = locks.acquire(Path::new("/store/images"));
                        if inside.fetch_add(1, Ordering::SeqCst) > 0 {
                            overlap.fetch_add(1, Ordering::SeqCst);
                        }
                        thread::sleep(Duration::from_micros(200));
                        inside.fetch_sub(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();

        for worker in workers {
            worker.join().unwrap();
        }
        assert_eq!(overlap.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_tree_shared_then_exclusive() {
        let trees = TreeLocks::new(&["images".to_string(), "videos".to_string()]);

        let a = trees.shared("images").unwrap();
        let b = trees.shared("images").unwrap();
        assert!(trees.trees["images"].try_write().is_none());
        drop((a, b));

        let _images = trees.exclusive("images").unwrap();
        assert!(trees.trees["images"].try_read().is_none());
        assert!(trees.shared("videos").is_some());
        assert!(trees.exclusive("music").is_none());
    }

    #[test]
    fn test_different_directories_are_independent() {
        let locks = DirectoryLocks::new();
        let _a = locks.acquire(Path::new("/a"));
        let _b = locks.acquire(Path::new("/b"));
    }
}
