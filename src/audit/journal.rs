//! Process-wide audit log
//!
//! Most-recent-first, capped, and persisted as a JSON array after every
//! append. All appends go through one mutex so trims never lose records.

use chrono::Utc;
use log::{error, info, warn};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::audit::record::{AuditAction, AuditRecord};
use crate::storage::filesystem::write_atomic;

pub struct AuditLog {
    path: PathBuf,
    capacity: usize,
    records: Mutex<VecDeque<AuditRecord>>,
}

impl AuditLog {
    /// Opens the audit artifact at `path`, creating it when absent.
    ///
    /// An unreadable or malformed artifact starts an empty log.
    pub fn open(path: &Path, capacity: usize) -> io::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut records = read_records(path);
        records.truncate(capacity);

        let audit = Self {
            path: path.to_path_buf(),
            capacity,
            records: Mutex::new(records),
        };

        if !path.exists() {
            audit.persist(&audit.records.lock())?;
        }

        info!(
            "Audit log at {} ({} records, capacity {})",
            path.display(),
            audit.records.lock().len(),
            capacity
        );
        Ok(audit)
    }

    /// Appends a record at the front, trims to capacity, and persists.
    ///
    /// Persistence failures are logged, never returned.
    pub fn record(
        &self,
        actor: &str,
        action: AuditAction,
        subject: &str,
        category: &str,
        path: &str,
    ) {
        let record = AuditRecord {
            actor: actor.to_string(),
            action,
            subject: subject.to_string(),
            category: category.to_string(),
            path: path.to_string(),
            timestamp: Utc::now(),
        };

        let mut records = self.records.lock();
        records.push_front(record);
        records.truncate(self.capacity);

        if let Err(e) = self.persist(&records) {
            error!("Failed to persist audit log {}: {}", self.path.display(), e);
        }
    }

    /// Returns the log as it stood before this call, then records the view.
    pub fn query(&self, actor: &str) -> Vec<AuditRecord> {
        let snapshot = self.snapshot();
        self.record(actor, AuditAction::ViewLogs, "-", "-", "-");
        snapshot
    }

    /// Current records, most recent first, without logging the read
    pub fn snapshot(&self) -> Vec<AuditRecord> {
        self.records.lock().iter().cloned().collect()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn persist(&self, records: &VecDeque<AuditRecord>) -> io::Result<()> {
        let json = serde_json::to_vec_pretty(records)?;
        write_atomic(&self.path, &json)
    }
}

fn read_records(path: &Path) -> VecDeque<AuditRecord> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return VecDeque::new(),
        Err(e) => {
            warn!("Starting empty audit log, cannot read {}: {}", path.display(), e);
            return VecDeque::new();
        }
    };

    if content.trim().is_empty() {
        return VecDeque::new();
    }

    serde_json::from_str(&content).unwrap_or_else(|e| {
        warn!("Starting empty audit log, {} is malformed: {}", path.display(), e);
        VecDeque::new()
    })
}
