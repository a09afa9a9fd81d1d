//! Shared server state
//!
//! Everything a request handler needs, cloned cheaply into each request.

use log::info;
use std::sync::Arc;

use crate::audit::AuditLog;
use crate::config::ServerConfig;
use crate::error::StoreError;
use crate::storage::{FileStore, JsonSidecar};
use crate::usage::CapacityProbe;

/// Per-request upload limits
#[derive(Debug, Clone, Copy)]
pub struct UploadLimits {
    pub max_files: usize,
    pub max_file_bytes: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<FileStore>,
    pub probe: Arc<dyn CapacityProbe>,
    pub limits: UploadLimits,
    pub default_category: Arc<str>,
}

impl AppState {
    /// Opens the audit log and prepares the category directories.
    pub fn from_config(
        config: &ServerConfig,
        probe: Arc<dyn CapacityProbe>,
    ) -> Result<Self, StoreError> {
        let audit = AuditLog::open(&config.audit_log_file(), config.audit_capacity)?;
        let store = FileStore::new(
            config.store_root_path(),
            config.categories.clone(),
            Arc::new(JsonSidecar),
            Arc::new(audit),
        );
        store.init_layout()?;

        info!(
            "Upload limits: {} files per request, {} MB per file",
            config.max_upload_files, config.max_file_size_mb
        );

        Ok(Self {
            store: Arc::new(store),
            probe,
            limits: UploadLimits {
                max_files: config.max_upload_files,
                max_file_bytes: config.max_file_size_bytes(),
            },
            default_category: Arc::from(config.default_category.as_str()),
        })
    }
}
