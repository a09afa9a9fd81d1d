//! Error types
//!
//! Defines domain-specific error types for each module of the file store.

use std::io;
use thiserror::Error;

/// Directory operation errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Raw sidecar read outcomes other than a parsed listing.
///
/// Only `IndexStore::load` consumes these, and it maps every variant to an
/// empty listing.
#[derive(Debug, Error)]
pub enum IndexReadError {
    #[error("no index artifact present")]
    Missing,

    #[error("index artifact is empty")]
    Empty,

    #[error("index artifact is malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("index artifact unreadable: {0}")]
    Io(io::Error),
}

/// Disk usage errors
#[derive(Debug, Error)]
pub enum UsageError {
    #[error("Failed to walk store root: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Host capacity query failed: {0}")]
    HostQuery(String),
}

/// HTTP-facing error that encompasses all error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Usage(#[from] UsageError),

    #[error("No files uploaded")]
    NoFiles,

    #[error("Too many files in one upload (max {0})")]
    TooManyFiles(usize),

    #[error("File {name} exceeds the {limit} byte limit")]
    FileTooLarge { name: String, limit: u64 },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Startup errors
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Failed to bind to {addr}: {source}")]
    Bind { addr: String, source: io::Error },

    #[error("Failed to prepare storage: {0}")]
    Storage(#[from] StoreError),
}
