//! Server core functionality
//!
//! This module contains the HTTP server, its shared state and the request
//! handlers that expose the file store.

pub mod core;
pub mod routes;
pub mod state;

pub use self::core::Server;
pub use state::{AppState, UploadLimits};
