//! Error handling
//!
//! Defines error types and their HTTP mapping for the file store.

pub mod handlers;
pub mod types;

pub use handlers::error_to_status;
pub use types::*;
