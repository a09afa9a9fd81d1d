pub mod audit;
pub mod config;
pub mod error;
pub mod middleware;
pub mod server;
pub mod storage;
pub mod usage;

pub use server::Server;
