//! Disk usage
//!
//! Stored-content size plus host volume capacity, computed on demand.

pub mod aggregate;
pub mod host;
pub mod report;

pub use aggregate::total_stored_bytes;
pub use host::{CapacityProbe, HostCapacity, StaticProbe, platform_probe};
pub use report::{DiskUsageReport, disk_usage};
