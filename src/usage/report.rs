//! Disk usage report
//!
//! Everything is expressed in GB (1024^3 bytes) rounded to two decimals.

use serde::Serialize;
use std::path::Path;

use crate::error::UsageError;
use crate::usage::aggregate::total_stored_bytes;
use crate::usage::host::{CapacityProbe, HostCapacity};

const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DiskUsageReport {
    pub uploaded: f64,
    pub free: f64,
    /// Used space not accounted for by the store. Not clamped; may be negative.
    pub system: f64,
    pub total: f64,
}

impl DiskUsageReport {
    pub fn from_bytes(stored_bytes: u64, capacity: HostCapacity) -> Self {
        let uploaded = stored_bytes as f64 / BYTES_PER_GB;
        let total = capacity.total_bytes as f64 / BYTES_PER_GB;
        let free = capacity.free_bytes as f64 / BYTES_PER_GB;
        let system = (total - free) - uploaded;

        Self {
            uploaded: round2(uploaded),
            free: round2(free),
            system: round2(system),
            total: round2(total),
        }
    }
}

/// Walks `root` and queries `probe`; either failure fails the whole report.
pub fn disk_usage(root: &Path, probe: &dyn CapacityProbe) -> Result<DiskUsageReport, UsageError> {
    let stored = total_stored_bytes(root)?;
    let capacity = probe.capacity(root)?;
    Ok(DiskUsageReport::from_bytes(stored, capacity))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usage::host::{StaticProbe, UnsupportedProbe};

    const GB: u64 = 1024 * 1024 * 1024;

    #[test]
    fn test_report_in_gigabytes() {
        let report = DiskUsageReport::from_bytes(
            GB / 2,
            HostCapacity {
                total_bytes: 100 * GB,
                free_bytes: 40 * GB,
            },
        );
        assert_eq!(report.uploaded, 0.5);
        assert_eq!(report.free, 40.0);
        assert_eq!(report.system, 59.5);
        assert_eq!(report.total, 100.0);
    }

    #[test]
    fn test_system_is_not_clamped() {
        let report = DiskUsageReport::from_bytes(
            10 * GB,
            HostCapacity {
                total_bytes: 100 * GB,
                free_bytes: 95 * GB,
            },
        );
        assert_eq!(report.system, -5.0);
    }

    #[test]
    fn test_rounds_to_two_decimals() {
        let report = DiskUsageReport::from_bytes(
            1234567890,
            HostCapacity {
                total_bytes: 3 * GB,
                free_bytes: GB,
            },
        );
        assert_eq!(report.uploaded, 1.15);
    }

    #[test]
    fn test_host_failure_fails_whole_report() {
        let dir = tempfile::tempdir().unwrap();
        let result = disk_usage(dir.path(), &UnsupportedProbe);
        assert!(matches!(result, Err(UsageError::HostQuery(_))));
    }

    #[test]
    fn test_disk_usage_combines_walk_and_probe() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("x"), vec![1u8; 10]).unwrap();
        let probe = StaticProbe(HostCapacity {
            total_bytes: 2 * GB,
            free_bytes: GB,
        });

        let report = disk_usage(dir.path(), &probe).unwrap();

        assert_eq!(report.total, 2.0);
        assert_eq!(report.free, 1.0);
        assert_eq!(report.uploaded, 0.0);
        assert_eq!(report.system, 1.0);
    }
}
