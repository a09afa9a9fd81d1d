//! Host capacity probes
//!
//! Total and free space of the volume holding the store. The query is
//! platform specific, so callers only see the `CapacityProbe` trait.

use std::path::Path;
use std::sync::Arc;

use crate::error::UsageError;

/// Size and free space of a volume, in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostCapacity {
    pub total_bytes: u64,
    pub free_bytes: u64,
}

pub trait CapacityProbe: Send + Sync {
    fn capacity(&self, path: &Path) -> Result<HostCapacity, UsageError>;
}

/// `statvfs(3)` on the store root
#[cfg(unix)]
#[derive(Debug, Default)]
pub struct StatvfsProbe;

#[cfg(unix)]
impl CapacityProbe for StatvfsProbe {
    fn capacity(&self, path: &Path) -> Result<HostCapacity, UsageError> {
        use std::ffi::CString;
        use std::os::unix::ffi::OsStrExt;

        let path_cstr = CString::new(path.as_os_str().as_bytes())
            .map_err(|_| UsageError::HostQuery(format!("invalid path {}", path.display())))?;

        let mut stat: libc::statvfs = unsafe { std::mem::zeroed() };
        let ret = unsafe { libc::statvfs(path_cstr.as_ptr(), &mut stat) };
        if ret != 0 {
            let err = std::io::Error::last_os_error();
            return Err(UsageError::HostQuery(format!("statvfs failed: {err}")));
        }

        let block = stat.f_frsize as u64;
        Ok(HostCapacity {
            total_bytes: (stat.f_blocks as u64) * block,
            free_bytes: (stat.f_bavail as u64) * block,
        })
    }
}

/// Used where no native query is wired up
#[derive(Debug, Default)]
pub struct UnsupportedProbe;

impl CapacityProbe for UnsupportedProbe {
    fn capacity(&self, _path: &Path) -> Result<HostCapacity, UsageError> {
        Err(UsageError::HostQuery(
            "capacity query not supported on this platform".into(),
        ))
    }
}

/// Reports a fixed capacity, e.g. a quota configured outside the host
#[derive(Debug, Clone, Copy)]
pub struct StaticProbe(pub HostCapacity);

impl CapacityProbe for StaticProbe {
    fn capacity(&self, _path: &Path) -> Result<HostCapacity, UsageError> {
        Ok(self.0)
    }
}

/// The native probe for the platform this binary was built for
pub fn platform_probe() -> Arc<dyn CapacityProbe> {
    #[cfg(unix)]
    {
        Arc::new(StatvfsProbe)
    }
    #[cfg(not(unix))]
    {
        Arc::new(UnsupportedProbe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_statvfs_reports_plausible_capacity() {
        let dir = tempfile::tempdir().unwrap();
        let capacity = StatvfsProbe.capacity(dir.path()).unwrap();
        assert!(capacity.total_bytes > 0);
        assert!(capacity.free_bytes <= capacity.total_bytes);
    }

    #[cfg(unix)]
    #[test]
    fn test_statvfs_missing_path_fails() {
        let result = StatvfsProbe.capacity(Path::new("/definitely/not/here"));
        assert!(matches!(result, Err(UsageError::HostQuery(_))));
    }

    #[test]
    fn test_unsupported_probe_fails() {
        assert!(UnsupportedProbe.capacity(Path::new(".")).is_err());
    }
}
