//! Disk usage probing for the filesystem holding the session root.
//!
//! Every query goes to the OS; results are never cached, so a probe taken
//! after a deletion reflects that deletion (the disk-pressure sweep relies
//! on this to re-measure instead of estimating).

use std::path::{Path, PathBuf};

use serde::Serialize;
use sysinfo::Disks;
use thiserror::Error;

const BYTES_PER_GB: f64 = (1024u64 * 1024 * 1024) as f64;

/// A point-in-time snapshot of the filesystem backing the session root.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DiskUsage {
    /// Used capacity as a percentage of total capacity.
    pub used_percent: f64,
    /// Used capacity in GB.
    pub used_gb: f64,
    /// Free capacity in GB.
    pub free_gb: f64,
}

/// Errors from probing disk usage.
#[derive(Debug, Error)]
pub enum DiskProbeError {
    #[error("failed to resolve {path}: {source}")]
    Resolve {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("no mounted filesystem found for {path}")]
    NoDiskForPath { path: PathBuf },
}

/// Source of disk usage measurements.
///
/// The production implementation queries the OS. Embedders and tests can
/// substitute their own (e.g. a deterministic fake) via
/// [`StorageManager::with_probe`](crate::storage::StorageManager::with_probe).
pub trait DiskProbe: Send + Sync {
    /// Measure the filesystem containing `path`.
    fn usage(&self, path: &Path) -> Result<DiskUsage, DiskProbeError>;
}

/// OS-backed probe over the system's mounted disk list.
///
/// The disk is selected by the longest mount point that is a prefix of the
/// canonicalized path, so a session root on a dedicated data volume is
/// measured against that volume rather than `/`.
pub struct SystemDiskProbe;

impl DiskProbe for SystemDiskProbe {
    fn usage(&self, path: &Path) -> Result<DiskUsage, DiskProbeError> {
        let resolved = path.canonicalize().map_err(|source| DiskProbeError::Resolve {
            path: path.to_path_buf(),
            source,
        })?;

        let disks = Disks::new_with_refreshed_list();
        let disk = disks
            .list()
            .iter()
            .filter(|disk| resolved.starts_with(disk.mount_point()))
            .filter(|disk| disk.total_space() > 0)
            .max_by_key(|disk| disk.mount_point().as_os_str().len())
            .ok_or_else(|| DiskProbeError::NoDiskForPath {
                path: resolved.clone(),
            })?;

        let total = disk.total_space();
        let free = disk.available_space();
        let used = total.saturating_sub(free);

        Ok(DiskUsage {
            used_percent: used as f64 / total as f64 * 100.0,
            used_gb: used as f64 / BYTES_PER_GB,
            free_gb: free as f64 / BYTES_PER_GB,
        })
    }
}
