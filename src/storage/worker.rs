//! Background cleanup worker.
//!
//! Drives the storage manager on a fixed interval for the lifetime of the
//! process. A failed cycle is logged and swallowed; the loop always reaches
//! its next tick.

use std::sync::Arc;

use crate::{observability::metrics, storage::manager::StorageManager};

/// Starts the storage cleanup worker as a background task.
///
/// The worker runs in a loop, executing one cleanup cycle per configured
/// interval. It runs indefinitely until the task is dropped at shutdown; a
/// cycle already in flight still completes because the filesystem work runs
/// on the blocking pool.
pub async fn start_cleanup_worker(manager: Arc<StorageManager>) {
    let config = manager.config();

    if !config.enabled {
        tracing::info!("Storage cleanup worker disabled by configuration");
        return;
    }

    tracing::info!(
        target_dir = %config.target_dir.display(),
        max_age_days = config.max_age_days,
        interval_hours = config.cleanup_interval_hours,
        disk_threshold_percent = config.disk_threshold_percent,
        emergency_threshold_percent = config.emergency_threshold_percent,
        min_free_gb = config.min_free_gb,
        "Starting storage cleanup worker"
    );

    let interval = config.interval();

    loop {
        match manager.run_once().await {
            Ok(report) => {
                if report.has_deletions() {
                    tracing::info!(
                        deleted = report.total_deleted(),
                        freed_mb = report.total_freed_mb(),
                        mode = %report.cleanup_mode,
                        final_used_percent = report.final_disk_usage_percent,
                        "Storage cleanup run complete"
                    );
                } else {
                    tracing::debug!("Storage cleanup run complete, nothing to delete");
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Error running storage cleanup");
                metrics::record_cleanup_error("session_storage");
            }
        }

        tokio::time::sleep(interval).await;
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::config::CleanupConfig;

    #[tokio::test]
    async fn test_disabled_worker_returns_immediately() {
        let root = TempDir::new().unwrap();
        let config = CleanupConfig {
            enabled: false,
            target_dir: root.path().to_path_buf(),
            max_age_days: 7,
            disk_threshold_percent: 70.0,
            cleanup_interval_hours: 6,
            emergency_threshold_percent: 80.0,
            min_free_gb: 2.0,
        };
        let manager = Arc::new(StorageManager::new(config).unwrap());

        // Completes instead of looping forever.
        start_cleanup_worker(manager).await;
    }
}
