//! Structured results of a cleanup cycle.
//!
//! Reports are serializable so an administrative endpoint can return the
//! outcome of a manual trigger verbatim.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::storage::policy::CleanupMode;

const BYTES_PER_MB: f64 = (1024u64 * 1024) as f64;

/// Why a sweep deleted (or declined to delete) sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SweepReason {
    /// Sessions exceeded the configured maximum age.
    AgeBased,
    /// Usage crossed the normal disk threshold.
    DiskThreshold,
    /// Usage crossed the emergency threshold.
    EmergencyCleanup,
    /// Usage was already below target; nothing was deleted.
    DiskUsageAcceptable,
}

/// Outcome of one sweep (age pass or disk-pressure pass).
#[derive(Debug, Clone, Serialize)]
pub struct SweepStats {
    /// Sessions successfully deleted.
    pub deleted_count: u64,
    /// Megabytes freed, measured per directory before deletion.
    pub freed_mb: f64,
    pub reason: SweepReason,
}

impl SweepStats {
    pub(crate) fn new(reason: SweepReason, deleted_count: u64, freed_bytes: u64) -> Self {
        Self {
            deleted_count,
            freed_mb: freed_bytes as f64 / BYTES_PER_MB,
            reason,
        }
    }
}

/// Immutable record of one full cleanup cycle.
#[derive(Debug, Clone, Serialize)]
pub struct CleanupReport {
    pub timestamp: DateTime<Utc>,
    pub initial_disk_usage_percent: f64,
    pub initial_free_gb: f64,
    /// Result of the unconditional age pass.
    pub age_cleanup: SweepStats,
    /// Result of the disk-pressure pass, when one ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_cleanup: Option<SweepStats>,
    pub cleanup_mode: CleanupMode,
    pub final_disk_usage_percent: f64,
    pub final_free_gb: f64,
}

impl CleanupReport {
    /// Total sessions deleted across both passes.
    pub fn total_deleted(&self) -> u64 {
        self.age_cleanup.deleted_count
            + self
                .disk_cleanup
                .as_ref()
                .map_or(0, |stats| stats.deleted_count)
    }

    /// Total megabytes freed across both passes.
    pub fn total_freed_mb(&self) -> f64 {
        self.age_cleanup.freed_mb
            + self
                .disk_cleanup
                .as_ref()
                .map_or(0.0, |stats| stats.freed_mb)
    }

    /// Check if the cycle deleted anything.
    pub fn has_deletions(&self) -> bool {
        self.total_deleted() > 0
    }
}
