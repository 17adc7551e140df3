//! Retention policy decisions.
//!
//! Pure logic only: nothing in this module touches the filesystem. The
//! manager feeds it measurements and inventories and acts on its answers.

use std::time::{Duration, SystemTime};

use serde::Serialize;

use crate::{
    config::CleanupConfig,
    storage::{disk::DiskUsage, inventory::SessionDir},
};

/// Percentage points below the configured threshold a normal sweep aims for.
pub(crate) const NORMAL_MARGIN_PERCENT: f64 = 5.0;

/// Percentage points below the configured threshold an emergency sweep aims
/// for, buying extra headroom before the next cycle.
pub(crate) const AGGRESSIVE_MARGIN_PERCENT: f64 = 10.0;

/// Severity classification of one cleanup cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CleanupMode {
    /// Usage is acceptable; only the age pass ran.
    Normal,
    /// Usage crossed the configured threshold or the free-space floor.
    Threshold,
    /// Usage crossed the emergency threshold.
    Emergency,
}

impl CleanupMode {
    /// Classify measured usage against the configured thresholds.
    pub fn classify(usage: &DiskUsage, config: &CleanupConfig) -> Self {
        if usage.used_percent >= config.emergency_threshold_percent {
            CleanupMode::Emergency
        } else if usage.used_percent >= config.disk_threshold_percent
            || usage.free_gb < config.min_free_gb
        {
            CleanupMode::Threshold
        } else {
            CleanupMode::Normal
        }
    }

    /// Whether this mode calls for a disk-pressure sweep, and if so whether
    /// the aggressive margin applies.
    pub fn sweep_aggressively(&self) -> Option<bool> {
        match self {
            CleanupMode::Normal => None,
            CleanupMode::Threshold => Some(false),
            CleanupMode::Emergency => Some(true),
        }
    }
}

impl std::fmt::Display for CleanupMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mode = match self {
            CleanupMode::Normal => "normal",
            CleanupMode::Threshold => "threshold",
            CleanupMode::Emergency => "emergency",
        };
        f.write_str(mode)
    }
}

/// The condition a disk-pressure sweep drives usage towards.
///
/// Both bounds must hold for the sweep to stop: usage strictly below the
/// target percentage and free space at or above the configured floor.
#[derive(Debug, Clone, Copy)]
pub struct SweepTarget {
    pub target_percent: f64,
    pub min_free_gb: f64,
}

impl SweepTarget {
    pub fn new(config: &CleanupConfig, aggressive: bool) -> Self {
        let margin = if aggressive {
            AGGRESSIVE_MARGIN_PERCENT
        } else {
            NORMAL_MARGIN_PERCENT
        };
        Self {
            target_percent: config.disk_threshold_percent - margin,
            min_free_gb: config.min_free_gb,
        }
    }

    pub fn is_satisfied_by(&self, usage: &DiskUsage) -> bool {
        usage.used_percent < self.target_percent && usage.free_gb >= self.min_free_gb
    }
}

/// Whether a session has outlived the configured retention period.
///
/// Strictly greater than: a session exactly `max_age` old survives.
pub fn is_expired(session: &SessionDir, now: SystemTime, max_age: Duration) -> bool {
    session.age(now) > max_age
}
