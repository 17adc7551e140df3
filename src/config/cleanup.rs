//! Session cleanup configuration.
//!
//! Controls the retention worker that keeps the session root from growing
//! without bound: how old a session may get, at what disk usage eviction
//! starts, and how often the worker wakes up.
//!
//! # Example
//!
//! ```toml
//! [cleanup]
//! target_dir = "/var/lib/app/sessions"
//! max_age_days = 7
//! disk_threshold_percent = 70.0
//! cleanup_interval_hours = 6
//! emergency_threshold_percent = 80.0
//! min_free_gb = 2.0
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::storage::policy::AGGRESSIVE_MARGIN_PERCENT;

/// Session cleanup configuration.
///
/// All thresholds are validated at load/construction time; an invalid
/// combination is rejected before any worker starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CleanupConfig {
    /// Whether the background cleanup worker runs.
    /// Manual triggers work either way.
    /// Default: true
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Root directory containing one subdirectory per session.
    /// Created at startup if absent.
    pub target_dir: PathBuf,

    /// Sessions untouched for longer than this many days are deleted on
    /// every cycle, regardless of disk usage.
    /// Default: 7
    #[serde(default = "default_max_age_days")]
    pub max_age_days: u32,

    /// Disk usage percentage that triggers a normal eviction pass.
    /// Default: 70.0
    #[serde(default = "default_disk_threshold_percent")]
    pub disk_threshold_percent: f64,

    /// Hours between scheduled cleanup cycles.
    /// Default: 6
    #[serde(default = "default_cleanup_interval_hours")]
    pub cleanup_interval_hours: u64,

    /// Disk usage percentage that triggers an aggressive eviction pass.
    /// Must be above `disk_threshold_percent`.
    /// Default: 80.0
    #[serde(default = "default_emergency_threshold_percent")]
    pub emergency_threshold_percent: f64,

    /// Free-space floor in GB, enforced alongside the percent thresholds.
    /// Default: 2.0
    #[serde(default = "default_min_free_gb")]
    pub min_free_gb: f64,
}

fn default_enabled() -> bool {
    true
}

fn default_max_age_days() -> u32 {
    7
}

fn default_disk_threshold_percent() -> f64 {
    70.0
}

fn default_cleanup_interval_hours() -> u64 {
    6
}

fn default_emergency_threshold_percent() -> f64 {
    80.0
}

fn default_min_free_gb() -> f64 {
    2.0
}

impl CleanupConfig {
    /// Validate threshold consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=100.0).contains(&self.disk_threshold_percent)
            || self.disk_threshold_percent == 0.0
        {
            return Err(ConfigError::Validation(format!(
                "cleanup.disk_threshold_percent must be within (0, 100], got {}",
                self.disk_threshold_percent
            )));
        }

        if !(0.0..=100.0).contains(&self.emergency_threshold_percent)
            || self.emergency_threshold_percent == 0.0
        {
            return Err(ConfigError::Validation(format!(
                "cleanup.emergency_threshold_percent must be within (0, 100], got {}",
                self.emergency_threshold_percent
            )));
        }

        if self.emergency_threshold_percent <= self.disk_threshold_percent {
            return Err(ConfigError::Validation(format!(
                "cleanup.emergency_threshold_percent ({}) must be above \
                 cleanup.disk_threshold_percent ({})",
                self.emergency_threshold_percent, self.disk_threshold_percent
            )));
        }

        // An aggressive sweep aims this many points below the threshold; the
        // resulting target must stay positive to be reachable at all.
        if self.disk_threshold_percent <= AGGRESSIVE_MARGIN_PERCENT {
            return Err(ConfigError::Validation(format!(
                "cleanup.disk_threshold_percent must be above {AGGRESSIVE_MARGIN_PERCENT}, got {}",
                self.disk_threshold_percent
            )));
        }

        if self.max_age_days == 0 {
            return Err(ConfigError::Validation(
                "cleanup.max_age_days must be at least 1".into(),
            ));
        }

        if self.cleanup_interval_hours == 0 {
            return Err(ConfigError::Validation(
                "cleanup.cleanup_interval_hours must be at least 1".into(),
            ));
        }

        if !self.min_free_gb.is_finite() || self.min_free_gb < 0.0 {
            return Err(ConfigError::Validation(format!(
                "cleanup.min_free_gb must be a non-negative number, got {}",
                self.min_free_gb
            )));
        }

        Ok(())
    }

    /// Maximum session age as a Duration.
    pub fn max_age(&self) -> std::time::Duration {
        std::time::Duration::from_secs(u64::from(self.max_age_days) * 24 * 60 * 60)
    }

    /// Scheduler interval as a Duration.
    pub fn interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.cleanup_interval_hours * 3600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(toml: &str) -> CleanupConfig {
        toml::from_str(toml).unwrap()
    }

    #[test]
    fn test_parse_minimal_config() {
        let config = parsed(r#"target_dir = "/srv/sessions""#);
        assert!(config.enabled);
        assert_eq!(config.target_dir, PathBuf::from("/srv/sessions"));
        assert_eq!(config.max_age_days, 7);
        assert_eq!(config.disk_threshold_percent, 70.0);
        assert_eq!(config.cleanup_interval_hours, 6);
        assert_eq!(config.emergency_threshold_percent, 80.0);
        assert_eq!(config.min_free_gb, 2.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let config = parsed(
            r#"
            enabled = false
            target_dir = "/data/tmp"
            max_age_days = 14
            disk_threshold_percent = 60.0
            cleanup_interval_hours = 12
            emergency_threshold_percent = 75.0
            min_free_gb = 5.0
        "#,
        );
        assert!(!config.enabled);
        assert_eq!(config.max_age_days, 14);
        assert_eq!(config.emergency_threshold_percent, 75.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_target_dir_is_required() {
        let result: Result<CleanupConfig, _> = toml::from_str("max_age_days = 3");
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let result: Result<CleanupConfig, _> = toml::from_str(
            r#"
            target_dir = "/x"
            max_age = 3
        "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_emergency_at_or_below_threshold() {
        let mut config = parsed(r#"target_dir = "/srv/sessions""#);
        config.emergency_threshold_percent = config.disk_threshold_percent;
        assert!(config.validate().is_err());

        config.emergency_threshold_percent = config.disk_threshold_percent - 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_out_of_range_thresholds() {
        let mut config = parsed(r#"target_dir = "/srv/sessions""#);
        config.disk_threshold_percent = 0.0;
        assert!(config.validate().is_err());

        let mut config = parsed(r#"target_dir = "/srv/sessions""#);
        config.emergency_threshold_percent = 101.0;
        assert!(config.validate().is_err());

        // Threshold so low the aggressive target would be negative.
        let mut config = parsed(r#"target_dir = "/srv/sessions""#);
        config.disk_threshold_percent = 8.0;
        config.emergency_threshold_percent = 9.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_periods() {
        let mut config = parsed(r#"target_dir = "/srv/sessions""#);
        config.max_age_days = 0;
        assert!(config.validate().is_err());

        let mut config = parsed(r#"target_dir = "/srv/sessions""#);
        config.cleanup_interval_hours = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_negative_min_free() {
        let mut config = parsed(r#"target_dir = "/srv/sessions""#);
        config.min_free_gb = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_duration_helpers() {
        let config = parsed(r#"target_dir = "/srv/sessions""#);
        assert_eq!(
            config.max_age(),
            std::time::Duration::from_secs(7 * 24 * 3600)
        );
        assert_eq!(config.interval(), std::time::Duration::from_secs(6 * 3600));
    }
}
