//! The storage manager: orchestrates cleanup cycles over a session root.
//!
//! A cycle is: probe, unconditional age pass, re-probe and classify, optional
//! disk-pressure pass, final probe, report. The age pass runs first because
//! it removes unambiguously stale data and may by itself relieve enough
//! pressure to make the disk pass unnecessary.
//!
//! All filesystem work for a cycle runs on the blocking thread pool so
//! request handling in the embedding server is never stalled, and a cycle
//! that has started always runs to completion.

use std::{
    io,
    path::{Path, PathBuf},
    sync::Arc,
    time::SystemTime,
};

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{
    config::{CleanupConfig, ConfigError},
    observability::metrics,
    storage::{
        disk::{DiskProbe, DiskProbeError, DiskUsage, SystemDiskProbe},
        evict,
        inventory::{self, SessionDir},
        policy::{self, CleanupMode, SweepTarget},
        report::{CleanupReport, SweepReason, SweepStats},
    },
};

/// Errors surfaced by the storage manager.
///
/// Per-session failures (unreadable entries, failed deletions) are handled
/// inside the cycle and never appear here; these variants are the cases
/// that abort a whole cycle or reject a call.
#[derive(Debug, Error)]
pub enum CleanupError {
    #[error("invalid cleanup configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to create session root {path}: {source}")]
    CreateRoot { path: PathBuf, source: io::Error },

    #[error("failed to scan session root {path}: {source}")]
    Scan { path: PathBuf, source: io::Error },

    #[error(transparent)]
    DiskProbe(#[from] DiskProbeError),

    #[error("a cleanup cycle is already running")]
    AlreadyRunning,

    #[error("cleanup task aborted: {0}")]
    Background(#[from] tokio::task::JoinError),
}

/// Read-only snapshot for an administrative status endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct StorageStatus {
    pub disk: DiskUsage,
    pub session_count: usize,
    pub max_age_days: u32,
    pub disk_threshold_percent: f64,
    pub emergency_threshold_percent: f64,
    pub min_free_gb: f64,
}

/// Manages retention of per-session working directories under one root.
///
/// Construction validates the configuration and creates the root if absent.
/// Cycles are serialized: a manual [`run_once`](Self::run_once) issued while
/// the scheduled cycle is in flight waits for it to finish, and
/// [`try_run_once`](Self::try_run_once) rejects instead of waiting.
pub struct StorageManager {
    inner: Arc<ManagerInner>,
    cycle_lock: Mutex<()>,
}

struct ManagerInner {
    config: CleanupConfig,
    probe: Box<dyn DiskProbe>,
}

impl StorageManager {
    /// Create a manager probing the real filesystem.
    pub fn new(config: CleanupConfig) -> Result<Self, CleanupError> {
        Self::with_probe(config, Box::new(SystemDiskProbe))
    }

    /// Create a manager with a custom disk probe.
    pub fn with_probe(
        config: CleanupConfig,
        probe: Box<dyn DiskProbe>,
    ) -> Result<Self, CleanupError> {
        config.validate()?;

        std::fs::create_dir_all(&config.target_dir).map_err(|source| {
            CleanupError::CreateRoot {
                path: config.target_dir.clone(),
                source,
            }
        })?;

        Ok(Self {
            inner: Arc::new(ManagerInner { config, probe }),
            cycle_lock: Mutex::new(()),
        })
    }

    pub fn config(&self) -> &CleanupConfig {
        &self.inner.config
    }

    /// Current usage, session count, and configured thresholds.
    /// Read-only; does not take the cycle lock.
    pub async fn status(&self) -> Result<StorageStatus, CleanupError> {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || inner.status()).await?
    }

    /// Run one cleanup cycle, waiting first for any in-flight cycle.
    pub async fn run_once(&self) -> Result<CleanupReport, CleanupError> {
        let _cycle = self.cycle_lock.lock().await;
        self.run_cycle_blocking().await
    }

    /// Run one cleanup cycle, rejecting with
    /// [`CleanupError::AlreadyRunning`] if one is in flight.
    pub async fn try_run_once(&self) -> Result<CleanupReport, CleanupError> {
        let _cycle = self
            .cycle_lock
            .try_lock()
            .map_err(|_| CleanupError::AlreadyRunning)?;
        self.run_cycle_blocking().await
    }

    async fn run_cycle_blocking(&self) -> Result<CleanupReport, CleanupError> {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || inner.run_cycle()).await?
    }
}

impl ManagerInner {
    fn root(&self) -> &Path {
        &self.config.target_dir
    }

    fn usage(&self) -> Result<DiskUsage, DiskProbeError> {
        self.probe.usage(self.root())
    }

    fn scan(&self) -> Result<Vec<SessionDir>, CleanupError> {
        inventory::scan_sessions(self.root()).map_err(|source| CleanupError::Scan {
            path: self.root().to_path_buf(),
            source,
        })
    }

    fn status(&self) -> Result<StorageStatus, CleanupError> {
        let disk = self.usage()?;
        let sessions = self.scan()?;

        Ok(StorageStatus {
            disk,
            session_count: sessions.len(),
            max_age_days: self.config.max_age_days,
            disk_threshold_percent: self.config.disk_threshold_percent,
            emergency_threshold_percent: self.config.emergency_threshold_percent,
            min_free_gb: self.config.min_free_gb,
        })
    }

    fn run_cycle(&self) -> Result<CleanupReport, CleanupError> {
        let initial = self.usage()?;
        info!(
            used_percent = initial.used_percent,
            used_gb = initial.used_gb,
            free_gb = initial.free_gb,
            "Starting cleanup cycle"
        );

        let age_cleanup = self.sweep_expired()?;

        let after_age = self.usage()?;
        let cleanup_mode = CleanupMode::classify(&after_age, &self.config);

        let disk_cleanup = match cleanup_mode.sweep_aggressively() {
            Some(aggressive) => Some(self.sweep_disk_pressure(aggressive)?),
            None => None,
        };

        let final_usage = self.usage()?;
        info!(
            used_percent = final_usage.used_percent,
            free_gb = final_usage.free_gb,
            mode = %cleanup_mode,
            "Cleanup cycle complete"
        );

        Ok(CleanupReport {
            timestamp: Utc::now(),
            initial_disk_usage_percent: initial.used_percent,
            initial_free_gb: initial.free_gb,
            age_cleanup,
            disk_cleanup,
            cleanup_mode,
            final_disk_usage_percent: final_usage.used_percent,
            final_free_gb: final_usage.free_gb,
        })
    }

    /// Delete every session older than the configured maximum age.
    /// Runs on every cycle, regardless of disk usage.
    fn sweep_expired(&self) -> Result<SweepStats, CleanupError> {
        let now = SystemTime::now();
        let max_age = self.config.max_age();
        let sessions = self.scan()?;

        let mut deleted = 0u64;
        let mut freed = 0u64;

        for session in &sessions {
            if !policy::is_expired(session, now, max_age) {
                continue;
            }
            if let Some(bytes) = evict::delete_session(session) {
                deleted += 1;
                freed += bytes;
            }
        }

        if deleted > 0 {
            metrics::record_cleanup_deletion("expired_sessions", deleted);
            metrics::record_cleanup_freed_bytes(freed);
        } else {
            debug!("No expired sessions");
        }

        Ok(SweepStats::new(SweepReason::AgeBased, deleted, freed))
    }

    /// Evict oldest sessions until usage drops below target and the
    /// free-space floor holds. Usage is re-probed before every deletion, so
    /// the loop converges on real measurements rather than estimates.
    fn sweep_disk_pressure(&self, aggressive: bool) -> Result<SweepStats, CleanupError> {
        let target = SweepTarget::new(&self.config, aggressive);

        let usage = self.usage()?;
        if target.is_satisfied_by(&usage) {
            return Ok(SweepStats::new(SweepReason::DiskUsageAcceptable, 0, 0));
        }

        warn!(
            used_percent = usage.used_percent,
            free_gb = usage.free_gb,
            target_percent = target.target_percent,
            aggressive,
            "Disk usage above target, evicting oldest sessions"
        );

        let sessions = self.scan()?;
        let mut deleted = 0u64;
        let mut freed = 0u64;

        for session in &sessions {
            let usage = self.usage()?;
            if target.is_satisfied_by(&usage) {
                break;
            }
            if let Some(bytes) = evict::delete_session(session) {
                deleted += 1;
                freed += bytes;
            }
        }

        if deleted > 0 {
            metrics::record_cleanup_deletion("evicted_sessions", deleted);
            metrics::record_cleanup_freed_bytes(freed);
        }

        let reason = if aggressive {
            SweepReason::EmergencyCleanup
        } else {
            SweepReason::DiskThreshold
        };
        Ok(SweepStats::new(reason, deleted, freed))
    }
}
