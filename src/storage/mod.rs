//! Session storage retention and disk-pressure cleanup.
//!
//! This module owns the lifecycle of per-session working directories under
//! one managed root. A background worker periodically:
//!
//! 1. Deletes sessions older than the configured retention period
//! 2. Measures disk usage and, under pressure, evicts the oldest sessions
//!    until usage drops below target (aggressively so past the emergency
//!    threshold)
//! 3. Produces a structured [`CleanupReport`] for each cycle
//!
//! Deletions within a cycle are strictly oldest-first, per-directory
//! failures never abort a cycle, and cycles are serialized so a manual
//! trigger cannot overlap the scheduled run.

mod disk;
mod evict;
mod inventory;
mod manager;
pub(crate) mod policy;
mod report;
mod worker;

pub use disk::{DiskProbe, DiskProbeError, DiskUsage, SystemDiskProbe};
pub use inventory::SessionDir;
pub use manager::{CleanupError, StorageManager, StorageStatus};
pub use policy::CleanupMode;
pub use report::{CleanupReport, SweepReason, SweepStats};
pub use worker::start_cleanup_worker;
