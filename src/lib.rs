//! Custodian: session storage retention and disk-pressure cleanup.
//!
//! Long-running servers that keep per-session working files on local disk
//! (uploads, rendered artifacts, intermediate state) need something deciding
//! which of those directories to delete, when, and how urgently. Custodian
//! is that component: a library-level manager that
//!
//! - expires sessions older than a configured age on every cycle,
//! - evicts the oldest sessions under disk pressure until usage drops below
//!   target, with an aggressive mode past an emergency threshold,
//! - runs as a background task without stalling request handling, and
//! - reports every cycle as a structured, serializable [`CleanupReport`].
//!
//! It never interprets file contents and never blocks on other writers; it
//! only observes directory metadata and removes whole session directories.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use custodian::{start_cleanup_worker, CustodianConfig, StorageManager};
//!
//! # async fn start() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CustodianConfig::from_file("custodian.toml")?;
//! custodian::observability::init_tracing(&config.observability)?;
//!
//! let manager = Arc::new(StorageManager::new(config.cleanup)?);
//! tokio::spawn(start_cleanup_worker(Arc::clone(&manager)));
//!
//! // Manual trigger, e.g. from an administrative endpoint:
//! let report = manager.run_once().await?;
//! println!("deleted {} sessions", report.total_deleted());
//! # Ok(())
//! # }
//! ```
//!
//! [`CleanupReport`]: storage::CleanupReport

pub mod config;
pub mod observability;
pub mod storage;

pub use config::{CleanupConfig, ConfigError, CustodianConfig};
pub use storage::{
    start_cleanup_worker, CleanupError, CleanupMode, CleanupReport, StorageManager, StorageStatus,
};
