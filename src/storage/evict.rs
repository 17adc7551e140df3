//! Eviction of session directories.
//!
//! Deletion failures are never fatal: a directory may have been removed by
//! another process between scan and eviction, or contain entries the server
//! cannot delete. The executor logs, reports "nothing freed", and the sweep
//! moves on to the next candidate.

use std::{fs, path::Path};

use tracing::{error, info};
use walkdir::WalkDir;

use crate::storage::inventory::SessionDir;

/// Total size in bytes of all files under `path`.
///
/// Best effort: entries that cannot be read contribute zero rather than
/// aborting the walk, so the result is a lower bound under concurrent
/// modification.
pub(crate) fn dir_size(path: &Path) -> u64 {
    WalkDir::new(path)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.metadata().ok())
        .map(|metadata| metadata.len())
        .sum()
}

/// Recursively delete one session directory.
///
/// Returns the bytes freed (measured before deletion), or `None` if the
/// delete failed. Failure is logged here; callers just skip the candidate.
pub(crate) fn delete_session(session: &SessionDir) -> Option<u64> {
    let freed = dir_size(&session.path);

    match fs::remove_dir_all(&session.path) {
        Ok(()) => {
            info!(
                session = %session.name(),
                freed_bytes = freed,
                "Deleted session directory"
            );
            Some(freed)
        }
        Err(e) => {
            error!(
                session = %session.name(),
                path = %session.path.display(),
                error = %e,
                "Failed to delete session directory"
            );
            None
        }
    }
}
