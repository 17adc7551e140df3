//! Metric recording for the cleanup worker.
//!
//! Thin wrappers over the `metrics` facade so call sites stay terse and
//! metric names live in one place.

use metrics::counter;

/// Record sessions deleted by a cleanup pass.
///
/// * `resource` - `"expired_sessions"` for the age pass,
///   `"evicted_sessions"` for the disk-pressure pass
/// * `count` - the number of directories deleted
pub fn record_cleanup_deletion(resource: &str, count: u64) {
    counter!(
        "storage_cleanup_deletions_total",
        "resource" => resource.to_string()
    )
    .increment(count);
}

/// Record bytes freed by a cleanup pass.
pub fn record_cleanup_freed_bytes(bytes: u64) {
    counter!("storage_cleanup_freed_bytes_total").increment(bytes);
}

/// Record a failed cleanup cycle.
pub fn record_cleanup_error(job: &str) {
    counter!(
        "storage_cleanup_errors_total",
        "job" => job.to_string()
    )
    .increment(1);
}
