//! Session directory inventory.
//!
//! A session is an immediate child directory of the managed root. The scan
//! tolerates entries vanishing or becoming unreadable mid-walk (other parts
//! of the server create and serve these directories concurrently) and
//! returns the survivors oldest-first.

use std::{
    fs, io,
    path::{Path, PathBuf},
    time::{Duration, SystemTime},
};

use tracing::warn;

/// One cleanable session directory.
#[derive(Debug, Clone)]
pub struct SessionDir {
    /// Absolute path of the directory.
    pub path: PathBuf,
    /// Modification time of the directory inode itself. Files written inside
    /// without touching the directory do not refresh this.
    pub modified: SystemTime,
}

impl SessionDir {
    /// Directory name for logging.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Age relative to `now`. Directories with a future mtime have age zero.
    pub fn age(&self, now: SystemTime) -> Duration {
        now.duration_since(self.modified).unwrap_or_default()
    }
}

/// List the immediate child directories of `root`, oldest mtime first.
///
/// Non-directory entries are ignored. Entries whose metadata cannot be read
/// (permissions, concurrent deletion) are skipped with a warning; only a
/// failure to read `root` itself is an error.
pub fn scan_sessions(root: &Path) -> io::Result<Vec<SessionDir>> {
    let mut sessions = Vec::new();

    for entry in fs::read_dir(root)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                warn!(error = %error, "Skipping unreadable directory entry");
                continue;
            }
        };

        let metadata = match entry.metadata() {
            Ok(metadata) => metadata,
            Err(error) => {
                warn!(
                    path = %entry.path().display(),
                    error = %error,
                    "Skipping entry with unreadable metadata"
                );
                continue;
            }
        };

        if !metadata.is_dir() {
            continue;
        }

        let modified = match metadata.modified() {
            Ok(modified) => modified,
            Err(error) => {
                warn!(
                    path = %entry.path().display(),
                    error = %error,
                    "Skipping directory without a modification time"
                );
                continue;
            }
        };

        sessions.push(SessionDir {
            path: entry.path(),
            modified,
        });
    }

    sessions.sort_by_key(|session| session.modified);
    Ok(sessions)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use filetime::FileTime;
    use tempfile::TempDir;

    use super::*;

    fn backdate(path: &Path, secs_ago: u64) {
        let mtime = SystemTime::now() - Duration::from_secs(secs_ago);
        filetime::set_file_mtime(path, FileTime::from_system_time(mtime)).unwrap();
    }

    #[test]
    fn test_scan_orders_oldest_first() {
        let root = TempDir::new().unwrap();
        for (name, age_secs) in [("b", 100), ("a", 300), ("c", 200)] {
            let dir = root.path().join(name);
            fs::create_dir(&dir).unwrap();
            backdate(&dir, age_secs);
        }

        let sessions = scan_sessions(root.path()).unwrap();
        let names: Vec<String> = sessions.iter().map(SessionDir::name).collect();
        assert_eq!(names, ["a", "c", "b"]);
    }

    #[test]
    fn test_scan_ignores_files() {
        let root = TempDir::new().unwrap();
        fs::create_dir(root.path().join("session")).unwrap();
        fs::write(root.path().join("stray.yml"), "x: 1").unwrap();

        let sessions = scan_sessions(root.path()).unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].name(), "session");
    }

    #[test]
    fn test_scan_missing_root_is_error() {
        let root = TempDir::new().unwrap();
        let gone = root.path().join("missing");
        assert!(scan_sessions(&gone).is_err());
    }

    #[test]
    fn test_age_of_future_mtime_is_zero() {
        let session = SessionDir {
            path: PathBuf::from("/tmp/s"),
            modified: SystemTime::now() + Duration::from_secs(3600),
        };
        assert_eq!(session.age(SystemTime::now()), Duration::ZERO);
    }
}
