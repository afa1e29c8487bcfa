//! Configuration management.
//!
//! The tracker keeps a single database per user at
//! `~/.activity-tracker/data/tracker.db`. Backups are written to the current
//! directory unless a path is given.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Environment variable naming an explicit database file.
pub const DB_ENV: &str = "TRACKER_DB";

/// Environment variable switching to the isolated test database.
pub const TEST_DB_ENV: &str = "TRACKER_TEST_DB";

/// Get the global tracker directory location (`~/.activity-tracker/`).
#[must_use]
pub fn global_tracker_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".activity-tracker"))
}

/// Whether an environment flag value means "on".
///
/// Empty, `0`, and `false` (any case) are off; everything else is on.
#[must_use]
pub fn is_truthy(value: &str) -> bool {
    !value.is_empty() && value != "0" && !value.eq_ignore_ascii_case("false")
}

/// Check if test mode is enabled via `TRACKER_TEST_DB`.
#[must_use]
pub fn is_test_mode() -> bool {
    std::env::var(TEST_DB_ENV).is_ok_and(|v| is_truthy(&v))
}

/// Get the test database path (`~/.activity-tracker/test/tracker.db`).
#[must_use]
pub fn test_db_path() -> Option<PathBuf> {
    global_tracker_dir().map(|dir| dir.join("test").join("tracker.db"))
}

/// Resolve the database path.
///
/// Priority:
/// 1. If `explicit_path` is provided, use it directly
/// 2. `TRACKER_TEST_DB` environment variable → uses test database
/// 3. `TRACKER_DB` environment variable
/// 4. Global location: `~/.activity-tracker/data/tracker.db`
///
/// # Returns
///
/// Returns the path to the database file, or `None` if no home directory
/// can be determined.
#[must_use]
pub fn resolve_db_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return Some(path.to_path_buf());
    }

    if is_test_mode() {
        return test_db_path();
    }

    if let Ok(db_path) = std::env::var(DB_ENV) {
        if !db_path.trim().is_empty() {
            return Some(PathBuf::from(db_path));
        }
    }

    global_tracker_dir().map(|dir| dir.join("data").join("tracker.db"))
}

/// Like [`resolve_db_path`], but an unresolvable location is an error.
///
/// # Errors
///
/// Returns [`Error::Config`] when no home directory can be determined.
pub fn require_db_path(explicit_path: Option<&Path>) -> Result<PathBuf> {
    resolve_db_path(explicit_path).ok_or_else(|| {
        Error::Config(format!(
            "Could not determine a database location; pass --db or set {DB_ENV}"
        ))
    })
}

/// Directory that receives backups when no output path is given.
///
/// # Errors
///
/// Returns an error if the current directory is unavailable.
pub fn default_export_dir() -> Result<PathBuf> {
    Ok(std::env::current_dir()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_db_path_with_explicit() {
        let explicit = PathBuf::from("/custom/path/tracker.db");
        let result = resolve_db_path(Some(&explicit));
        assert_eq!(result, Some(explicit.clone()));
        assert_eq!(require_db_path(Some(&explicit)).unwrap(), explicit);
    }

    #[test]
    fn test_resolve_db_path_default_is_a_db_file() {
        let path = resolve_db_path(None).unwrap();
        assert!(path.extension().is_some_and(|ext| ext == "db"));
    }

    #[test]
    fn test_test_db_path_is_separate() {
        let global = global_tracker_dir().unwrap();
        let test = test_db_path().unwrap();

        assert!(test.to_string_lossy().contains("test"));
        assert!(test.ends_with("tracker.db"));
        assert_ne!(global.join("data").join("tracker.db"), test);
    }

    #[test]
    fn test_truthy_values() {
        for off in ["", "0", "false", "FALSE", "False"] {
            assert!(!is_truthy(off), "{off:?} should be off");
        }
        for on in ["1", "true", "yes"] {
            assert!(is_truthy(on), "{on:?} should be on");
        }
    }
}
