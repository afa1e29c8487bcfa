//! SQLite storage implementation.
//!
//! Activities and logs are kept in insertion order (`position`), so a merge
//! that appends imported records after existing ones reads back in the same
//! order it was written.

use std::path::Path;
use std::time::Duration;

use rusqlite::{Connection, OptionalExtension, Transaction};
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{Activity, ActivityLog, new_id, timestamp_now};
use crate::storage::schema::apply_schema;
use crate::validate::find_similar;

/// Maximum suggestions offered when an activity lookup misses.
const MAX_SUGGESTIONS: usize = 3;

const ACTIVITY_COLUMNS: &str = "id, name, color, created_at, updated_at";
const LOG_COLUMNS: &str = "id, activity_id, date, completed, notes, created_at";

/// SQLite-based storage backend.
#[derive(Debug)]
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Open a database at the given path.
    ///
    /// Creates parent directories and applies the schema if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema fails.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_timeout(path, None)
    }

    /// Open a database with an optional busy timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema fails.
    pub fn open_with_timeout(path: &Path, timeout_ms: Option<u64>) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.busy_timeout(timeout_ms.map_or(Duration::from_secs(5), Duration::from_millis))?;

        apply_schema(&conn)?;
        debug!(path = %path.display(), "opened database");
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Get a reference to the underlying connection (for read operations).
    #[must_use]
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Run `f` inside an IMMEDIATE transaction, committing on success.
    ///
    /// # Errors
    ///
    /// Returns an error if any step fails. The transaction is rolled back on error.
    fn mutate<F, R>(&mut self, op: &str, f: F) -> Result<R>
    where
        F: FnOnce(&Transaction) -> Result<R>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;

        let result = f(&tx)?;
        tx.commit()?;

        debug!(op, "committed");
        Ok(result)
    }

    // ===================
    // Activity Operations
    // ===================

    /// Create a new activity with a fresh id.
    ///
    /// `name` and `color` are stored as given; callers validate them.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_activity(&mut self, name: &str, color: &str) -> Result<Activity> {
        let activity = Activity {
            id: new_id(),
            name: name.to_string(),
            color: color.to_string(),
            created_at: timestamp_now(),
            updated_at: None,
        };

        self.mutate("create_activity", |tx| {
            let position = next_position(tx, "activities")?;
            insert_activity(tx, &activity, position)?;
            Ok(())
        })?;

        Ok(activity)
    }

    /// Get an activity by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_activity(&self, id: &str) -> Result<Option<Activity>> {
        let activity = self
            .conn
            .query_row(
                &format!("SELECT {ACTIVITY_COLUMNS} FROM activities WHERE id = ?1"),
                [id],
                map_activity_row,
            )
            .optional()?;

        Ok(activity)
    }

    /// List all activities in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_activities(&self) -> Result<Vec<Activity>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ACTIVITY_COLUMNS} FROM activities ORDER BY position, rowid"
        ))?;

        let rows = stmt.query_map([], map_activity_row)?;
        let activities = rows.collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(activities)
    }

    /// Find an activity by exact ID, then by case-insensitive name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ActivityNotFoundSimilar`] with close names when
    /// there are any, [`Error::ActivityNotFound`] otherwise.
    pub fn resolve_activity(&self, id_or_name: &str) -> Result<Activity> {
        if let Some(activity) = self.get_activity(id_or_name)? {
            return Ok(activity);
        }

        let activities = self.list_activities()?;
        let needle = id_or_name.to_lowercase();
        if let Some(activity) = activities
            .iter()
            .find(|a| a.name.to_lowercase() == needle)
        {
            return Ok(activity.clone());
        }

        let similar = find_similar(
            id_or_name,
            activities.iter().map(|a| a.name.as_str()),
            MAX_SUGGESTIONS,
        );
        if similar.is_empty() {
            Err(Error::ActivityNotFound {
                id: id_or_name.to_string(),
            })
        } else {
            Err(Error::ActivityNotFoundSimilar {
                id: id_or_name.to_string(),
                similar,
            })
        }
    }

    /// Update an activity's name and/or color, stamping `updatedAt`.
    ///
    /// # Errors
    ///
    /// Returns an error if the activity does not exist or the update fails.
    pub fn update_activity(
        &mut self,
        id: &str,
        name: Option<&str>,
        color: Option<&str>,
    ) -> Result<Activity> {
        let now = timestamp_now();

        self.mutate("update_activity", |tx| {
            let rows = tx.execute(
                "UPDATE activities
                 SET name = COALESCE(?2, name), color = COALESCE(?3, color), updated_at = ?4
                 WHERE id = ?1",
                rusqlite::params![id, name, color, now],
            )?;

            if rows == 0 {
                return Err(Error::ActivityNotFound { id: id.to_string() });
            }
            Ok(())
        })?;

        self.get_activity(id)?
            .ok_or_else(|| Error::ActivityNotFound { id: id.to_string() })
    }

    /// Delete an activity and all of its logs.
    ///
    /// Returns the number of logs removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the activity does not exist or the delete fails.
    pub fn delete_activity(&mut self, id: &str) -> Result<usize> {
        self.mutate("delete_activity", |tx| {
            let rows = tx.execute("DELETE FROM activities WHERE id = ?1", [id])?;
            if rows == 0 {
                return Err(Error::ActivityNotFound { id: id.to_string() });
            }

            let logs = tx.execute("DELETE FROM activity_logs WHERE activity_id = ?1", [id])?;
            Ok(logs)
        })
    }

    // ==============
    // Log Operations
    // ==============

    /// List logs in insertion order, optionally for one activity.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_logs(&self, activity_id: Option<&str>) -> Result<Vec<ActivityLog>> {
        let logs = if let Some(activity_id) = activity_id {
            let mut stmt = self.conn.prepare(&format!(
                "SELECT {LOG_COLUMNS} FROM activity_logs
                 WHERE activity_id = ?1 ORDER BY position, rowid"
            ))?;
            let rows = stmt.query_map([activity_id], map_log_row)?;
            rows.collect::<std::result::Result<Vec<_>, _>>()?
        } else {
            let mut stmt = self.conn.prepare(&format!(
                "SELECT {LOG_COLUMNS} FROM activity_logs ORDER BY position, rowid"
            ))?;
            let rows = stmt.query_map([], map_log_row)?;
            rows.collect::<std::result::Result<Vec<_>, _>>()?
        };

        Ok(logs)
    }

    /// Get the log for an activity on a given day.
    ///
    /// Imported data may hold several logs for the same day; the earliest
    /// one is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_log(&self, activity_id: &str, date: &str) -> Result<Option<ActivityLog>> {
        let log = self
            .conn
            .query_row(
                &format!(
                    "SELECT {LOG_COLUMNS} FROM activity_logs
                     WHERE activity_id = ?1 AND date = ?2
                     ORDER BY position, rowid LIMIT 1"
                ),
                [activity_id, date],
                map_log_row,
            )
            .optional()?;

        Ok(log)
    }

    /// Record whether an activity was completed on a day.
    ///
    /// Updates the day's existing log, or inserts one. Existing notes are
    /// kept when `notes` is `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn set_completion(
        &mut self,
        activity_id: &str,
        date: &str,
        completed: bool,
        notes: Option<&str>,
    ) -> Result<ActivityLog> {
        let existing = self.get_log(activity_id, date)?;

        let log = match existing {
            Some(log) => ActivityLog {
                completed,
                notes: notes.map(str::to_string).or(log.notes),
                ..log
            },
            None => ActivityLog {
                id: new_id(),
                activity_id: activity_id.to_string(),
                date: date.to_string(),
                completed,
                notes: notes.map(str::to_string),
                created_at: timestamp_now(),
            },
        };

        self.mutate("set_completion", |tx| {
            let rows = tx.execute(
                "UPDATE activity_logs SET completed = ?2, notes = ?3 WHERE id = ?1",
                rusqlite::params![log.id, log.completed, log.notes],
            )?;
            if rows == 0 {
                let position = next_position(tx, "activity_logs")?;
                insert_log(tx, &log, position)?;
            }
            Ok(())
        })?;

        Ok(log)
    }

    // ==============
    // Bulk Operations
    // ==============

    /// Replace the whole data set in one transaction.
    ///
    /// Records keep the order of the given slices.
    ///
    /// # Errors
    ///
    /// Returns an error if any write fails; nothing is changed in that case.
    pub fn replace_all(&mut self, activities: &[Activity], logs: &[ActivityLog]) -> Result<()> {
        self.mutate("replace_all", |tx| {
            tx.execute("DELETE FROM activity_logs", [])?;
            tx.execute("DELETE FROM activities", [])?;

            for (position, activity) in (0_i64..).zip(activities) {
                insert_activity(tx, activity, position)?;
            }
            for (position, log) in (0_i64..).zip(logs) {
                insert_log(tx, log, position)?;
            }
            Ok(())
        })?;

        debug!(
            activities = activities.len(),
            logs = logs.len(),
            "replaced data set"
        );
        Ok(())
    }

    /// Number of stored activities and logs.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn counts(&self) -> Result<(usize, usize)> {
        let (activities, logs): (i64, i64) = self.conn.query_row(
            "SELECT (SELECT COUNT(*) FROM activities), (SELECT COUNT(*) FROM activity_logs)",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        Ok((
            usize::try_from(activities).unwrap_or_default(),
            usize::try_from(logs).unwrap_or_default(),
        ))
    }
}

// Helper to pick the next insertion position in a table
fn next_position(tx: &Transaction, table: &str) -> Result<i64> {
    let position: i64 = tx.query_row(
        &format!("SELECT COALESCE(MAX(position), -1) + 1 FROM {table}"),
        [],
        |row| row.get(0),
    )?;
    Ok(position)
}

fn insert_activity(tx: &Transaction, activity: &Activity, position: i64) -> Result<()> {
    tx.execute(
        "INSERT INTO activities (id, name, color, created_at, updated_at, position)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
            activity.id,
            activity.name,
            activity.color,
            activity.created_at,
            activity.updated_at,
            position
        ],
    )?;
    Ok(())
}

fn insert_log(tx: &Transaction, log: &ActivityLog, position: i64) -> Result<()> {
    tx.execute(
        "INSERT INTO activity_logs (id, activity_id, date, completed, notes, created_at, position)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        rusqlite::params![
            log.id,
            log.activity_id,
            log.date,
            log.completed,
            log.notes,
            log.created_at,
            position
        ],
    )?;
    Ok(())
}

// Helper to map activity rows
fn map_activity_row(row: &rusqlite::Row) -> rusqlite::Result<Activity> {
    Ok(Activity {
        id: row.get(0)?,
        name: row.get(1)?,
        color: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

// Helper to map log rows
fn map_log_row(row: &rusqlite::Row) -> rusqlite::Result<ActivityLog> {
    Ok(ActivityLog {
        id: row.get(0)?,
        activity_id: row.get(1)?,
        date: row.get(2)?,
        completed: row.get(3)?,
        notes: row.get(4)?,
        created_at: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn activity(id: &str, name: &str) -> Activity {
        Activity {
            id: id.to_string(),
            name: name.to_string(),
            color: "#fff".to_string(),
            created_at: "2024-01-01T00:00:00.000Z".to_string(),
            updated_at: None,
        }
    }

    fn log(id: &str, activity_id: &str, date: &str) -> ActivityLog {
        ActivityLog {
            id: id.to_string(),
            activity_id: activity_id.to_string(),
            date: date.to_string(),
            completed: true,
            notes: None,
            created_at: "2024-01-01T00:00:00.000Z".to_string(),
        }
    }

    #[test]
    fn test_open_memory() {
        let storage = SqliteStorage::open_memory();
        assert!(storage.is_ok());
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("tracker.db");

        SqliteStorage::open(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_activity_crud() {
        let mut storage = SqliteStorage::open_memory().unwrap();

        // Create
        let created = storage.create_activity("Exercise", "#10B981").unwrap();
        assert!(crate::validate::is_valid_id(&created.id));
        assert!(created.updated_at.is_none());

        // Read
        let fetched = storage.get_activity(&created.id).unwrap().unwrap();
        assert_eq!(fetched, created);

        // Update
        let updated = storage
            .update_activity(&created.id, Some("Running"), None)
            .unwrap();
        assert_eq!(updated.name, "Running");
        assert_eq!(updated.color, "#10B981");
        assert!(updated.updated_at.is_some());

        // Delete
        storage
            .set_completion(&created.id, "2024-01-01", true, None)
            .unwrap();
        let removed_logs = storage.delete_activity(&created.id).unwrap();
        assert_eq!(removed_logs, 1);
        assert!(storage.get_activity(&created.id).unwrap().is_none());
        assert_eq!(storage.counts().unwrap(), (0, 0));
    }

    #[test]
    fn test_missing_activity_errors() {
        let mut storage = SqliteStorage::open_memory().unwrap();

        assert!(matches!(
            storage.update_activity("nope", Some("x"), None),
            Err(Error::ActivityNotFound { .. })
        ));
        assert!(matches!(
            storage.delete_activity("nope"),
            Err(Error::ActivityNotFound { .. })
        ));
    }

    #[test]
    fn test_list_keeps_insertion_order() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        storage
            .replace_all(&[activity("z", "Zed"), activity("a", "Ay")], &[])
            .unwrap();
        let created = storage.create_activity("Third", "#000").unwrap();

        let ids: Vec<String> = storage
            .list_activities()
            .unwrap()
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(ids, vec!["z".to_string(), "a".to_string(), created.id]);
    }

    #[test]
    fn test_resolve_activity() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        storage
            .replace_all(&[activity("a1", "Exercise"), activity("a2", "Reading")], &[])
            .unwrap();

        assert_eq!(storage.resolve_activity("a2").unwrap().name, "Reading");
        assert_eq!(storage.resolve_activity("exercise").unwrap().id, "a1");

        match storage.resolve_activity("Excercise") {
            Err(Error::ActivityNotFoundSimilar { similar, .. }) => {
                assert_eq!(similar, vec!["Exercise".to_string()]);
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(matches!(
            storage.resolve_activity("zzzzzzzzzzzz"),
            Err(Error::ActivityNotFound { .. })
        ));
    }

    #[test]
    fn test_set_completion_upserts() {
        let mut storage = SqliteStorage::open_memory().unwrap();

        let first = storage
            .set_completion("a1", "2024-03-01", true, Some("morning run"))
            .unwrap();
        let second = storage
            .set_completion("a1", "2024-03-01", false, None)
            .unwrap();

        assert_eq!(first.id, second.id);
        assert!(!second.completed);
        assert_eq!(second.notes.as_deref(), Some("morning run"));

        let logs = storage.list_logs(Some("a1")).unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0], second);
    }

    #[test]
    fn test_list_logs_filter() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        storage
            .replace_all(
                &[],
                &[
                    log("l1", "a1", "2024-01-01"),
                    log("l2", "a2", "2024-01-01"),
                    log("l3", "a1", "2024-01-02"),
                ],
            )
            .unwrap();

        assert_eq!(storage.list_logs(None).unwrap().len(), 3);
        let ids: Vec<String> = storage
            .list_logs(Some("a1"))
            .unwrap()
            .into_iter()
            .map(|l| l.id)
            .collect();
        assert_eq!(ids, vec!["l1".to_string(), "l3".to_string()]);
    }

    #[test]
    fn test_replace_all_is_atomic() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        storage.replace_all(&[activity("keep", "Keep")], &[]).unwrap();

        // Duplicate primary keys make the second insert fail.
        let result = storage.replace_all(&[activity("x", "X"), activity("x", "Y")], &[]);
        assert!(result.is_err());

        let activities = storage.list_activities().unwrap();
        assert_eq!(activities.len(), 1);
        assert_eq!(activities[0].id, "keep");
    }

    #[test]
    fn test_round_trip_optional_fields() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        let mut edited = activity("a1", "Edited");
        edited.updated_at = Some("2024-02-01T00:00:00.000Z".to_string());
        let mut noted = log("l1", "a1", "2024-01-01");
        noted.notes = Some("notes, with \"quotes\"".to_string());
        noted.completed = false;

        storage.replace_all(&[edited.clone()], &[noted.clone()]).unwrap();

        assert_eq!(storage.list_activities().unwrap(), vec![edited]);
        assert_eq!(storage.list_logs(None).unwrap(), vec![noted]);
        assert_eq!(storage.counts().unwrap(), (1, 1));
    }
}
