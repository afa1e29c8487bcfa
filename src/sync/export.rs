//! Backup export.
//!
//! Two encodings of the same data:
//!
//! - **JSON**: the importable bundle `{activities, logs, exportedAt, version}`,
//!   pretty-printed with two-space indentation so backups diff cleanly.
//! - **CSV**: a single document with an `# Activities` section and a `# Logs`
//!   section separated by a blank line, for spreadsheets.
//!
//! Encoding is pure; [`Exporter`] wires it to the store and the filesystem.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use serde::Serialize;
use tracing::info;

use crate::csv_escape;
use crate::error::Result;
use crate::model::{Activity, ActivityLog, EXPORT_FORMAT_VERSION, timestamp_now};
use crate::storage::SqliteStorage;
use crate::sync::file::atomic_write;
use crate::sync::types::{ExportFormat, ExportStats, SyncResult};

/// Prefix of every backup file name.
pub const BACKUP_FILE_PREFIX: &str = "activity-tracker-backup";

const ACTIVITY_HEADER: &str = "id,name,color,createdAt,updatedAt";
const LOG_HEADER: &str = "id,activityId,date,completed,notes,createdAt";

/// Borrowed view of the bundle, so exporting never clones the data set.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BundleRef<'a> {
    activities: &'a [Activity],
    logs: &'a [ActivityLog],
    exported_at: &'a str,
    version: &'a str,
}

/// Encode a JSON bundle stamped with the current time.
///
/// # Errors
///
/// Returns an error only if serialization fails.
pub fn to_json(activities: &[Activity], logs: &[ActivityLog]) -> SyncResult<String> {
    to_json_at(activities, logs, &timestamp_now())
}

/// Encode a JSON bundle with an explicit `exportedAt` value.
///
/// # Errors
///
/// Returns an error only if serialization fails.
pub fn to_json_at(
    activities: &[Activity],
    logs: &[ActivityLog],
    exported_at: &str,
) -> SyncResult<String> {
    let bundle = BundleRef {
        activities,
        logs,
        exported_at,
        version: EXPORT_FORMAT_VERSION,
    };
    Ok(serde_json::to_string_pretty(&bundle)?)
}

/// Encode the two-section CSV document.
#[must_use]
pub fn to_csv(activities: &[Activity], logs: &[ActivityLog]) -> String {
    let mut lines: Vec<String> = Vec::with_capacity(activities.len() + logs.len() + 5);

    lines.push("# Activities".to_string());
    lines.push(ACTIVITY_HEADER.to_string());
    for activity in activities {
        lines.push(
            [
                csv_escape(&activity.id),
                csv_escape(&activity.name),
                csv_escape(&activity.color),
                csv_escape(&activity.created_at),
                csv_escape(activity.updated_at.as_deref().unwrap_or_default()),
            ]
            .join(","),
        );
    }

    lines.push(String::new());
    lines.push("# Logs".to_string());
    lines.push(LOG_HEADER.to_string());
    for log in logs {
        lines.push(
            [
                csv_escape(&log.id),
                csv_escape(&log.activity_id),
                csv_escape(&log.date),
                log.completed.to_string(),
                csv_escape(log.notes.as_deref().unwrap_or_default()),
                csv_escape(&log.created_at),
            ]
            .join(","),
        );
    }

    lines.join("\n")
}

/// Encode in the requested format.
///
/// # Errors
///
/// Returns an error only if JSON serialization fails.
pub fn encode(
    format: ExportFormat,
    activities: &[Activity],
    logs: &[ActivityLog],
) -> SyncResult<String> {
    match format {
        ExportFormat::Json => to_json(activities, logs),
        ExportFormat::Csv => Ok(to_csv(activities, logs)),
    }
}

/// Backup file name for a given day: `activity-tracker-backup-YYYY-MM-DD.<ext>`.
#[must_use]
pub fn backup_file_name(format: ExportFormat, date: NaiveDate) -> String {
    format!(
        "{BACKUP_FILE_PREFIX}-{}.{}",
        date.format("%Y-%m-%d"),
        format.extension()
    )
}

/// Backup file name for today's local date.
#[must_use]
pub fn default_backup_file_name(format: ExportFormat) -> String {
    backup_file_name(format, Local::now().date_naive())
}

/// Exporter for backup files.
///
/// Reads the full data set from the store and writes it in one of the
/// supported encodings.
pub struct Exporter<'a> {
    storage: &'a SqliteStorage,
    format: ExportFormat,
}

impl<'a> Exporter<'a> {
    #[must_use]
    pub fn new(storage: &'a SqliteStorage, format: ExportFormat) -> Self {
        Self { storage, format }
    }

    /// Encode the current store contents.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn render(&self) -> Result<(String, ExportStats)> {
        let activities = self.storage.list_activities()?;
        let logs = self.storage.list_logs(None)?;

        let stats = ExportStats {
            activities: activities.len(),
            logs: logs.len(),
        };
        let contents = encode(self.format, &activities, &logs)?;
        Ok((contents, stats))
    }

    /// Write the backup to `output`, or to today's default file name in
    /// `dir` when no explicit path is given.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or the file cannot be written.
    pub fn export_to(&self, output: Option<&Path>, dir: &Path) -> Result<(PathBuf, ExportStats)> {
        let path = output.map_or_else(
            || dir.join(default_backup_file_name(self.format)),
            Path::to_path_buf,
        );

        let (contents, stats) = self.render()?;
        atomic_write(&path, &contents)?;

        info!(
            path = %path.display(),
            format = %self.format,
            activities = stats.activities,
            logs = stats.logs,
            "export complete"
        );
        Ok((path, stats))
    }
}
