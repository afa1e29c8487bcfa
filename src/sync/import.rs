//! Backup import.
//!
//! Importing happens in two layers:
//!
//! - [`ImportPipeline`] turns raw file text into sanitized records or a list
//!   of problems. It never fails with an `Err`; malformed input is data.
//! - [`Importer`] applies an accepted bundle to the store, either merging it
//!   into the existing records or replacing them.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::model::{Activity, ActivityLog, ImportedData};
use crate::storage::SqliteStorage;
use crate::sync::file::read_backup_file;
use crate::sync::merge::{merge, merge_by_id};
use crate::sync::types::{ImportMode, ImportStats};
use crate::validate::{
    SchemaValidator, ValidationError, ValidationLimits, sanitize, truncate_chars,
};

/// Outcome of running the import pipeline over raw text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sanitized_data: Option<ImportedData>,
}

impl ValidationResult {
    fn rejected(errors: Vec<ValidationError>) -> Self {
        Self {
            valid: false,
            errors,
            sanitized_data: None,
        }
    }

    fn accepted(data: ImportedData) -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            sanitized_data: Some(data),
        }
    }
}

/// The two arrays the pipeline reads; `exportedAt` and `version` are ignored.
#[derive(Deserialize)]
struct RawBundle {
    activities: Vec<Activity>,
    logs: Vec<ActivityLog>,
}

/// Parse, validate, and sanitize backup text.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportPipeline {
    validator: SchemaValidator,
}

impl ImportPipeline {
    #[must_use]
    pub const fn new(limits: ValidationLimits) -> Self {
        Self {
            validator: SchemaValidator::new(limits),
        }
    }

    /// Run the pipeline.
    ///
    /// A JSON syntax error stops before structural validation. Validator
    /// errors are returned unchanged. Only an accepted bundle carries
    /// `sanitized_data`.
    #[must_use]
    pub fn run(&self, raw: &str) -> ValidationResult {
        let value: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => {
                debug!(error = %e, "import text is not JSON");
                return ValidationResult::rejected(vec![ValidationError::new(
                    "file",
                    format!("Invalid JSON format: {e}"),
                )]);
            }
        };

        let report = self.validator.validate(&value);
        if !report.valid {
            debug!(errors = report.errors.len(), "import failed validation");
            return ValidationResult::rejected(report.errors);
        }

        let bundle: RawBundle = match serde_json::from_value(value) {
            Ok(bundle) => bundle,
            Err(e) => {
                return ValidationResult::rejected(vec![ValidationError::new(
                    "data",
                    format!("Unreadable backup data: {e}"),
                )]);
            }
        };

        let limits = self.validator.limits();
        let activities: Vec<Activity> = bundle
            .activities
            .into_iter()
            .map(|activity| sanitize_activity(activity, limits))
            .collect();
        let logs: Vec<ActivityLog> = bundle
            .logs
            .into_iter()
            .map(|log| sanitize_log(log, limits))
            .collect();

        // A name made only of markup is empty once sanitized; stored names
        // must keep at least one character.
        let blank_names: Vec<ValidationError> = activities
            .iter()
            .enumerate()
            .filter(|(_, activity)| activity.name.is_empty())
            .map(|(i, _)| {
                ValidationError::at(
                    format!("activities[{i}].name"),
                    "Activity name cannot be empty",
                    i,
                )
            })
            .collect();
        if !blank_names.is_empty() {
            return ValidationResult::rejected(blank_names);
        }

        debug!(
            activities = activities.len(),
            logs = logs.len(),
            "import accepted"
        );
        ValidationResult::accepted(ImportedData { activities, logs })
    }
}

fn sanitize_activity(activity: Activity, limits: &ValidationLimits) -> Activity {
    Activity {
        id: activity.id.trim().to_string(),
        name: truncate_chars(&sanitize(&activity.name), limits.max_name_length),
        ..activity
    }
}

fn sanitize_log(log: ActivityLog, limits: &ValidationLimits) -> ActivityLog {
    ActivityLog {
        id: log.id.trim().to_string(),
        activity_id: log.activity_id.trim().to_string(),
        date: log.date.trim().to_string(),
        notes: log
            .notes
            .as_deref()
            .map(|notes| truncate_chars(&sanitize(notes), limits.max_notes_length)),
        ..log
    }
}

/// Run the pipeline with the default limits.
#[must_use]
pub fn import_from_text(raw: &str) -> ValidationResult {
    ImportPipeline::default().run(raw)
}

/// Sanitized records when `raw` is an acceptable bundle, `None` otherwise.
#[must_use]
pub fn import_data(raw: &str) -> Option<ImportedData> {
    import_from_text(raw).sanitized_data
}

/// Applies accepted backups to the store.
pub struct Importer<'a> {
    storage: &'a mut SqliteStorage,
    mode: ImportMode,
    pipeline: ImportPipeline,
}

impl<'a> Importer<'a> {
    #[must_use]
    pub fn new(storage: &'a mut SqliteStorage, mode: ImportMode) -> Self {
        Self {
            storage,
            mode,
            pipeline: ImportPipeline::default(),
        }
    }

    #[must_use]
    pub fn with_limits(mut self, limits: ValidationLimits) -> Self {
        self.pipeline = ImportPipeline::new(limits);
        self
    }

    /// Import a backup file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is rejected by the
    /// pipeline, or the store cannot be written.
    pub fn import_file(&mut self, path: &Path) -> Result<ImportStats> {
        let max_bytes = self.pipeline.validator.limits().max_import_bytes;
        let raw = read_backup_file(path, max_bytes)?;
        debug!(path = %path.display(), bytes = raw.len(), "read backup file");
        self.import_text(&raw)
    }

    /// Import backup text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ImportRejected`] carrying every problem found, or a
    /// database error if the store cannot be written.
    pub fn import_text(&mut self, raw: &str) -> Result<ImportStats> {
        let result = self.pipeline.run(raw);
        let Some(data) = result.sanitized_data else {
            warn!(errors = result.errors.len(), "import rejected");
            return Err(Error::ImportRejected {
                errors: result.errors,
            });
        };

        let stats = match self.mode {
            ImportMode::Merge => self.apply_merge(data)?,
            ImportMode::Replace => self.apply_replace(data)?,
        };

        info!(
            mode = ?self.mode,
            added = stats.total_added(),
            skipped = stats.total_skipped(),
            "import complete"
        );
        Ok(stats)
    }

    fn apply_merge(&mut self, data: ImportedData) -> Result<ImportStats> {
        let existing_activities = self.storage.list_activities()?;
        let existing_logs = self.storage.list_logs(None)?;

        let merged = merge(existing_activities, existing_logs, data.activities, data.logs);
        self.storage.replace_all(&merged.activities, &merged.logs)?;
        Ok(merged.stats)
    }

    fn apply_replace(&mut self, data: ImportedData) -> Result<ImportStats> {
        let (old_activities, old_logs) = self.storage.counts()?;

        // Repeated ids within the bundle keep their first occurrence.
        let (activities, mut activity_stats) = merge_by_id(Vec::new(), data.activities);
        let (logs, mut log_stats) = merge_by_id(Vec::new(), data.logs);
        self.storage.replace_all(&activities, &logs)?;

        activity_stats.removed = old_activities;
        log_stats.removed = old_logs;
        Ok(ImportStats {
            activities: activity_stats,
            logs: log_stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::export::to_json;

    const EXERCISE: &str = r##"{"activities":[{"id":"a1","name":"Exercise","color":"#10B981","createdAt":"2024-01-15T10:00:00.000Z"}],"logs":[]}"##;

    fn activity(id: &str, name: &str) -> Activity {
        Activity {
            id: id.to_string(),
            name: name.to_string(),
            color: "#10B981".to_string(),
            created_at: "2024-01-15T10:00:00.000Z".to_string(),
            updated_at: None,
        }
    }

    fn log(id: &str, activity_id: &str, notes: Option<&str>) -> ActivityLog {
        ActivityLog {
            id: id.to_string(),
            activity_id: activity_id.to_string(),
            date: "2024-01-15".to_string(),
            completed: true,
            notes: notes.map(str::to_string),
            created_at: "2024-01-15T10:00:00.000Z".to_string(),
        }
    }

    #[test]
    fn test_accepts_minimal_activity() {
        let result = import_from_text(EXERCISE);

        assert!(result.valid);
        assert!(result.errors.is_empty());
        let data = result.sanitized_data.unwrap();
        assert_eq!(data.activities[0].name, "Exercise");
        assert!(data.logs.is_empty());
    }

    #[test]
    fn test_rejects_empty_fields() {
        let result =
            import_from_text(r#"{"activities":[{"id":"","name":"","color":"red"}],"logs":[]}"#);

        assert!(!result.valid);
        assert!(result.sanitized_data.is_none());

        let fields: Vec<&str> = result.errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"activities[0].id"));
        assert!(fields.contains(&"activities[0].name"));
        assert!(fields.contains(&"activities[0].color"));
        assert!(fields.contains(&"activities[0].createdAt"));
        assert!(result.errors.len() >= 4);
    }

    #[test]
    fn test_invalid_json_short_circuits() {
        let result = import_from_text("{not json");

        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].field, "file");
        assert!(result.errors[0].message.starts_with("Invalid JSON format"));
    }

    #[test]
    fn test_validator_errors_pass_through() {
        let result = import_from_text(r#"{"activities":{},"logs":[]}"#);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].field, "activities");
        assert_eq!(result.errors[0].message, "Activities must be an array");
    }

    #[test]
    fn test_sanitizes_and_trims() {
        let raw = r##"{
            "activities": [{
                "id": "a1",
                "name": "<b>Read</b> &amp; write",
                "color": "#abc",
                "createdAt": "2024-01-15"
            }],
            "logs": [{
                "id": "l1",
                "activityId": "a1",
                "date": "2024-01-15",
                "completed": false,
                "notes": "<script>alert(1)</script>done",
                "createdAt": "2024-01-15T10:00:00Z"
            }]
        }"##;

        let data = import_data(raw).unwrap();
        assert_eq!(data.activities[0].name, "Read & write");
        assert_eq!(data.activities[0].color, "#abc");
        assert_eq!(data.logs[0].notes.as_deref(), Some("alert(1)done"));
        assert!(!data.logs[0].completed);
    }

    #[test]
    fn test_truncates_after_sanitizing() {
        // 100 visible chars wrapped in markup: not over the limit once stripped.
        let name = format!("<i>{}</i>", "a".repeat(100));
        let notes = "n".repeat(1000);
        let raw = serde_json::json!({
            "activities": [{
                "id": "a1",
                "name": name,
                "color": "#fff",
                "createdAt": "2024-01-15T10:00:00.000Z"
            }],
            "logs": [{
                "id": "l1",
                "activityId": "a1",
                "date": "2024-01-15",
                "completed": true,
                "notes": notes,
                "createdAt": "2024-01-15T10:00:00.000Z"
            }]
        })
        .to_string();

        // The raw name is 107 chars, so the validator rejects it first.
        let result = import_from_text(&raw);
        assert!(!result.valid);
        assert_eq!(result.errors[0].field, "activities[0].name");

        let short = format!("<i>{}</i>", "a".repeat(90));
        let raw = raw.replace(&name, &short);
        let data = import_data(&raw).unwrap();
        assert_eq!(data.activities[0].name, "a".repeat(90));
        assert_eq!(data.logs[0].notes.as_deref().map(str::len), Some(1000));
    }

    #[test]
    fn test_markup_only_name_rejected() {
        let raw = r##"{"activities":[{"id":"a1","name":"<img src=x>","color":"#fff","createdAt":"2024-01-15"}],"logs":[]}"##;
        let result = import_from_text(raw);

        assert!(!result.valid);
        assert_eq!(result.errors[0].field, "activities[0].name");
        assert_eq!(result.errors[0].index, Some(0));
    }

    #[test]
    fn test_null_notes_accepted() {
        let raw = r##"{"activities":[],"logs":[{"id":"l1","activityId":"missing","date":"2024-02-29","completed":true,"notes":null,"createdAt":"2024-02-29T08:00:00.000Z"}]}"##;
        let data = import_data(raw).unwrap();
        assert_eq!(data.logs[0].notes, None);
        assert_eq!(data.logs[0].activity_id, "missing");
    }

    #[test]
    fn test_round_trip_clean_data() {
        let mut updated = activity("a2", "Read");
        updated.updated_at = Some("2024-02-01T09:30:00.000Z".to_string());
        let activities = vec![activity("a1", "Exercise"), updated];
        let logs = vec![
            log("l1", "a1", Some("30 minutes, felt \"great\"")),
            log("l2", "a2", None),
        ];

        let json = to_json(&activities, &logs).unwrap();
        let data = import_data(&json).unwrap();

        assert_eq!(data.activities, activities);
        assert_eq!(data.logs, logs);
    }

    #[test]
    fn test_merge_mode_keeps_existing() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        storage
            .replace_all(&[activity("a1", "Local")], &[log("l1", "a1", None)])
            .unwrap();

        let raw = serde_json::json!({
            "activities": [activity("a1", "Imported"), activity("a2", "New")],
            "logs": [log("l1", "a1", Some("other")), log("l2", "a2", None)],
        })
        .to_string();

        let stats = Importer::new(&mut storage, ImportMode::Merge)
            .import_text(&raw)
            .unwrap();

        assert_eq!(stats.activities.added, 1);
        assert_eq!(stats.activities.skipped, 1);
        assert_eq!(stats.logs.added, 1);
        assert_eq!(stats.logs.skipped, 1);

        let activities = storage.list_activities().unwrap();
        assert_eq!(activities.len(), 2);
        assert_eq!(activities.iter().find(|a| a.id == "a1").unwrap().name, "Local");
    }

    #[test]
    fn test_replace_mode_discards_existing() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        storage
            .replace_all(&[activity("old", "Old")], &[log("l0", "old", None)])
            .unwrap();

        let stats = Importer::new(&mut storage, ImportMode::Replace)
            .import_text(EXERCISE)
            .unwrap();

        assert_eq!(stats.activities.added, 1);
        assert_eq!(stats.activities.removed, 1);
        assert_eq!(stats.logs.removed, 1);

        let activities = storage.list_activities().unwrap();
        assert_eq!(activities.len(), 1);
        assert_eq!(activities[0].id, "a1");
        assert!(storage.list_logs(None).unwrap().is_empty());
    }

    #[test]
    fn test_replace_mode_drops_repeated_ids() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        storage.replace_all(&[activity("old", "Old")], &[]).unwrap();
        let raw = serde_json::json!({
            "activities": [activity("a1", "First"), activity("a1", "Second")],
            "logs": [log("l1", "a1", Some("one")), log("l1", "a1", Some("two"))],
        })
        .to_string();

        let stats = Importer::new(&mut storage, ImportMode::Replace)
            .import_text(&raw)
            .unwrap();

        assert_eq!(stats.activities.added, 1);
        assert_eq!(stats.activities.skipped, 1);
        assert_eq!(stats.activities.removed, 1);
        assert_eq!(stats.logs.added, 1);
        assert_eq!(stats.logs.skipped, 1);

        let activities = storage.list_activities().unwrap();
        assert_eq!(activities.len(), 1);
        assert_eq!(activities[0].name, "First");
        let logs = storage.list_logs(None).unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].notes.as_deref(), Some("one"));
    }

    #[test]
    fn test_rejected_import_leaves_store_untouched() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        storage.replace_all(&[activity("a1", "Local")], &[]).unwrap();

        let err = Importer::new(&mut storage, ImportMode::Replace)
            .import_text(r#"{"activities":[{"id":"bad id"}],"logs":[]}"#)
            .unwrap_err();

        assert!(matches!(err, Error::ImportRejected { .. }));
        assert_eq!(storage.list_activities().unwrap().len(), 1);
    }

    #[test]
    fn test_custom_limits() {
        let limits = ValidationLimits {
            max_activities: 1,
            ..ValidationLimits::default()
        };
        let mut storage = SqliteStorage::open_memory().unwrap();
        let raw = serde_json::json!({
            "activities": [activity("a1", "One"), activity("a2", "Two")],
            "logs": [],
        })
        .to_string();

        let err = Importer::new(&mut storage, ImportMode::Merge)
            .with_limits(limits)
            .import_text(&raw)
            .unwrap_err();
        assert_eq!(err.to_string(), "Import rejected: Too many activities (maximum 1)");
    }
}
