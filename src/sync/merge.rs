//! Existing-wins merge of imported records into the current data set.
//!
//! Existing records are kept unchanged and in order. Imported records are
//! appended in their own order, skipping any whose id is already present.
//! Appended ids join the seen set, so an import that repeats an id only
//! contributes its first occurrence. Activities and logs are merged
//! independently; logs are not checked against activities.

use std::collections::HashSet;

use tracing::debug;

use crate::model::{Activity, ActivityLog, Identified};
use crate::sync::types::{EntityStats, ImportStats};

/// Result of merging two data sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergedData {
    pub activities: Vec<Activity>,
    pub logs: Vec<ActivityLog>,
    pub stats: ImportStats,
}

/// Merge one entity type by id.
#[must_use]
pub fn merge_by_id<T: Identified>(existing: Vec<T>, imported: Vec<T>) -> (Vec<T>, EntityStats) {
    let mut seen: HashSet<String> = existing.iter().map(|e| e.id().to_string()).collect();
    let mut stats = EntityStats::default();
    let mut merged = existing;
    merged.reserve(imported.len());

    for item in imported {
        if seen.insert(item.id().to_string()) {
            merged.push(item);
            stats.added += 1;
        } else {
            stats.skipped += 1;
        }
    }

    (merged, stats)
}

/// Merge imported activities and logs into existing ones.
#[must_use]
pub fn merge(
    existing_activities: Vec<Activity>,
    existing_logs: Vec<ActivityLog>,
    imported_activities: Vec<Activity>,
    imported_logs: Vec<ActivityLog>,
) -> MergedData {
    let (activities, activity_stats) = merge_by_id(existing_activities, imported_activities);
    let (logs, log_stats) = merge_by_id(existing_logs, imported_logs);

    debug!(
        activities_added = activity_stats.added,
        activities_skipped = activity_stats.skipped,
        logs_added = log_stats.added,
        logs_skipped = log_stats.skipped,
        "merged imported data"
    );

    MergedData {
        activities,
        logs,
        stats: ImportStats {
            activities: activity_stats,
            logs: log_stats,
        },
    }
}
