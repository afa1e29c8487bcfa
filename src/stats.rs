//! Completion statistics.
//!
//! Everything here is computed over a window of `days` calendar days ending
//! on (and including) `today`. Logs with unparseable dates, logs for other
//! activities, and logs marked not completed are ignored. Several completed
//! logs on the same day count once.

use std::collections::{BTreeSet, HashMap};

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::model::{Activity, ActivityLog};
use crate::validate::parse_calendar_date;

/// Default stats window.
pub const DEFAULT_WINDOW_DAYS: u32 = 30;

/// Longest window accepted, about ten years.
pub const MAX_WINDOW_DAYS: u32 = 3650;

/// Per-activity completion summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityStats {
    pub activity_id: String,
    pub name: String,
    /// Distinct completed days in the window.
    pub total_completions: usize,
    /// Consecutive completed days ending today, or yesterday when today is
    /// not yet marked.
    pub current_streak: usize,
    pub longest_streak: usize,
    /// `total_completions / days`, in `0.0..=1.0`.
    pub completion_rate: f64,
}

/// One day of the heatmap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub date: NaiveDate,
    pub completed: usize,
    pub level: u8,
}

/// First day of a window of `days` days ending on `today`.
fn window_start(today: NaiveDate, days: u32) -> NaiveDate {
    let back = Duration::days(i64::from(days.clamp(1, MAX_WINDOW_DAYS)) - 1);
    today.checked_sub_signed(back).unwrap_or(NaiveDate::MIN)
}

/// Completed days for one activity inside the window.
fn completed_days(
    activity_id: &str,
    logs: &[ActivityLog],
    today: NaiveDate,
    days: u32,
) -> BTreeSet<NaiveDate> {
    let start = window_start(today, days);
    logs.iter()
        .filter(|log| log.completed && log.activity_id == activity_id)
        .filter_map(|log| parse_calendar_date(&log.date))
        .filter(|date| (start..=today).contains(date))
        .collect()
}

fn current_streak(days: &BTreeSet<NaiveDate>, today: NaiveDate) -> usize {
    let mut check = if days.contains(&today) {
        today
    } else {
        match today.pred_opt() {
            Some(yesterday) => yesterday,
            None => return 0,
        }
    };

    let mut streak = 0;
    while days.contains(&check) {
        streak += 1;
        match check.pred_opt() {
            Some(prev) => check = prev,
            None => break,
        }
    }
    streak
}

fn longest_streak(days: &BTreeSet<NaiveDate>) -> usize {
    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;

    for &day in days {
        run = match previous {
            Some(prev) if prev.succ_opt() == Some(day) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(day);
    }
    longest
}

/// Compute stats for one activity.
#[must_use]
pub fn activity_stats(
    activity: &Activity,
    logs: &[ActivityLog],
    today: NaiveDate,
    days: u32,
) -> ActivityStats {
    let completed = completed_days(&activity.id, logs, today, days);
    let total = completed.len();

    #[allow(clippy::cast_precision_loss)]
    let completion_rate = if days == 0 {
        0.0
    } else {
        total as f64 / f64::from(days.min(MAX_WINDOW_DAYS))
    };

    ActivityStats {
        activity_id: activity.id.clone(),
        name: activity.name.clone(),
        total_completions: total,
        current_streak: current_streak(&completed, today),
        longest_streak: longest_streak(&completed),
        completion_rate,
    }
}

/// Compute stats for every activity, in the given order.
#[must_use]
pub fn compute_stats(
    activities: &[Activity],
    logs: &[ActivityLog],
    today: NaiveDate,
    days: u32,
) -> Vec<ActivityStats> {
    activities
        .iter()
        .map(|activity| activity_stats(activity, logs, today, days))
        .collect()
}

/// Heatmap intensity for a day: 0 when nothing was completed, otherwise
/// 1..=4 by quartile of `completed / total`.
#[must_use]
pub fn heatmap_level(completed: usize, total: usize) -> u8 {
    if completed == 0 || total == 0 {
        return 0;
    }

    // Integer comparisons: completed/total <= n/4  <=>  4*completed <= n*total
    let scaled = completed.saturating_mul(4);
    if scaled <= total {
        1
    } else if scaled <= total.saturating_mul(2) {
        2
    } else if scaled <= total.saturating_mul(3) {
        3
    } else {
        4
    }
}

/// Per-day completion counts across all activities, oldest day first.
///
/// Only logs of known activities count, so the level never exceeds 4.
#[must_use]
pub fn daily_summaries(
    activities: &[Activity],
    logs: &[ActivityLog],
    today: NaiveDate,
    days: u32,
) -> Vec<DaySummary> {
    let mut per_day: HashMap<NaiveDate, usize> = HashMap::new();
    for activity in activities {
        for day in completed_days(&activity.id, logs, today, days) {
            *per_day.entry(day).or_default() += 1;
        }
    }

    let total = activities.len();
    window_start(today, days)
        .iter_days()
        .take_while(|day| *day <= today)
        .map(|date| {
            let completed = per_day.get(&date).copied().unwrap_or_default();
            DaySummary {
                date,
                completed,
                level: heatmap_level(completed, total),
            }
        })
        .collect()
}
