//! Log command implementations.

use std::path::PathBuf;

use colored::Colorize;
use serde::Serialize;

use crate::cli::LogCommands;
use crate::cli::commands::{clean_notes, open_storage, resolve_date};
use crate::error::{Error, Result};
use crate::model::ActivityLog;

/// Output for log list.
#[derive(Serialize)]
struct LogListOutput<'a> {
    logs: &'a [ActivityLog],
    count: usize,
}

/// Execute log commands.
///
/// # Errors
///
/// Returns an error if input is invalid, the activity or log is unknown, or
/// the store cannot be read or written.
pub fn execute(command: &LogCommands, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    match command {
        LogCommands::Mark {
            activity,
            date,
            notes,
        } => mark(activity, date.as_deref(), notes.as_deref(), db_path, json),
        LogCommands::Unmark { activity, date } => unmark(activity, date.as_deref(), db_path, json),
        LogCommands::List { activity } => list(activity.as_deref(), db_path, json),
    }
}

fn mark(
    activity: &str,
    date: Option<&str>,
    notes: Option<&str>,
    db_path: Option<&PathBuf>,
    json: bool,
) -> Result<()> {
    let date = resolve_date(date)?;
    let notes = notes.and_then(clean_notes);

    let mut storage = open_storage(db_path)?;
    let target = storage.resolve_activity(activity)?;
    let log = storage.set_completion(&target.id, &date, true, notes.as_deref())?;

    if json {
        println!("{}", serde_json::to_string(&log)?);
    } else {
        println!("{} {} on {}", "✓".green(), target.name.bold(), log.date);
    }
    Ok(())
}

fn unmark(activity: &str, date: Option<&str>, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let date = resolve_date(date)?;

    let mut storage = open_storage(db_path)?;
    let target = storage.resolve_activity(activity)?;
    if storage.get_log(&target.id, &date)?.is_none() {
        return Err(Error::LogNotFound {
            activity_id: target.id,
            date,
        });
    }
    let log = storage.set_completion(&target.id, &date, false, None)?;

    if json {
        println!("{}", serde_json::to_string(&log)?);
    } else {
        println!("{} {} on {}", "✗".red(), target.name.bold(), log.date);
    }
    Ok(())
}

fn list(activity: Option<&str>, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let storage = open_storage(db_path)?;
    let activity_id = activity
        .map(|a| storage.resolve_activity(a).map(|found| found.id))
        .transpose()?;
    let logs = storage.list_logs(activity_id.as_deref())?;

    if json {
        let output = LogListOutput {
            logs: &logs,
            count: logs.len(),
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    if logs.is_empty() {
        println!("No logs recorded.");
        return Ok(());
    }

    for log in &logs {
        let mark = if log.completed {
            "✓".green()
        } else {
            "✗".red()
        };
        let notes = log.notes.as_deref().unwrap_or_default();
        println!(
            "  {mark} {}  {}  {}",
            log.date,
            log.activity_id.dimmed(),
            notes
        );
    }
    Ok(())
}
