//! Activity command implementations.

use std::path::PathBuf;

use colored::Colorize;
use serde::Serialize;

use crate::cli::ActivityCommands;
use crate::cli::commands::{check_color, clean_name, open_storage};
use crate::error::{Error, Result};
use crate::model::{Activity, DEFAULT_ACTIVITY_COLOR};

/// Output for activity list.
#[derive(Serialize)]
struct ActivityListOutput<'a> {
    activities: &'a [Activity],
    count: usize,
}

/// Output for activity delete.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ActivityDeleteOutput<'a> {
    id: &'a str,
    name: &'a str,
    logs_removed: usize,
}

/// Execute activity commands.
///
/// # Errors
///
/// Returns an error if input is invalid, the activity is unknown, or the
/// store cannot be read or written.
pub fn execute(command: &ActivityCommands, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    match command {
        ActivityCommands::Add { name, color } => add(name, color.as_deref(), db_path, json),
        ActivityCommands::List => list(db_path, json),
        ActivityCommands::Update { id, name, color } => {
            update(id, name.as_deref(), color.as_deref(), db_path, json)
        }
        ActivityCommands::Delete { id } => delete(id, db_path, json),
    }
}

fn add(name: &str, color: Option<&str>, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let name = clean_name(name)?;
    let color = check_color(color.unwrap_or(DEFAULT_ACTIVITY_COLOR))?;

    let mut storage = open_storage(db_path)?;
    let activity = storage.create_activity(&name, &color)?;

    if json {
        println!("{}", serde_json::to_string(&activity)?);
    } else {
        println!(
            "Created activity: {} {}",
            activity.name.bold(),
            format!("({})", activity.id).dimmed()
        );
    }
    Ok(())
}

fn list(db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let storage = open_storage(db_path)?;
    let activities = storage.list_activities()?;

    if json {
        let output = ActivityListOutput {
            activities: &activities,
            count: activities.len(),
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    if activities.is_empty() {
        println!("No activities yet. Create one with `tracker activity add <name>`.");
        return Ok(());
    }

    println!("{}", format!("Activities ({})", activities.len()).cyan().bold());
    for activity in &activities {
        println!(
            "  {} {}  {}",
            activity.color.dimmed(),
            activity.name.bold(),
            activity.id.dimmed()
        );
    }
    Ok(())
}

fn update(
    id: &str,
    name: Option<&str>,
    color: Option<&str>,
    db_path: Option<&PathBuf>,
    json: bool,
) -> Result<()> {
    if name.is_none() && color.is_none() {
        return Err(Error::InvalidArgument(
            "Nothing to update: pass --name and/or --color".to_string(),
        ));
    }
    let name = name.map(clean_name).transpose()?;
    let color = color.map(check_color).transpose()?;

    let mut storage = open_storage(db_path)?;
    let target = storage.resolve_activity(id)?;
    let activity = storage.update_activity(&target.id, name.as_deref(), color.as_deref())?;

    if json {
        println!("{}", serde_json::to_string(&activity)?);
    } else {
        println!("Updated activity: {} ({})", activity.name.bold(), activity.color);
    }
    Ok(())
}

fn delete(id: &str, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let mut storage = open_storage(db_path)?;
    let target = storage.resolve_activity(id)?;
    let logs_removed = storage.delete_activity(&target.id)?;

    if json {
        let output = ActivityDeleteOutput {
            id: &target.id,
            name: &target.name,
            logs_removed,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!(
            "Deleted activity: {} ({logs_removed} logs removed)",
            target.name.bold()
        );
    }
    Ok(())
}
