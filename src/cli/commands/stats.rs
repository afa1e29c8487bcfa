//! Stats command implementation.

use std::path::PathBuf;

use chrono::Local;
use colored::Colorize;
use serde::Serialize;

use crate::cli::commands::open_storage;
use crate::error::Result;
use crate::stats::{ActivityStats, DaySummary, compute_stats, daily_summaries};

/// Output for stats.
#[derive(Serialize)]
struct StatsOutput {
    days: u32,
    activities: Vec<ActivityStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    heatmap: Option<Vec<DaySummary>>,
}

/// Execute the stats command.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn execute(days: u32, heatmap: bool, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let storage = open_storage(db_path)?;
    let activities = storage.list_activities()?;
    let logs = storage.list_logs(None)?;
    let today = Local::now().date_naive();

    let stats = compute_stats(&activities, &logs, today, days);
    let heatmap = heatmap.then(|| daily_summaries(&activities, &logs, today, days));

    if json {
        let output = StatsOutput {
            days,
            activities: stats,
            heatmap,
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    if stats.is_empty() {
        println!("No activities yet.");
        return Ok(());
    }

    println!("{}", format!("Last {days} days").cyan().bold());
    for entry in &stats {
        println!(
            "  {}  {} done ({:.0}%)  streak {}  best {}",
            entry.name.bold(),
            entry.total_completions,
            entry.completion_rate * 100.0,
            entry.current_streak.to_string().green(),
            entry.longest_streak
        );
    }

    if let Some(days) = heatmap {
        println!();
        let row: String = days.iter().map(|day| level_glyph(day.level)).collect();
        println!("  {row}");
    }
    Ok(())
}

fn level_glyph(level: u8) -> char {
    match level {
        0 => '·',
        1 => '░',
        2 => '▒',
        3 => '▓',
        _ => '█',
    }
}
