//! CLI definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::stats::{DEFAULT_WINDOW_DAYS, MAX_WINDOW_DAYS};
use crate::sync::{ExportFormat, ImportMode};

pub mod commands;

/// Activity tracker - daily habits, streaks, and backups
#[derive(Parser, Debug)]
#[command(name = "tracker", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Database path (default: ~/.activity-tracker/data/tracker.db)
    #[arg(long, global = true, env = "TRACKER_DB")]
    pub db: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print version information
    Version,

    /// Activity management
    Activity {
        #[command(subcommand)]
        command: ActivityCommands,
    },

    /// Daily completion logs
    Log {
        #[command(subcommand)]
        command: LogCommands,
    },

    /// Completion statistics and streaks
    Stats {
        /// Number of days to look back, including today
        #[arg(
            long,
            default_value_t = DEFAULT_WINDOW_DAYS,
            value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_WINDOW_DAYS))
        )]
        days: u32,

        /// Include the per-day heatmap levels
        #[arg(long)]
        heatmap: bool,
    },

    /// Export all data to a backup file
    Export {
        /// Output format
        #[arg(long, value_enum, default_value_t)]
        format: ExportFormatArg,

        /// Output file (default: ./activity-tracker-backup-<date>.<ext>)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import a JSON backup file
    Import {
        /// Backup file to import
        file: PathBuf,

        /// Replace all existing data instead of merging
        #[arg(long)]
        replace: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completions.
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

/// Export format flag values.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportFormatArg {
    /// Importable JSON bundle (default)
    #[default]
    Json,
    /// Spreadsheet-friendly CSV
    Csv,
}

impl From<ExportFormatArg> for ExportFormat {
    fn from(arg: ExportFormatArg) -> Self {
        match arg {
            ExportFormatArg::Json => Self::Json,
            ExportFormatArg::Csv => Self::Csv,
        }
    }
}

/// Import mode from the `--replace` flag.
#[must_use]
pub const fn import_mode(replace: bool) -> ImportMode {
    if replace {
        ImportMode::Replace
    } else {
        ImportMode::Merge
    }
}

// ============================================================================
// Activity Commands
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum ActivityCommands {
    /// Create a new activity
    Add {
        /// Activity name
        name: String,

        /// Heatmap color (#RGB or #RRGGBB)
        #[arg(long, short)]
        color: Option<String>,
    },

    /// List activities
    List,

    /// Rename or recolor an activity
    Update {
        /// Activity ID or name
        id: String,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New color (#RGB or #RRGGBB)
        #[arg(long, short)]
        color: Option<String>,
    },

    /// Delete an activity and its logs
    Delete {
        /// Activity ID or name
        id: String,
    },
}

// ============================================================================
// Log Commands
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum LogCommands {
    /// Mark an activity completed for a day
    Mark {
        /// Activity ID or name
        activity: String,

        /// Day (YYYY-MM-DD, default: today)
        #[arg(long, short)]
        date: Option<String>,

        /// Notes for the day
        #[arg(long, short)]
        notes: Option<String>,
    },

    /// Mark an activity not completed for a day
    Unmark {
        /// Activity ID or name
        activity: String,

        /// Day (YYYY-MM-DD, default: today)
        #[arg(long, short)]
        date: Option<String>,
    },

    /// List logs
    List {
        /// Only logs for this activity (ID or name)
        #[arg(long, short)]
        activity: Option<String>,
    },
}
