//! Command-line interface definition.

use clap::{Parser, Subcommand};
use saadhana_core::{Category, Priority, PriorityFilter};

#[derive(Parser)]
#[command(
    name = "saadhana",
    version = env!("CARGO_PKG_VERSION"),
    about = "Track daily and goal-oriented spiritual practices",
    long_about = None
)]
pub struct Cli {
    /// Database path (defaults to $SAADHANA_DB_PATH, then the temp directory)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Absolute directory for rolling log files; logging is off when omitted
    #[arg(global = true, long = "log-dir")]
    pub log_dir: Option<String>,

    /// Log level used with --log-dir
    #[arg(global = true, long = "log-level")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check core linkage
    Ping,

    /// Show practices grouped into overdue/today/upcoming/no due date/completed
    List {
        /// Priority filter: all, low, medium or high
        #[arg(long, default_value = "all")]
        filter: PriorityFilter,

        /// Case-insensitive title search
        #[arg(long, default_value = "")]
        search: String,

        /// Evaluate as of this date (YYYY-MM-DD) instead of the local date
        #[arg(long)]
        today: Option<String>,
    },

    /// Add a practice
    Add {
        title: String,

        #[arg(long, default_value = "goal")]
        category: Category,

        #[arg(long, default_value = "medium")]
        priority: Priority,

        /// Due date (YYYY-MM-DD), meaningful for goals
        #[arg(long)]
        due: Option<String>,

        /// Time of day, e.g. 06:00
        #[arg(long)]
        time: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Tag label; repeatable
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// Mark a practice complete, capturing an optional reflection
    Done {
        id: i64,

        #[arg(long, default_value = "")]
        reflection: String,
    },

    /// Reopen a completed practice (clears its reflection)
    Reopen { id: i64 },

    /// Delete a practice
    Delete { id: i64 },
}
