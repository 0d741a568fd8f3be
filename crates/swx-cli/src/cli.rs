//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Activity logger.
///
/// Records when you switch between activities and reports how long you spent
/// on each.
#[derive(Debug, Parser)]
#[command(name = "swx", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Switch to an activity, or stop if no activity is given.
    #[command(visible_alias = "s")]
    Switch(SwitchArgs),

    /// Rename an activity throughout the log.
    Rename {
        /// Activity to rename (a regular expression with --regex).
        old: String,

        /// New name. With --regex, `$1`-style capture references are expanded.
        new: String,

        /// Treat OLD as a regular expression and replace each match.
        #[arg(short, long)]
        regex: bool,
    },

    /// List stints, one per line.
    #[command(visible_alias = "p")]
    Print(PrintArgs),

    /// Show the activity in progress.
    Current,

    /// List recent activities, newest first.
    Recent {
        /// Maximum number of activities to list.
        #[arg(default_value_t = 10)]
        count: usize,
    },

    /// Show the effective configuration.
    Config,
}

/// Arguments for `swx switch`.
#[derive(Debug, Args)]
pub struct SwitchArgs {
    /// Activity name. Multiple words are joined with spaces.
    pub activity: Vec<String>,

    /// When the switch happened, instead of now.
    #[arg(short, long)]
    pub at: Option<String>,

    /// Replace the most recent entry instead of adding one.
    #[arg(long)]
    pub amend: bool,

    /// Allow switching to an activity not yet in the log.
    #[arg(short = 'C', long)]
    pub create: bool,

    /// Treat the activity as a regular expression and switch to the most
    /// recent activity it matches.
    #[arg(short, long)]
    pub regex: bool,
}

/// Arguments for `swx print`.
#[derive(Debug, Args)]
pub struct PrintArgs {
    /// Only list stints of this activity.
    pub activity: Vec<String>,

    /// Start of the period.
    #[arg(short, long)]
    pub begin: Option<String>,

    /// End of the period.
    #[arg(short, long)]
    pub end: Option<String>,

    /// Treat the activity as a regular expression.
    #[arg(short, long)]
    pub regex: bool,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}
