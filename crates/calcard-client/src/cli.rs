//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// calcard - Your Home Assistant calendars as a day-grouped agenda
#[derive(Debug, Parser)]
#[command(name = "calcard")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "CALCARD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// Output the agenda in JSON format
    #[arg(long)]
    pub json: bool,

    /// Write log lines as JSON objects
    #[arg(long)]
    pub log_json: bool,

    /// Override the number of days to show
    #[arg(long)]
    pub days: Option<u32>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the agenda once (the default)
    Agenda,

    /// Keep refreshing the agenda and announce new events
    Watch {
        /// Refresh interval in seconds (defaults to the card's refreshInterval)
        #[arg(long, short)]
        interval: Option<u64>,
    },

    /// Validate the configuration
    Check,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump the current configuration
    Dump,
    /// Show the configuration file path
    Path,
}
