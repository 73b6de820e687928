//! CLI argument definitions using clap derive

use crate::config::LogFormat;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// cachepost - post-job cache decision step
///
/// Runs after a CI job, checks whether the job succeeded, and saves the
/// build cache prepared by the pre-job step when policy allows.
#[derive(Parser, Debug)]
#[command(name = "cachepost")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, env = "CACHEPOST_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log output format (overrides the config file)
    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,

    /// Decide and log, but do not run the save command
    #[arg(long)]
    pub dry_run: bool,

    /// Append the decision as a JSON line to this file
    #[arg(long, env = "CACHEPOST_DECISION_LOG")]
    pub decision_log: Option<PathBuf>,
}
