use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Timeline scheduling for milestone, epic and task plans.
/// Storage defaults to ~/.pm/timeline.json or a path passed via --db.
#[derive(Parser)]
#[command(name = "pmt", version, about = "Schedule milestones, epics and tasks onto a timeline")]
pub struct Cli {
    /// Path to the JSON snapshot file.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Reference instant for undated items: YYYY-MM-DD, RFC 3339, "today", or "in Nd".
    #[arg(long, global = true)]
    pub now: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}
