//! # pmt - Timeline CLI
//!
//! Command-line front end for the `pm_timeline` engine. It reads a JSON
//! snapshot of projects, milestones, epics and tasks, schedules them, and
//! prints the result as a table, JSON, CSV or an interactive Gantt view.
//!
//! ## Quick Start
//!
//! ```bash
//! # Print the whole timeline
//! pmt timeline
//!
//! # Status and progress of every milestone and epic in one project
//! pmt summary --project "Mobile App"
//!
//! # Reproducible output: pin "now" for undated items
//! pmt --now 2024-01-01 timeline --json
//!
//! # Interactive Gantt view
//! pmt gantt
//! ```
//!
//! Data is read from `~/.pm/timeline.json` unless `--db` is given. Set
//! `RUST_LOG=debug` to see what each assembly pass did.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

pub mod cli;
pub mod cmd;
pub mod tui {
    pub mod colors;
    pub mod gantt;
    pub mod run;
}

use cli::Cli;
use cmd::*;
use pm_timeline::Snapshot;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    if let Commands::Completions { shell } = cli.command {
        cmd_completions(shell);
        return;
    }

    let db_path = cli.db.clone().unwrap_or_else(|| {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        default_db_path(&PathBuf::from(home))
    });

    let snapshot = match Snapshot::load(&db_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to load {}: {}", db_path.display(), e);
            std::process::exit(1);
        }
    };

    let now = match resolve_now(cli.now.as_deref()) {
        Ok(now) => now,
        Err(e) => {
            eprintln!("{e:#}");
            std::process::exit(1);
        }
    };
    tracing::debug!(db = %db_path.display(), %now, "starting");

    let result = match cli.command {
        Commands::Timeline { project, kind, json } => cmd_timeline(&snapshot, now, project, kind, json),
        Commands::Summary { project, status, json } => cmd_summary(&snapshot, now, project, status, json),
        Commands::Check => cmd_check(&snapshot),
        Commands::Export { output, project } => cmd_export(&snapshot, now, output, project),
        Commands::Projects => {
            cmd_projects(&snapshot);
            Ok(())
        }
        Commands::Gantt { project } => cmd_gantt(&snapshot, now, project),
        Commands::Completions { .. } => unreachable!("completions handled above"),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
