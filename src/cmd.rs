//! Command implementations for the CLI interface.
//!
//! Each handler loads what it needs from the snapshot, runs one pure
//! assembly pass and prints the result. The CLI is the caller the engine
//! expects: it owns the clock and it decides what to warn about.

use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local, Utc};
use clap::Subcommand;
use clap_complete::{generate, Shell};

use pm_timeline::dates::parse_date_input;
use pm_timeline::db::{print_schedule_table, print_summary_table, schedule_to_csv};
use pm_timeline::project::resolve_project_identifier;
use pm_timeline::timeline::validate;
use pm_timeline::{
    dangling_references, depths, ContainerStatus, Epic, EntitySource, Milestone, NodeKind,
    Snapshot, Task, Timeline,
};

use crate::tui::run::run_gantt_tui;

#[derive(Subcommand)]
pub enum Commands {
    /// Print the scheduled timeline.
    Timeline {
        /// Project id or name.
        #[arg(long)]
        project: Option<String>,
        /// Only show nodes of this kind.
        #[arg(long, value_enum)]
        kind: Option<NodeKind>,
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Print derived status and progress for every milestone and epic.
    Summary {
        /// Project id or name.
        #[arg(long)]
        project: Option<String>,
        /// Only show containers with this status.
        #[arg(long, value_enum)]
        status: Option<ContainerStatus>,
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Validate the snapshot and report dangling references.
    Check,

    /// Export the schedule to CSV format.
    Export {
        /// Output file path (default: timeline.csv)
        #[arg(long, short)]
        output: Option<String>,
        /// Project id or name.
        #[arg(long)]
        project: Option<String>,
    },

    /// List projects in the snapshot.
    Projects,

    /// Launch the interactive Gantt view.
    Gantt {
        /// Project id or name.
        #[arg(long)]
        project: Option<String>,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// The entities one command works on.
struct Scope {
    title: String,
    milestones: Vec<Milestone>,
    epics: Vec<Epic>,
    tasks: Vec<Task>,
}

impl Scope {
    fn assemble(&self, now: DateTime<Utc>) -> Result<Timeline> {
        warn_dangling(self);
        Timeline::assemble(&self.milestones, &self.epics, &self.tasks, now)
            .with_context(|| format!("Cannot schedule {}", self.title))
    }
}

/// Select the whole snapshot, or one project's entities through the
/// data-access seam.
fn load_scope(snapshot: &Snapshot, project: Option<&str>) -> Result<Scope> {
    match project {
        None => Ok(Scope {
            title: "all projects".to_string(),
            milestones: snapshot.milestones.clone(),
            epics: snapshot.epics.clone(),
            tasks: snapshot.tasks.clone(),
        }),
        Some(identifier) => {
            let id = match resolve_project_identifier(identifier, &snapshot.projects) {
                Ok(id) => id,
                Err(e) => bail!(e),
            };
            let name = snapshot
                .projects
                .iter()
                .find(|p| p.id == id)
                .map(|p| p.name.clone())
                .unwrap_or_else(|| id.clone());
            let (milestones, epics, tasks) = snapshot.project_snapshot(&id);
            Ok(Scope { title: name, milestones, epics, tasks })
        }
    }
}

fn warn_dangling(scope: &Scope) {
    for d in dangling_references(&scope.milestones, &scope.epics, &scope.tasks) {
        tracing::warn!(
            from = %d.from,
            field = d.field,
            target = %d.target,
            "reference does not resolve, scheduling without it"
        );
    }
}

/// Resolve the reference instant: `--now` when given, the system clock otherwise.
pub fn resolve_now(arg: Option<&str>) -> Result<DateTime<Utc>> {
    match arg {
        None => Ok(Utc::now()),
        Some(s) => match parse_date_input(s, Local::now().date_naive()) {
            Some(now) => Ok(now),
            None => bail!("Invalid --now value '{}'", s),
        },
    }
}

/// Print the scheduled timeline as an indented table or JSON.
pub fn cmd_timeline(
    snapshot: &Snapshot,
    now: DateTime<Utc>,
    project: Option<String>,
    kind: Option<NodeKind>,
    json: bool,
) -> Result<()> {
    let scope = load_scope(snapshot, project.as_deref())?;
    let timeline = scope.assemble(now)?;

    // Depths come from the full forest so filtered rows keep their indentation.
    let depths = depths(&timeline.nodes);
    let (nodes, depths): (Vec<_>, Vec<_>) = timeline
        .nodes
        .into_iter()
        .zip(depths)
        .filter(|(n, _)| kind.map_or(true, |k| n.kind() == k))
        .unzip();

    if json {
        println!("{}", serde_json::to_string_pretty(&nodes)?);
    } else if nodes.is_empty() {
        println!("Nothing scheduled for {}.", scope.title);
    } else {
        print_schedule_table(&nodes, &depths);
    }
    Ok(())
}

/// Print container status and progress.
pub fn cmd_summary(
    snapshot: &Snapshot,
    now: DateTime<Utc>,
    project: Option<String>,
    status: Option<ContainerStatus>,
    json: bool,
) -> Result<()> {
    let scope = load_scope(snapshot, project.as_deref())?;
    let mut summaries = scope.assemble(now)?.summaries;
    if let Some(s) = status {
        summaries.retain(|c| c.status == s);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else if summaries.is_empty() {
        println!("No milestones or epics in {}.", scope.title);
    } else {
        print_summary_table(&summaries);
    }
    Ok(())
}

/// Validate the snapshot without printing a schedule.
pub fn cmd_check(snapshot: &Snapshot) -> Result<()> {
    validate(&snapshot.milestones, &snapshot.epics, &snapshot.tasks)
        .context("Snapshot is not schedulable")?;

    let dangling = dangling_references(&snapshot.milestones, &snapshot.epics, &snapshot.tasks);
    for d in &dangling {
        println!("warning: {} has {} '{}' which does not exist", d.from, d.field, d.target);
    }
    println!(
        "OK: {} project(s), {} milestone(s), {} epic(s), {} task(s), {} dangling reference(s)",
        snapshot.projects.len(),
        snapshot.milestones.len(),
        snapshot.epics.len(),
        snapshot.tasks.len(),
        dangling.len()
    );
    Ok(())
}

/// Write the schedule to a CSV file.
pub fn cmd_export(
    snapshot: &Snapshot,
    now: DateTime<Utc>,
    output: Option<String>,
    project: Option<String>,
) -> Result<()> {
    let output_path = output.unwrap_or_else(|| "timeline.csv".to_string());
    let scope = load_scope(snapshot, project.as_deref())?;
    let timeline = scope.assemble(now)?;

    std::fs::write(&output_path, schedule_to_csv(&timeline.nodes))
        .with_context(|| format!("Failed to write CSV file {}", output_path))?;
    println!("Exported {} node(s) to {}", timeline.nodes.len(), output_path);
    Ok(())
}

/// List projects in the snapshot.
pub fn cmd_projects(snapshot: &Snapshot) {
    if snapshot.projects.is_empty() {
        println!("No projects.");
        return;
    }
    let mut projects = snapshot.projects.clone();
    projects.sort_by(|a, b| a.name.cmp(&b.name));
    for p in projects {
        let milestones = snapshot.list_milestones_for_project(&p.id).len();
        let tasks = snapshot.list_tasks_for_project(&p.id).len();
        println!("{:<14} {:<30} {} milestone(s), {} task(s)", p.id, p.name, milestones, tasks);
    }
}

/// Launch the Gantt view.
pub fn cmd_gantt(snapshot: &Snapshot, now: DateTime<Utc>, project: Option<String>) -> Result<()> {
    let scope = load_scope(snapshot, project.as_deref())?;
    let timeline = scope.assemble(now)?;
    run_gantt_tui(scope.title, timeline.nodes).context("UI error")
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    use clap::CommandFactory;
    use crate::cli::Cli;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}

/// Default snapshot location: `$HOME/.pm/timeline.json`.
pub fn default_db_path(home: &Path) -> std::path::PathBuf {
    home.join(".pm").join("timeline.json")
}
