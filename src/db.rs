//! Snapshot storage and display helpers.
//!
//! This module provides the `Snapshot` struct, a JSON file holding projects,
//! milestones, epics and tasks, along with the formatting functions the CLI
//! uses to print schedules and summaries.

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::container::{Epic, Milestone};
use crate::error::SnapshotError;
use crate::fields::*;
use crate::project::{EntitySource, Project};
use crate::task::Task;
use crate::timeline::{ContainerSummary, ScheduledNode};

/// In-memory copy of everything the data layer knows about.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
    #[serde(default)]
    pub epics: Vec<Epic>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Snapshot {
    /// Load a snapshot from a JSON file. A missing file is an empty snapshot.
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no snapshot file, starting empty");
            return Ok(Snapshot::default());
        }
        let mut buf = String::new();
        File::open(path)?.read_to_string(&mut buf)?;
        let snapshot: Snapshot = serde_json::from_str(&buf)?;
        tracing::debug!(
            path = %path.display(),
            milestones = snapshot.milestones.len(),
            epics = snapshot.epics.len(),
            tasks = snapshot.tasks.len(),
            "loaded snapshot"
        );
        Ok(snapshot)
    }

    fn milestone_ids_in(&self, project_id: &str) -> HashSet<&str> {
        self.milestones
            .iter()
            .filter(|m| m.project_id.as_deref() == Some(project_id))
            .map(|m| m.id.as_str())
            .collect()
    }

    fn epic_in(&self, e: &Epic, project_id: &str, milestones: &HashSet<&str>) -> bool {
        e.project_id.as_deref() == Some(project_id)
            || e.milestone_id.as_deref().is_some_and(|m| milestones.contains(m))
    }
}

impl EntitySource for Snapshot {
    fn list_milestones_for_project(&self, project_id: &str) -> Vec<Milestone> {
        self.milestones
            .iter()
            .filter(|m| m.project_id.as_deref() == Some(project_id))
            .cloned()
            .collect()
    }

    /// Epics of the project, including those only linked through a milestone.
    fn list_epics_for_project(&self, project_id: &str) -> Vec<Epic> {
        let milestones = self.milestone_ids_in(project_id);
        self.epics
            .iter()
            .filter(|e| self.epic_in(e, project_id, &milestones))
            .cloned()
            .collect()
    }

    /// Tasks of the project, including those only linked through an epic or
    /// a milestone.
    fn list_tasks_for_project(&self, project_id: &str) -> Vec<Task> {
        let milestones = self.milestone_ids_in(project_id);
        let epics: HashSet<&str> = self
            .epics
            .iter()
            .filter(|e| self.epic_in(e, project_id, &milestones))
            .map(|e| e.id.as_str())
            .collect();
        self.tasks
            .iter()
            .filter(|t| {
                t.project_id.as_deref() == Some(project_id)
                    || t.epic_id.as_deref().is_some_and(|e| epics.contains(e))
                    || t.milestone_id.as_deref().is_some_and(|m| milestones.contains(m))
            })
            .cloned()
            .collect()
    }
}

/// Format an instant as a calendar date.
pub fn format_date(d: DateTime<Utc>) -> String {
    d.format("%Y-%m-%d").to_string()
}

/// Format the length of an interval in days ("3d", "12h").
pub fn format_span(start: DateTime<Utc>, end: DateTime<Utc>) -> String {
    let d = end - start;
    if d.num_days() >= 1 && d.num_hours() % 24 == 0 {
        format!("{}d", d.num_days())
    } else if d.num_days() >= 1 {
        format!("{:.1}d", d.num_hours() as f64 / 24.0)
    } else {
        format!("{}h", d.num_hours().max(1))
    }
}

/// Text progress bar of the given width.
pub fn progress_bar(progress: u8, width: usize) -> String {
    let filled = (usize::from(progress.min(100)) * width + 50) / 100;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}

/// Print scheduled nodes as a table, indenting titles by depth.
pub fn print_schedule_table(nodes: &[ScheduledNode], depths: &[usize]) {
    println!(
        "{:<10} {:<11} {:<12} {:<12} {:<6} {:<4} {}",
        "Kind", "Status", "Start", "End", "Span", "%", "Title"
    );
    for (n, depth) in nodes.iter().zip(depths) {
        println!(
            "{:<10} {:<11} {:<12} {:<12} {:<6} {:<4} {}{}",
            format_kind(n.node.kind),
            format_node_status(n.status),
            format_date(n.start),
            format_date(n.end),
            format_span(n.start, n.end),
            n.progress,
            "  ".repeat(*depth),
            n.name
        );
    }
}

/// Print container summaries as a table.
pub fn print_summary_table(summaries: &[ContainerSummary]) {
    println!(
        "{:<10} {:<14} {:<11} {:<6} {:<22} {}",
        "Kind", "ID", "Status", "Tasks", "Progress", "Name"
    );
    for s in summaries {
        println!(
            "{:<10} {:<14} {:<11} {:<6} {} {:>3}% {}",
            format_kind(s.node.kind),
            truncate(&s.node.id, 14),
            format_container_status(s.status),
            s.task_count,
            progress_bar(s.progress, 16),
            s.progress,
            s.name
        );
    }
}

/// Escape a CSV field that contains commas, quotes or newlines.
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Render scheduled nodes as CSV, one row per node in timeline order.
pub fn schedule_to_csv(nodes: &[ScheduledNode]) -> String {
    let mut csv = String::new();
    csv.push_str("Kind,ID,Name,Status,Start,End,Progress,Parent\n");
    for n in nodes {
        let parent = n.parent.as_ref().map(|p| p.to_string()).unwrap_or_else(|| "-".into());
        csv.push_str(&format!(
            "{},{},{},{},{},{},{},{}\n",
            format_kind(n.node.kind),
            escape_csv(&n.node.id),
            escape_csv(&n.name),
            format_node_status(n.status),
            n.start.to_rfc3339(),
            n.end.to_rfc3339(),
            n.progress,
            escape_csv(&parent)
        ));
    }
    csv
}
