//! Projects and the data-access seam.
//!
//! The engine never fetches anything itself. Whatever holds the entities (a
//! JSON snapshot here, a remote API elsewhere) implements `EntitySource` and
//! hands value snapshots to the timeline functions.

use serde::{Deserialize, Serialize};

use crate::container::{Epic, Milestone};
use crate::task::Task;

/// A project groups milestones, epics and tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Supplier of per-project entity snapshots.
pub trait EntitySource {
    fn list_milestones_for_project(&self, project_id: &str) -> Vec<Milestone>;
    fn list_epics_for_project(&self, project_id: &str) -> Vec<Epic>;
    fn list_tasks_for_project(&self, project_id: &str) -> Vec<Task>;

    /// All three collections for one project.
    fn project_snapshot(&self, project_id: &str) -> (Vec<Milestone>, Vec<Epic>, Vec<Task>) {
        (
            self.list_milestones_for_project(project_id),
            self.list_epics_for_project(project_id),
            self.list_tasks_for_project(project_id),
        )
    }
}

/// Resolve a project identifier (either id or name) to a project id.
/// Returns an error if the name has multiple matches and suggests using the id instead.
pub fn resolve_project_identifier(identifier: &str, projects: &[Project]) -> Result<String, String> {
    if let Some(p) = projects.iter().find(|p| p.id == identifier) {
        return Ok(p.id.clone());
    }

    let matches: Vec<&Project> = projects
        .iter()
        .filter(|p| p.name.to_lowercase() == identifier.to_lowercase())
        .collect();

    match matches.len() {
        0 => Err(format!("No project found with id or name '{}'", identifier)),
        1 => Ok(matches[0].id.clone()),
        _ => {
            let mut error_msg = format!("Multiple projects found with name '{}':\n", identifier);
            for p in matches {
                error_msg.push_str(&format!("  ID {}: {}\n", p.id, p.name));
            }
            error_msg.push_str("Please use the specific ID instead.");
            Err(error_msg)
        }
    }
}
