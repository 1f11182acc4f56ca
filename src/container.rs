//! Milestones and epics: the containers whose status and progress are derived
//! from the tasks they own.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dates::{flexible, Schedulable};
use crate::fields::*;

/// A dated goal for a project. Milestones are the roots of the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: String,
    #[serde(default, alias = "title")]
    pub name: String,
    #[serde(default, alias = "projectId")]
    pub project_id: Option<String>,
    #[serde(default, alias = "startDate", with = "flexible")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, alias = "dueDate", alias = "end_date", alias = "endDate", with = "flexible")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, alias = "createdAt", with = "flexible")]
    pub created_at: Option<DateTime<Utc>>,
    /// Manually recorded status (e.g. a validated milestone). Replaces the
    /// derived status; progress is still derived.
    #[serde(default, alias = "statusOverride", skip_serializing_if = "Option::is_none")]
    pub status_override: Option<ContainerStatus>,
}

impl Milestone {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Milestone {
            id: id.into(),
            name: name.into(),
            project_id: None,
            start_date: None,
            due_date: None,
            created_at: None,
            status_override: None,
        }
    }

    /// True when the milestone carries no date at all and its position on the
    /// timeline is pure inference.
    pub fn is_anchorless(&self) -> bool {
        self.start_date.is_none() && self.due_date.is_none() && self.created_at.is_none()
    }
}

impl Schedulable for Milestone {
    fn node_kind(&self) -> NodeKind {
        NodeKind::Milestone
    }

    fn start_date(&self) -> Option<DateTime<Utc>> {
        self.start_date
    }

    fn due_date(&self) -> Option<DateTime<Utc>> {
        self.due_date
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
}

/// A body of work inside a project, usually attached to a milestone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Epic {
    pub id: String,
    #[serde(default, alias = "title")]
    pub name: String,
    #[serde(default, alias = "projectId")]
    pub project_id: Option<String>,
    #[serde(default, alias = "milestoneId")]
    pub milestone_id: Option<String>,
    #[serde(default, alias = "startDate", with = "flexible")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, alias = "dueDate", alias = "end_date", alias = "endDate", with = "flexible")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, alias = "createdAt", with = "flexible")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Epic {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Epic {
            id: id.into(),
            name: name.into(),
            project_id: None,
            milestone_id: None,
            start_date: None,
            due_date: None,
            created_at: None,
        }
    }
}

impl Schedulable for Epic {
    fn node_kind(&self) -> NodeKind {
        NodeKind::Epic
    }

    fn start_date(&self) -> Option<DateTime<Utc>> {
        self.start_date
    }

    fn due_date(&self) -> Option<DateTime<Utc>> {
        self.due_date
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
}
