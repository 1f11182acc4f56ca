//! Task data structure.
//!
//! A `Task` is the leaf unit of work. It is the only entity whose status is
//! authoritative input; everything above it is derived.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dates::{flexible, Schedulable};
use crate::fields::*;

/// A leaf work item, optionally grouped under an epic and/or a milestone.
///
/// When both `epic_id` and `milestone_id` resolve, the epic wins for grouping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, alias = "projectId")]
    pub project_id: Option<String>,
    pub status: TaskStatus,
    #[serde(default, alias = "storyPoints")]
    pub story_points: Option<u32>,
    #[serde(default, alias = "estimatedHours")]
    pub estimated_hours: Option<f64>,
    #[serde(default, alias = "startDate", with = "flexible")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, alias = "dueDate", alias = "end_date", alias = "endDate", with = "flexible")]
    pub due_date: Option<DateTime<Utc>>,
    /// Required; kept optional here so a missing value is reported as a
    /// malformed entity instead of failing the whole snapshot parse.
    #[serde(default, alias = "createdAt", with = "flexible")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "epicId")]
    pub epic_id: Option<String>,
    #[serde(default, alias = "milestoneId")]
    pub milestone_id: Option<String>,
}

impl Task {
    /// Create a task with the given identity and creation time; every
    /// optional field starts empty.
    pub fn new(id: impl Into<String>, title: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Task {
            id: id.into(),
            title: title.into(),
            project_id: None,
            status: TaskStatus::Todo,
            story_points: None,
            estimated_hours: None,
            start_date: None,
            due_date: None,
            created_at: Some(created_at),
            epic_id: None,
            milestone_id: None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.status == TaskStatus::Done
    }

    /// The first date present among start, due and creation time.
    pub fn sort_anchor(&self) -> Option<DateTime<Utc>> {
        self.start_date.or(self.due_date).or(self.created_at)
    }
}

impl Schedulable for Task {
    fn node_kind(&self) -> NodeKind {
        NodeKind::Task
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

    fn estimated_hours(&self) -> Option<f64> {
        self.estimated_hours
    }
}
