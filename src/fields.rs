//! Enumerations and field types shared by the scheduling engine.
//!
//! This module defines the lifecycle values of leaf tasks and containers, the
//! kinds of node a timeline is made of, and the small reference type used to
//! link scheduled nodes to their parents.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a leaf task.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    #[serde(alias = "backlog", alias = "Backlog")]
    Backlog,
    #[serde(alias = "todo", alias = "Todo")]
    Todo,
    #[serde(alias = "in-progress", alias = "in_progress", alias = "InProgress")]
    InProgress,
    #[serde(alias = "done", alias = "Done")]
    Done,
    #[serde(alias = "blocked", alias = "Blocked")]
    Blocked,
}

/// Derived lifecycle status of a milestone or epic.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ContainerStatus {
    #[serde(alias = "Upcoming")]
    Upcoming,
    #[serde(alias = "in-progress", alias = "InProgress")]
    InProgress,
    #[serde(alias = "Completed")]
    Completed,
}

/// The three levels of the scheduling hierarchy.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    Milestone,
    Epic,
    Task,
}

/// Status carried by a scheduled node: tasks keep their own status,
/// containers carry the derived one.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "of", content = "value", rename_all = "kebab-case")]
pub enum NodeStatus {
    Task(TaskStatus),
    Container(ContainerStatus),
}

/// Reference to a scheduled node. Ids are only unique per kind, so the kind
/// is part of the identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeRef {
    pub kind: NodeKind,
    pub id: String,
}

impl NodeRef {
    pub fn new(kind: NodeKind, id: impl Into<String>) -> Self {
        NodeRef { kind, id: id.into() }
    }

    pub fn milestone(id: impl Into<String>) -> Self {
        Self::new(NodeKind::Milestone, id)
    }

    pub fn epic(id: impl Into<String>) -> Self {
        Self::new(NodeKind::Epic, id)
    }

    pub fn task(id: impl Into<String>) -> Self {
        Self::new(NodeKind::Task, id)
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", format_kind(self.kind).to_lowercase(), self.id)
    }
}

/// Format a node kind for display.
pub fn format_kind(k: NodeKind) -> &'static str {
    match k {
        NodeKind::Milestone => "Milestone",
        NodeKind::Epic => "Epic",
        NodeKind::Task => "Task",
    }
}

/// Format a task status for display.
pub fn format_task_status(s: TaskStatus) -> &'static str {
    match s {
        TaskStatus::Backlog => "Backlog",
        TaskStatus::Todo => "Todo",
        TaskStatus::InProgress => "InProgress",
        TaskStatus::Done => "Done",
        TaskStatus::Blocked => "Blocked",
    }
}

/// Format a container status for display.
pub fn format_container_status(s: ContainerStatus) -> &'static str {
    match s {
        ContainerStatus::Upcoming => "Upcoming",
        ContainerStatus::InProgress => "InProgress",
        ContainerStatus::Completed => "Completed",
    }
}

/// Format either flavour of node status for display.
pub fn format_node_status(s: NodeStatus) -> &'static str {
    match s {
        NodeStatus::Task(t) => format_task_status(t),
        NodeStatus::Container(c) => format_container_status(c),
    }
}
