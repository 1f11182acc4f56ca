//! Timeline assembly.
//!
//! Walks the milestone → epic → task hierarchy, resolves every node's
//! interval, derives container status and progress, and emits the nodes in a
//! stable traversal order:
//!
//! 1. each milestone (dated ones first, by start), followed by its epics (each
//!    followed by its tasks) and then its direct tasks;
//! 2. epics that could not be placed under any milestone, with their tasks;
//! 3. orphan tasks.
//!
//! Renderers rely on this order, so it is part of the contract.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::chain::attach_parent;
use crate::container::{Epic, Milestone};
use crate::dates::{resolve_interval, Anchors, Interval};
use crate::error::{Result, TimelineError};
use crate::fields::*;
use crate::progress::{compute_progress, compute_progress_of};
use crate::status::derive_status_of;
use crate::task::Task;

/// One bar on the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledNode {
    pub node: NodeRef,
    pub name: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// 0 to 100, used for the bar fill.
    pub progress: u8,
    pub status: NodeStatus,
    pub parent: Option<NodeRef>,
}

impl ScheduledNode {
    fn container(node: NodeRef, name: &str, iv: Interval, status: ContainerStatus, progress: u8) -> Self {
        ScheduledNode {
            node,
            name: name.to_string(),
            start: iv.start,
            end: iv.end,
            progress,
            status: NodeStatus::Container(status),
            parent: None,
        }
    }

    fn task(t: &Task, iv: Interval) -> Self {
        ScheduledNode {
            node: NodeRef::task(&t.id),
            name: t.title.clone(),
            start: iv.start,
            end: iv.end,
            progress: compute_progress(std::slice::from_ref(t)),
            status: NodeStatus::Task(t.status),
            parent: None,
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.node.kind
    }
}

/// Derived status and progress of one milestone or epic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSummary {
    pub node: NodeRef,
    pub name: String,
    pub status: ContainerStatus,
    pub progress: u8,
    pub task_count: usize,
}

/// The full output of one assembly pass.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Timeline {
    pub nodes: Vec<ScheduledNode>,
    pub summaries: Vec<ContainerSummary>,
}

impl Timeline {
    /// Validate the inputs, then schedule every entity.
    ///
    /// Either returns a complete timeline or fails before producing any node.
    pub fn assemble(
        milestones: &[Milestone],
        epics: &[Epic],
        tasks: &[Task],
        now: DateTime<Utc>,
    ) -> Result<Timeline> {
        validate(milestones, epics, tasks)?;
        let h = Hierarchy::build(milestones, epics, tasks, now);

        let mut out = Timeline {
            nodes: Vec::with_capacity(milestones.len() + epics.len() + tasks.len()),
            summaries: Vec::with_capacity(milestones.len() + epics.len()),
        };

        for (m, iv) in &h.milestones {
            let owned: Vec<&Task> = h.milestone_task_set(&m.id).collect();
            let derived = derive_status_of(owned.iter().copied());
            let status = m.status_override.unwrap_or(derived);
            let progress = compute_progress_of(owned.iter().copied());
            let node_ref = NodeRef::milestone(&m.id);
            out.summaries.push(ContainerSummary {
                node: node_ref.clone(),
                name: m.name.clone(),
                status,
                progress,
                task_count: owned.len(),
            });

            let m_idx = out.nodes.len();
            out.nodes.push(attach_parent(
                ScheduledNode::container(node_ref, &m.name, *iv, status, progress),
                None,
            ));

            let anchors = Anchors::under(iv.start, now);
            let placed = h.epics_under.get(m.id.as_str()).map(Vec::as_slice).unwrap_or(&[]);
            for (e, eiv) in sort_epics(placed, &anchors) {
                h.emit_epic(&mut out, e, eiv, Some(m_idx), now);
            }

            let direct = h.milestone_tasks.get(m.id.as_str()).map(Vec::as_slice).unwrap_or(&[]);
            for (t, tiv) in sort_tasks(direct, &anchors) {
                let node = attach_parent(ScheduledNode::task(t, tiv), Some(&out.nodes[m_idx]));
                out.nodes.push(node);
            }
        }

        let root_anchors = Anchors::root(now);
        for (e, eiv) in sort_epics(&h.root_epics, &root_anchors) {
            h.emit_epic(&mut out, e, eiv, None, now);
        }

        for (t, tiv) in sort_tasks(&h.orphans, &root_anchors) {
            out.nodes.push(attach_parent(ScheduledNode::task(t, tiv), None));
        }

        tracing::debug!(
            milestones = h.milestones.len(),
            epics = epics.len(),
            root_epics = h.root_epics.len(),
            tasks = tasks.len(),
            orphans = h.orphans.len(),
            nodes = out.nodes.len(),
            "assembled timeline"
        );
        Ok(out)
    }
}

/// Schedule milestones, epics and tasks into an ordered node list.
pub fn assemble_timeline(
    milestones: &[Milestone],
    epics: &[Epic],
    tasks: &[Task],
    now: DateTime<Utc>,
) -> Result<Vec<ScheduledNode>> {
    Timeline::assemble(milestones, epics, tasks, now).map(|t| t.nodes)
}

/// Status and progress of every container, in timeline order.
pub fn summarize_containers(
    milestones: &[Milestone],
    epics: &[Epic],
    tasks: &[Task],
    now: DateTime<Utc>,
) -> Result<Vec<ContainerSummary>> {
    Timeline::assemble(milestones, epics, tasks, now).map(|t| t.summaries)
}

/// Reject entities without a usable identity, duplicate ids and tasks
/// without a creation time.
pub fn validate(milestones: &[Milestone], epics: &[Epic], tasks: &[Task]) -> Result<()> {
    check_ids(NodeKind::Milestone, milestones.iter().map(|m| m.id.as_str()))?;
    check_ids(NodeKind::Epic, epics.iter().map(|e| e.id.as_str()))?;
    check_ids(NodeKind::Task, tasks.iter().map(|t| t.id.as_str()))?;
    if let Some(t) = tasks.iter().find(|t| t.created_at.is_none()) {
        return Err(TimelineError::malformed(NodeKind::Task, &t.id, "missing created_at"));
    }
    Ok(())
}

fn check_ids<'a>(kind: NodeKind, ids: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if id.trim().is_empty() {
            return Err(TimelineError::malformed(kind, id, "missing id"));
        }
        if !seen.insert(id) {
            return Err(TimelineError::malformed(kind, id, "duplicate id"));
        }
    }
    Ok(())
}

/// A reference from one entity to a container that is not in the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DanglingReference {
    pub from: NodeRef,
    pub field: &'static str,
    pub target: String,
}

/// List references that do not resolve. These are not errors: the entity is
/// scheduled as if the reference were absent, and the caller decides whether
/// to warn.
pub fn dangling_references(
    milestones: &[Milestone],
    epics: &[Epic],
    tasks: &[Task],
) -> Vec<DanglingReference> {
    let milestone_ids: HashSet<&str> = milestones.iter().map(|m| m.id.as_str()).collect();
    let epic_ids: HashSet<&str> = epics.iter().map(|e| e.id.as_str()).collect();
    let mut out = Vec::new();

    for e in epics {
        if let Some(mid) = e.milestone_id.as_deref() {
            if !milestone_ids.contains(mid) {
                out.push(DanglingReference {
                    from: NodeRef::epic(&e.id),
                    field: "milestone_id",
                    target: mid.to_string(),
                });
            }
        }
    }
    for t in tasks {
        if let Some(eid) = t.epic_id.as_deref() {
            if !epic_ids.contains(eid) {
                out.push(DanglingReference {
                    from: NodeRef::task(&t.id),
                    field: "epic_id",
                    target: eid.to_string(),
                });
            }
        }
        if let Some(mid) = t.milestone_id.as_deref() {
            if !milestone_ids.contains(mid) {
                out.push(DanglingReference {
                    from: NodeRef::task(&t.id),
                    field: "milestone_id",
                    target: mid.to_string(),
                });
            }
        }
    }
    out
}

/// Who owns what, after resolving references against the supplied
/// collections.
struct Hierarchy<'a> {
    /// Sorted, with resolved intervals.
    milestones: Vec<(&'a Milestone, Interval)>,
    epics_under: BTreeMap<&'a str, Vec<&'a Epic>>,
    root_epics: Vec<&'a Epic>,
    epic_tasks: BTreeMap<&'a str, Vec<&'a Task>>,
    milestone_tasks: BTreeMap<&'a str, Vec<&'a Task>>,
    orphans: Vec<&'a Task>,
}

impl<'a> Hierarchy<'a> {
    fn build(
        milestones: &'a [Milestone],
        epics: &'a [Epic],
        tasks: &'a [Task],
        now: DateTime<Utc>,
    ) -> Self {
        let root = Anchors::root(now);
        let mut sorted: Vec<(&Milestone, Interval)> =
            milestones.iter().map(|m| (m, resolve_interval(m, &root))).collect();
        sorted.sort_by(|(a, ai), (b, bi)| {
            a.is_anchorless()
                .cmp(&b.is_anchorless())
                .then(ai.start.cmp(&bi.start))
                .then_with(|| alphabetical(&a.name, &b.name))
                .then_with(|| a.id.cmp(&b.id))
        });

        let milestone_ids: HashSet<&str> = milestones.iter().map(|m| m.id.as_str()).collect();
        let mut first_by_project: HashMap<&str, &str> = HashMap::new();
        for &(m, _) in &sorted {
            if let Some(p) = m.project_id.as_deref() {
                first_by_project.entry(p).or_insert(m.id.as_str());
            }
        }

        let mut epics_under: BTreeMap<&str, Vec<&Epic>> = BTreeMap::new();
        let mut root_epics = Vec::new();
        for e in epics {
            let home = e
                .milestone_id
                .as_deref()
                .filter(|mid| milestone_ids.contains(mid))
                .or_else(|| e.project_id.as_deref().and_then(|p| first_by_project.get(p).copied()));
            match home {
                Some(mid) => epics_under.entry(mid).or_default().push(e),
                None => root_epics.push(e),
            }
        }

        let epic_ids: HashSet<&str> = epics.iter().map(|e| e.id.as_str()).collect();
        let mut epic_tasks: BTreeMap<&str, Vec<&Task>> = BTreeMap::new();
        let mut milestone_tasks: BTreeMap<&str, Vec<&Task>> = BTreeMap::new();
        let mut orphans = Vec::new();
        for t in tasks {
            if let Some(eid) = t.epic_id.as_deref().filter(|id| epic_ids.contains(id)) {
                epic_tasks.entry(eid).or_default().push(t);
            } else if let Some(mid) = t.milestone_id.as_deref().filter(|id| milestone_ids.contains(id)) {
                milestone_tasks.entry(mid).or_default().push(t);
            } else {
                orphans.push(t);
            }
        }

        Hierarchy {
            milestones: sorted,
            epics_under,
            root_epics,
            epic_tasks,
            milestone_tasks,
            orphans,
        }
    }

    fn tasks_of_epic(&self, epic_id: &str) -> &[&'a Task] {
        self.epic_tasks.get(epic_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Direct tasks plus the tasks of every epic placed under the milestone.
    fn milestone_task_set<'s>(&'s self, milestone_id: &str) -> impl Iterator<Item = &'a Task> + 's {
        let direct = self.milestone_tasks.get(milestone_id).into_iter().flatten().copied();
        let via_epics = self
            .epics_under
            .get(milestone_id)
            .into_iter()
            .flatten()
            .flat_map(move |e| self.tasks_of_epic(&e.id).iter().copied());
        direct.chain(via_epics)
    }

    /// Push an epic node and its tasks.
    fn emit_epic(
        &self,
        out: &mut Timeline,
        e: &Epic,
        iv: Interval,
        parent_idx: Option<usize>,
        now: DateTime<Utc>,
    ) {
        let owned = self.tasks_of_epic(&e.id);
        let status = derive_status_of(owned.iter().copied());
        let progress = compute_progress_of(owned.iter().copied());
        let node_ref = NodeRef::epic(&e.id);
        out.summaries.push(ContainerSummary {
            node: node_ref.clone(),
            name: e.name.clone(),
            status,
            progress,
            task_count: owned.len(),
        });

        let node = ScheduledNode::container(node_ref, &e.name, iv, status, progress);
        let node = attach_parent(node, parent_idx.map(|i| &out.nodes[i]));
        let e_idx = out.nodes.len();
        out.nodes.push(node);

        let anchors = Anchors::under(iv.start, now);
        for (t, tiv) in sort_tasks(owned, &anchors) {
            let node = attach_parent(ScheduledNode::task(t, tiv), Some(&out.nodes[e_idx]));
            out.nodes.push(node);
        }
    }
}

fn sort_epics<'a>(epics: &[&'a Epic], anchors: &Anchors) -> Vec<(&'a Epic, Interval)> {
    let mut v: Vec<(&Epic, Interval)> =
        epics.iter().map(|e| (*e, resolve_interval(*e, anchors))).collect();
    v.sort_by(|(a, ai), (b, bi)| {
        ai.start
            .cmp(&bi.start)
            .then_with(|| alphabetical(&a.name, &b.name))
            .then_with(|| a.id.cmp(&b.id))
    });
    v
}

fn sort_tasks<'a>(tasks: &[&'a Task], anchors: &Anchors) -> Vec<(&'a Task, Interval)> {
    let mut v: Vec<(&Task, Interval)> =
        tasks.iter().map(|t| (*t, resolve_interval(*t, anchors))).collect();
    v.sort_by(|(a, ai), (b, bi)| {
        ai.start
            .cmp(&bi.start)
            .then_with(|| a.sort_anchor().cmp(&b.sort_anchor()))
            .then_with(|| alphabetical(&a.title, &b.title))
            .then_with(|| a.id.cmp(&b.id))
    });
    v
}

/// Case-insensitive ordering, falling back to byte order for a total order.
fn alphabetical(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
        .then_with(|| a.cmp(b))
}
