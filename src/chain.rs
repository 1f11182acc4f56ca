//! Parent links between scheduled nodes.
//!
//! The timeline is a forest: milestones are roots, epics and milestone-level
//! tasks hang off milestones, epic tasks hang off epics, and orphan tasks (and
//! epics with no milestone) are extra roots. Links only ever point upward.

use std::collections::HashMap;

use crate::fields::{NodeKind, NodeRef};
use crate::timeline::ScheduledNode;

/// Validate that a parent-child relationship follows the hierarchical rules.
pub fn validate_hierarchy(parent_kind: NodeKind, child_kind: NodeKind) -> bool {
    matches!(
        (parent_kind, child_kind),
        (NodeKind::Milestone, NodeKind::Epic)
            | (NodeKind::Milestone, NodeKind::Task)
            | (NodeKind::Epic, NodeKind::Task)
    )
}

/// Point `node` at `parent`, or make it a root.
///
/// Links that break the hierarchy rules are dropped so the result stays
/// acyclic whatever the caller passes in.
pub fn attach_parent(mut node: ScheduledNode, parent: Option<&ScheduledNode>) -> ScheduledNode {
    node.parent = match parent {
        Some(p) if validate_hierarchy(p.node.kind, node.node.kind) => Some(p.node.clone()),
        Some(p) => {
            tracing::debug!(child = %node.node, parent = %p.node, "refusing invalid parent link");
            None
        }
        None => None,
    };
    node
}

/// Depth of every node in the forest, in the same order as `nodes`. Roots
/// are at depth 0.
///
/// Parents are listed before their children, so one pass suffices. A parent
/// that is missing or appears later counts as a root.
pub fn depths(nodes: &[ScheduledNode]) -> Vec<usize> {
    let mut seen: HashMap<&NodeRef, usize> = HashMap::with_capacity(nodes.len());
    let mut out = Vec::with_capacity(nodes.len());
    for n in nodes {
        let depth = n
            .parent
            .as_ref()
            .and_then(|p| seen.get(p))
            .map_or(0, |d| d + 1);
        seen.insert(&n.node, depth);
        out.push(depth);
    }
    out
}

/// Check that a node list forms a well-shaped forest: unique nodes, every
/// parent present and listed before its children, and every link allowed by
/// [`validate_hierarchy`]. Returns the first offending node.
pub fn validate_forest(nodes: &[ScheduledNode]) -> Result<(), NodeRef> {
    let mut seen: HashMap<&NodeRef, NodeKind> = HashMap::new();
    for n in nodes {
        if let Some(p) = &n.parent {
            match seen.get(p) {
                Some(&kind) if validate_hierarchy(kind, n.node.kind) => {}
                _ => return Err(n.node.clone()),
            }
        }
        if seen.insert(&n.node, n.node.kind).is_some() {
            return Err(n.node.clone());
        }
    }
    Ok(())
}
