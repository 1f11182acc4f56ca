//! Container status derivation.

use crate::fields::{ContainerStatus, TaskStatus};
use crate::task::Task;

/// Derive a container's status from the tasks it owns, directly or through
/// child epics. Order of `tasks` does not matter.
///
/// First match wins:
/// 1. no tasks: `Upcoming`
/// 2. every task done: `Completed`
/// 3. any task in progress, or some (not all) done: `InProgress`
/// 4. otherwise: `Upcoming`
pub fn derive_status(tasks: &[Task]) -> ContainerStatus {
    derive_status_of(tasks.iter())
}

/// Same as [`derive_status`] over borrowed tasks, so grouped views do not need
/// to clone.
pub fn derive_status_of<'a, I>(tasks: I) -> ContainerStatus
where
    I: IntoIterator<Item = &'a Task>,
{
    let mut total = 0usize;
    let mut done = 0usize;
    let mut in_progress = false;
    for t in tasks {
        total += 1;
        match t.status {
            TaskStatus::Done => done += 1,
            TaskStatus::InProgress => in_progress = true,
            TaskStatus::Backlog | TaskStatus::Todo | TaskStatus::Blocked => {}
        }
    }

    if total == 0 {
        ContainerStatus::Upcoming
    } else if done == total {
        ContainerStatus::Completed
    } else if in_progress || done > 0 {
        ContainerStatus::InProgress
    } else {
        ContainerStatus::Upcoming
    }
}
