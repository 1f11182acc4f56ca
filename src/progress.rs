//! Effort-weighted progress aggregation.
//!
//! Each task contributes its story points, or 1 when it has none, so sets
//! with and without estimates aggregate through the same formula.

use crate::task::Task;

/// Weight of a task in progress aggregation: its story points when positive,
/// otherwise 1.
pub fn weight(task: &Task) -> u64 {
    match task.story_points {
        Some(points) if points > 0 => u64::from(points),
        _ => 1,
    }
}

/// Completion percentage of a task set, 0 to 100.
///
/// A set that is not entirely done never reports 100, so a full bar always
/// means a completed container.
pub fn compute_progress(tasks: &[Task]) -> u8 {
    compute_progress_of(tasks.iter())
}

/// Same as [`compute_progress`] over borrowed tasks.
pub fn compute_progress_of<'a, I>(tasks: I) -> u8
where
    I: IntoIterator<Item = &'a Task>,
{
    let mut count = 0u64;
    let mut done_count = 0u64;
    let mut total_weight = 0u64;
    let mut done_weight = 0u64;
    for t in tasks {
        let w = weight(t);
        count += 1;
        total_weight = total_weight.saturating_add(w);
        if t.is_done() {
            done_count += 1;
            done_weight = done_weight.saturating_add(w);
        }
    }

    if count == 0 {
        return 0;
    }

    let pct = if total_weight > 0 {
        round_percent(done_weight, total_weight)
    } else {
        round_percent(done_count, count)
    };

    if pct == 100 && done_count < count {
        99
    } else {
        pct
    }
}

/// `round(100 * part / whole)` with ties rounded up, in integer arithmetic.
fn round_percent(part: u64, whole: u64) -> u8 {
    let part = u128::from(part);
    let whole = u128::from(whole);
    let pct = (200 * part + whole) / (2 * whole);
    pct.min(100) as u8
}
