//! # pm_timeline
//!
//! Hierarchical progress aggregation and timeline scheduling for
//! milestone → epic → task plans.
//!
//! Given loosely dated milestones, epics and tasks, the engine produces:
//!
//! - a derived status (`upcoming`, `in_progress`, `completed`) and a 0–100
//!   progress value for every container, weighted by story points;
//! - a fully scheduled forest of nodes where every interval is strictly
//!   positive, ready for a Gantt-style renderer.
//!
//! Everything is a pure function of its inputs plus an explicit `now`:
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use pm_timeline::{assemble_timeline, Milestone};
//!
//! let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
//! let mut m = Milestone::new("m1", "Public beta");
//! m.start_date = Some(now);
//!
//! let nodes = assemble_timeline(&[m], &[], &[], now).unwrap();
//! assert_eq!((nodes[0].end - nodes[0].start).num_days(), 30);
//! ```

pub mod chain;
pub mod container;
pub mod dates;
pub mod db;
pub mod error;
pub mod fields;
pub mod progress;
pub mod project;
pub mod status;
pub mod task;
pub mod timeline;

pub use chain::{attach_parent, depths, validate_forest, validate_hierarchy};
pub use container::{Epic, Milestone};
pub use dates::{resolve_interval, Anchors, Interval, Schedulable};
pub use db::Snapshot;
pub use error::{SnapshotError, TimelineError};
pub use fields::{ContainerStatus, NodeKind, NodeRef, NodeStatus, TaskStatus};
pub use progress::compute_progress;
pub use project::{EntitySource, Project};
pub use status::derive_status;
pub use task::Task;
pub use timeline::{
    assemble_timeline, dangling_references, summarize_containers, ContainerSummary,
    DanglingReference, ScheduledNode, Timeline,
};
