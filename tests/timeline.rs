use chrono::{DateTime, Duration, NaiveDate, Utc};

use pm_timeline::dates::midnight_utc;
use pm_timeline::{
    assemble_timeline, compute_progress, derive_status, summarize_containers, validate_forest,
    ContainerStatus, Epic, Milestone, NodeKind, NodeRef, NodeStatus, Task, TaskStatus, Timeline,
};

fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    midnight_utc(NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn now() -> DateTime<Utc> {
    day(2024, 6, 15)
}

fn epic_task(id: &str, epic: &str, points: u32, status: TaskStatus) -> Task {
    let mut t = Task::new(id, id, day(2024, 1, 1));
    t.epic_id = Some(epic.to_string());
    t.story_points = Some(points);
    t.status = status;
    t
}

/// Small deterministic generator so the property checks need no extra crates.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next() % n
    }

    fn maybe_day(&mut self) -> Option<DateTime<Utc>> {
        match self.below(3) {
            0 => None,
            _ => Some(day(2024, 1, 1) + Duration::days(self.below(120) as i64)),
        }
    }

    fn status(&mut self) -> TaskStatus {
        [
            TaskStatus::Backlog,
            TaskStatus::Todo,
            TaskStatus::InProgress,
            TaskStatus::Done,
            TaskStatus::Blocked,
        ][self.below(5) as usize]
    }
}

fn random_world(rng: &mut Lcg) -> (Vec<Milestone>, Vec<Epic>, Vec<Task>) {
    let milestones: Vec<Milestone> = (0..rng.below(4))
        .map(|i| {
            let mut m = Milestone::new(format!("m{i}"), format!("Milestone {}", rng.below(3)));
            m.project_id = Some(format!("p{}", rng.below(2)));
            m.start_date = rng.maybe_day();
            m.due_date = rng.maybe_day();
            m.created_at = rng.maybe_day();
            m
        })
        .collect();
    let epics: Vec<Epic> = (0..rng.below(6))
        .map(|i| {
            let mut e = Epic::new(format!("e{i}"), format!("Epic {}", rng.below(3)));
            match rng.below(3) {
                0 => e.milestone_id = Some(format!("m{}", rng.below(5))),
                1 => e.project_id = Some(format!("p{}", rng.below(3))),
                _ => {}
            }
            e.start_date = rng.maybe_day();
            e.due_date = rng.maybe_day();
            e.created_at = rng.maybe_day();
            e
        })
        .collect();
    let tasks: Vec<Task> = (0..rng.below(20))
        .map(|i| {
            let created = day(2024, 1, 1) + Duration::days(rng.below(60) as i64);
            let mut t = Task::new(format!("t{i}"), format!("Task {}", rng.below(4)), created);
            t.status = rng.status();
            t.story_points = match rng.below(3) {
                0 => None,
                _ => Some(rng.below(9) as u32),
            };
            t.estimated_hours = match rng.below(3) {
                0 => Some(rng.below(40) as f64),
                _ => None,
            };
            t.start_date = rng.maybe_day();
            t.due_date = rng.maybe_day();
            if rng.below(2) == 0 {
                t.epic_id = Some(format!("e{}", rng.below(7)));
            }
            if rng.below(2) == 0 {
                t.milestone_id = Some(format!("m{}", rng.below(5)));
            }
            t
        })
        .collect();
    (milestones, epics, tasks)
}

#[test]
fn scenario_a_lone_milestone_gets_thirty_days() {
    let mut m = Milestone::new("m1", "Kickoff");
    m.start_date = Some(day(2024, 1, 1));

    let t = Timeline::assemble(&[m], &[], &[], now()).unwrap();
    assert_eq!(t.nodes.len(), 1);
    assert_eq!(t.nodes[0].start, day(2024, 1, 1));
    assert_eq!(t.nodes[0].end, day(2024, 1, 31));
    assert_eq!(t.nodes[0].status, NodeStatus::Container(ContainerStatus::Upcoming));
    assert_eq!(t.nodes[0].progress, 0);
    assert_eq!(t.summaries[0].status, ContainerStatus::Upcoming);
}

#[test]
fn scenario_b_half_done_epic() {
    let e = Epic::new("e1", "Checkout");
    let tasks = vec![
        epic_task("a", "e1", 1, TaskStatus::Done),
        epic_task("b", "e1", 1, TaskStatus::Done),
        epic_task("c", "e1", 1, TaskStatus::Todo),
        epic_task("d", "e1", 1, TaskStatus::Backlog),
    ];
    assert_eq!(compute_progress(&tasks), 50);
    assert_eq!(derive_status(&tasks), ContainerStatus::InProgress);

    let summaries = summarize_containers(&[], &[e], &tasks, now()).unwrap();
    assert_eq!(summaries[0].progress, 50);
    assert_eq!(summaries[0].status, ContainerStatus::InProgress);
}

#[test]
fn scenario_c_story_points_dominate() {
    let tasks = vec![
        epic_task("big", "e1", 5, TaskStatus::Done),
        epic_task("s1", "e1", 1, TaskStatus::Todo),
        epic_task("s2", "e1", 1, TaskStatus::Todo),
    ];
    assert_eq!(compute_progress(&tasks), 71);
    assert_eq!(derive_status(&tasks), ContainerStatus::InProgress);
}

#[test]
fn scenario_d_inverted_dates_are_corrected() {
    let mut t = Task::new("t1", "Backwards", day(2024, 3, 1));
    t.start_date = Some(day(2024, 3, 10));
    t.due_date = Some(day(2024, 3, 5));

    let nodes = assemble_timeline(&[], &[], &[t], now()).unwrap();
    assert_eq!(nodes[0].start, day(2024, 3, 10));
    assert_eq!(nodes[0].end, day(2024, 3, 11));
}

#[test]
fn scenario_e_orphan_with_hour_estimate() {
    let mut t = Task::new("t1", "Spike", day(2024, 5, 1));
    t.estimated_hours = Some(16.0);

    let nodes = assemble_timeline(&[], &[], &[t], now()).unwrap();
    assert_eq!(nodes[0].parent, None);
    assert_eq!(nodes[0].start, day(2024, 5, 1));
    assert_eq!(nodes[0].end, day(2024, 5, 3));
}

#[test]
fn empty_epic_still_yields_a_node() {
    let mut m = Milestone::new("m1", "Release");
    m.start_date = Some(day(2024, 2, 1));
    let mut e = Epic::new("e1", "Nothing yet");
    e.milestone_id = Some("m1".into());

    let nodes = assemble_timeline(&[m], &[e], &[], now()).unwrap();
    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[1].node, NodeRef::epic("e1"));
    assert_eq!(nodes[1].progress, 0);
    assert_eq!(nodes[1].status, NodeStatus::Container(ContainerStatus::Upcoming));
}

#[test]
fn milestone_without_epics_yields_only_direct_tasks() {
    let mut m = Milestone::new("m1", "Release");
    m.project_id = Some("p-empty".into());
    m.start_date = Some(day(2024, 2, 1));
    let mut t = Task::new("t1", "Direct", day(2024, 2, 2));
    t.milestone_id = Some("m1".into());

    let nodes = assemble_timeline(&[m], &[], &[t], now()).unwrap();
    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[1].node, NodeRef::task("t1"));
    assert_eq!(nodes[1].parent, Some(NodeRef::milestone("m1")));
}

#[test]
fn tasks_order_by_date_then_title() {
    let mut m = Milestone::new("m1", "Release");
    m.start_date = Some(day(2024, 2, 1));
    let mk = |id: &str, title: &str, start: DateTime<Utc>| {
        let mut t = Task::new(id, title, day(2024, 1, 1));
        t.start_date = Some(start);
        t.milestone_id = Some("m1".into());
        t
    };
    let tasks = vec![
        mk("t1", "zebra", day(2024, 2, 5)),
        mk("t2", "Apple", day(2024, 2, 5)),
        mk("t3", "mango", day(2024, 2, 2)),
    ];

    let nodes = assemble_timeline(&[m], &[], &tasks, now()).unwrap();
    let ids: Vec<&str> = nodes.iter().map(|n| n.node.id.as_str()).collect();
    assert_eq!(ids, vec!["m1", "t3", "t2", "t1"]);
}

#[test]
fn p1_p2_p3_status_and_progress_agree() {
    let mut rng = Lcg(7);
    for _ in 0..500 {
        let len = rng.below(8) as usize;
        let tasks: Vec<Task> = (0..len)
            .map(|i| {
                let mut t = Task::new(format!("t{i}"), "t", day(2024, 1, 1));
                t.status = rng.status();
                t.story_points = match rng.below(4) {
                    0 => None,
                    1 => Some(0),
                    _ => Some(rng.below(300) as u32),
                };
                t
            })
            .collect();

        let progress = compute_progress(&tasks);
        let status = derive_status(&tasks);
        assert!(progress <= 100);
        if tasks.is_empty() {
            assert_eq!(status, ContainerStatus::Upcoming);
            assert_eq!(progress, 0);
        } else {
            let all_done = tasks.iter().all(|t| t.status == TaskStatus::Done);
            assert_eq!(all_done, status == ContainerStatus::Completed);
            assert_eq!(progress == 100, status == ContainerStatus::Completed, "{tasks:?}");
        }
    }
}

#[test]
fn p4_every_interval_is_positive_and_the_forest_is_valid() {
    let mut rng = Lcg(42);
    for _ in 0..300 {
        let (m, e, t) = random_world(&mut rng);
        let nodes = assemble_timeline(&m, &e, &t, now()).unwrap();
        assert_eq!(nodes.len(), m.len() + e.len() + t.len());
        for n in &nodes {
            assert!(n.end > n.start, "{n:?}");
            assert!(n.progress <= 100);
        }
        assert_eq!(validate_forest(&nodes), Ok(()));
    }
}

#[test]
fn p5_assembly_is_idempotent() {
    let mut rng = Lcg(1234);
    for _ in 0..100 {
        let (m, e, t) = random_world(&mut rng);
        let first = Timeline::assemble(&m, &e, &t, now()).unwrap();
        let second = Timeline::assemble(&m.clone(), &e.clone(), &t.clone(), now()).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn p6_siblings_are_in_start_order() {
    let mut rng = Lcg(99);
    for _ in 0..300 {
        let (m, e, t) = random_world(&mut rng);
        let nodes = assemble_timeline(&m, &e, &t, now()).unwrap();

        // Consecutive siblings of the same kind under the same parent.
        for pair in nodes.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if a.parent.is_some() && a.parent == b.parent && a.node.kind == b.node.kind {
                assert!(a.start <= b.start, "{a:?} before {b:?}");
            }
        }
        // Epics are only followed by their own tasks, so compare epic to epic.
        let mut last: Option<(&Option<NodeRef>, DateTime<Utc>)> = None;
        for n in nodes.iter().filter(|n| n.node.kind == NodeKind::Epic) {
            if let Some((parent, start)) = last {
                if parent == &n.parent && n.parent.is_some() {
                    assert!(start <= n.start);
                }
            }
            last = Some((&n.parent, n.start));
        }
    }
}

#[test]
fn malformed_task_produces_no_nodes() {
    let good = Task::new("ok", "fine", day(2024, 1, 1));
    let mut bad = Task::new("bad", "no timestamp", day(2024, 1, 1));
    bad.created_at = None;
    assert!(assemble_timeline(&[], &[], &[good, bad], now()).is_err());
}
