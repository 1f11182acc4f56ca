//! Date resolution for scheduled entities.
//!
//! Entities arrive with loosely populated dates. This module turns any of them
//! into a concrete, strictly positive interval by walking a fixed fallback
//! chain, and provides the date parsing used at the data boundary and by the
//! CLI.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::fields::NodeKind;

/// Default duration of a task without an hour estimate.
pub const TASK_DEFAULT_DAYS: i64 = 7;
/// Default duration of an epic without a due date.
pub const EPIC_DEFAULT_DAYS: i64 = 7;
/// Default duration of a milestone without a due date.
pub const MILESTONE_DEFAULT_DAYS: i64 = 30;
/// Working hours that make up one scheduled day.
pub const HOURS_PER_DAY: f64 = 8.0;
/// Length applied to any interval that would otherwise be empty or inverted.
pub const MIN_DURATION_DAYS: i64 = 1;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Anything the resolver can place on a timeline.
pub trait Schedulable {
    fn node_kind(&self) -> NodeKind;
    fn start_date(&self) -> Option<DateTime<Utc>>;
    fn due_date(&self) -> Option<DateTime<Utc>>;
    fn created_at(&self) -> Option<DateTime<Utc>>;

    /// Effort estimate in working hours; only tasks carry one.
    fn estimated_hours(&self) -> Option<f64> {
        None
    }
}

/// Fallback instants used when an entity has no usable date of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchors {
    pub parent_start: Option<DateTime<Utc>>,
    pub now: DateTime<Utc>,
}

impl Anchors {
    /// Anchors for a root node: only "now" is available.
    pub fn root(now: DateTime<Utc>) -> Self {
        Anchors { parent_start: None, now }
    }

    /// Anchors for a node nested under a parent with a resolved start.
    pub fn under(parent_start: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        Anchors { parent_start: Some(parent_start), now }
    }
}

/// A resolved `[start, end)` pair. `end > start` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Interval {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Resolve the start and end of an entity.
///
/// Start: explicit start, then creation time, then the parent's start, then
/// now. End: explicit due date, else start plus the inferred duration. A
/// zero-length or inverted result is stretched to one day.
pub fn resolve_interval<S: Schedulable + ?Sized>(entity: &S, anchors: &Anchors) -> Interval {
    let start = entity
        .start_date()
        .or_else(|| entity.created_at())
        .or(anchors.parent_start)
        .unwrap_or(anchors.now);

    let end = entity
        .due_date()
        .unwrap_or_else(|| add_saturating(start, inferred_duration(entity)));

    enforce_min_duration(start, end)
}

/// Duration used when an entity has no due date.
pub fn inferred_duration<S: Schedulable + ?Sized>(entity: &S) -> Duration {
    match entity.node_kind() {
        NodeKind::Task => entity
            .estimated_hours()
            .and_then(hours_to_schedule_duration)
            .unwrap_or_else(|| Duration::days(TASK_DEFAULT_DAYS)),
        NodeKind::Epic => Duration::days(EPIC_DEFAULT_DAYS),
        NodeKind::Milestone => Duration::days(MILESTONE_DEFAULT_DAYS),
    }
}

/// Convert an hour estimate into calendar time at `HOURS_PER_DAY` per day.
fn hours_to_schedule_duration(hours: f64) -> Option<Duration> {
    if !hours.is_finite() || hours <= 0.0 {
        return None;
    }
    let seconds = (hours / HOURS_PER_DAY * SECONDS_PER_DAY).round();
    if seconds >= i64::MAX as f64 {
        return None;
    }
    Duration::try_seconds(seconds as i64)
}

fn enforce_min_duration(start: DateTime<Utc>, end: DateTime<Utc>) -> Interval {
    if end > start {
        return Interval { start, end };
    }
    let min = Duration::days(MIN_DURATION_DAYS);
    match start.checked_add_signed(min) {
        Some(end) => Interval { start, end },
        // Start is at the top of the representable range; pull it back instead.
        None => Interval { start: start - min, end: start },
    }
}

fn add_saturating(start: DateTime<Utc>, d: Duration) -> DateTime<Utc> {
    start.checked_add_signed(d).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Midnight UTC on the given calendar day.
pub fn midnight_utc(d: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&d.and_time(NaiveTime::MIN))
}

/// Parse an instant from RFC 3339 or a bare `YYYY-MM-DD` date.
pub fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok().map(midnight_utc)
}

/// Parse human-readable date input relative to `today`.
///
/// Supports:
/// - "today", "tomorrow", "yesterday"
/// - "end of month" / "eom"
/// - "in 3d", "in 2w", "in 1m"
/// - "YYYY-MM-DD" and RFC 3339
pub fn parse_date_input(s: &str, today: NaiveDate) -> Option<DateTime<Utc>> {
    let s = s.trim().to_lowercase();

    match s.as_str() {
        "today" | "now" => return Some(midnight_utc(today)),
        "tomorrow" => return today.succ_opt().map(midnight_utc),
        "yesterday" => return today.pred_opt().map(midnight_utc),
        "end of month" | "eom" => {
            let (year, month) = if today.month() == 12 {
                (today.year() + 1, 1)
            } else {
                (today.year(), today.month() + 1)
            };
            let first_of_next = NaiveDate::from_ymd_opt(year, month, 1)?;
            return first_of_next.pred_opt().map(midnight_utc);
        }
        _ => {}
    }

    if let Some(rest) = s.strip_prefix("in ") {
        let rest = rest.trim();
        let (n, unit_days) = if let Some(n) = rest.strip_suffix('d') {
            (n, 1)
        } else if let Some(n) = rest.strip_suffix('w') {
            (n, 7)
        } else if let Some(n) = rest.strip_suffix('m') {
            // Approximate: 30 days per month
            (n, 30)
        } else {
            return None;
        };
        let n: i64 = n.trim().parse().ok()?;
        let offset = Duration::try_days(n.checked_mul(unit_days)?)?;
        return today.checked_add_signed(offset).map(midnight_utc);
    }

    // RFC 3339 is case sensitive on the 'T' separator in some producers.
    parse_instant(&s.to_uppercase())
}

/// Serde adapter for optional instants that accepts RFC 3339 or `YYYY-MM-DD`.
pub mod flexible {
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_some(&dt.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => super::parse_instant(s)
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("invalid date '{s}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Probe {
        kind: NodeKind,
        start: Option<DateTime<Utc>>,
        due: Option<DateTime<Utc>>,
        created: Option<DateTime<Utc>>,
        hours: Option<f64>,
    }

    impl Probe {
        fn new(kind: NodeKind) -> Self {
            Probe { kind, start: None, due: None, created: None, hours: None }
        }
    }

    impl Schedulable for Probe {
        fn node_kind(&self) -> NodeKind {
            self.kind
        }
        fn start_date(&self) -> Option<DateTime<Utc>> {
            self.start
        }
        fn due_date(&self) -> Option<DateTime<Utc>> {
            self.due
        }
        fn created_at(&self) -> Option<DateTime<Utc>> {
            self.created
        }
        fn estimated_hours(&self) -> Option<f64> {
            self.hours
        }
    }

    fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        midnight_utc(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[test]
    fn start_falls_back_through_the_chain() {
        let now = day(2024, 6, 1);
        let parent = day(2024, 2, 1);

        let mut p = Probe::new(NodeKind::Epic);
        assert_eq!(resolve_interval(&p, &Anchors::root(now)).start, now);
        assert_eq!(resolve_interval(&p, &Anchors::under(parent, now)).start, parent);

        p.created = Some(day(2024, 1, 15));
        assert_eq!(resolve_interval(&p, &Anchors::under(parent, now)).start, day(2024, 1, 15));

        p.start = Some(day(2024, 1, 20));
        assert_eq!(resolve_interval(&p, &Anchors::under(parent, now)).start, day(2024, 1, 20));
    }

    #[test]
    fn default_durations_per_kind() {
        let now = day(2024, 1, 1);
        let anchors = Anchors::root(now);
        assert_eq!(resolve_interval(&Probe::new(NodeKind::Task), &anchors).end, day(2024, 1, 8));
        assert_eq!(resolve_interval(&Probe::new(NodeKind::Epic), &anchors).end, day(2024, 1, 8));
        assert_eq!(
            resolve_interval(&Probe::new(NodeKind::Milestone), &anchors).end,
            day(2024, 1, 31)
        );
    }

    #[test]
    fn hour_estimates_scale_at_eight_hours_per_day() {
        let mut p = Probe::new(NodeKind::Task);
        p.created = Some(day(2024, 5, 1));
        p.hours = Some(16.0);
        let iv = resolve_interval(&p, &Anchors::root(day(2030, 1, 1)));
        assert_eq!(iv.start, day(2024, 5, 1));
        assert_eq!(iv.end, day(2024, 5, 3));

        p.hours = Some(4.0);
        assert_eq!(resolve_interval(&p, &Anchors::root(day(2030, 1, 1))).duration(), Duration::hours(12));
    }

    #[test]
    fn unusable_hour_estimates_use_default() {
        let mut p = Probe::new(NodeKind::Task);
        p.created = Some(day(2024, 5, 1));
        for bad in [0.0, -3.0, f64::NAN, f64::INFINITY, 1e300] {
            p.hours = Some(bad);
            assert_eq!(
                resolve_interval(&p, &Anchors::root(day(2030, 1, 1))).end,
                day(2024, 5, 8),
                "hours = {bad}"
            );
        }
    }

    #[test]
    fn inverted_and_empty_intervals_get_one_day() {
        let mut p = Probe::new(NodeKind::Task);
        p.start = Some(day(2024, 3, 10));
        p.due = Some(day(2024, 3, 5));
        let iv = resolve_interval(&p, &Anchors::root(day(2024, 1, 1)));
        assert_eq!((iv.start, iv.end), (day(2024, 3, 10), day(2024, 3, 11)));

        p.due = Some(day(2024, 3, 10));
        let iv = resolve_interval(&p, &Anchors::root(day(2024, 1, 1)));
        assert_eq!(iv.end, day(2024, 3, 11));
    }

    #[test]
    fn interval_stays_positive_at_the_edge_of_time() {
        let mut p = Probe::new(NodeKind::Milestone);
        p.start = Some(DateTime::<Utc>::MAX_UTC);
        let iv = resolve_interval(&p, &Anchors::root(day(2024, 1, 1)));
        assert!(iv.end > iv.start);
    }

    #[test]
    fn test_parse_date_input() {
        let today = NaiveDate::from_ymd_opt(2024, 2, 10).unwrap();
        assert_eq!(parse_date_input("today", today), Some(day(2024, 2, 10)));
        assert_eq!(parse_date_input("Tomorrow", today), Some(day(2024, 2, 11)));
        assert_eq!(parse_date_input("in 3d", today), Some(day(2024, 2, 13)));
        assert_eq!(parse_date_input("in 2w", today), Some(day(2024, 2, 24)));
        assert_eq!(parse_date_input("eom", today), Some(day(2024, 2, 29)));
        assert_eq!(parse_date_input("2024-01-01", today), Some(day(2024, 1, 1)));
        assert_eq!(
            parse_date_input("2024-01-01t12:00:00z", today),
            Some(day(2024, 1, 1) + Duration::hours(12))
        );
        assert_eq!(parse_date_input("someday", today), None);
    }

    #[test]
    fn out_of_range_offsets_are_rejected() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(parse_date_input("in 999999999999d", today), None);
        assert_eq!(parse_date_input("in 9223372036854775807w", today), None);
        assert_eq!(parse_date_input("in -999999999m", today), None);
        assert_eq!(parse_date_input("tomorrow", NaiveDate::MAX), None);
        assert_eq!(parse_date_input("yesterday", NaiveDate::MIN), None);
        assert_eq!(parse_date_input("in -3d", today), Some(day(2023, 12, 29)));
    }

    #[test]
    fn flexible_accepts_dates_and_instants() {
        #[derive(serde::Deserialize)]
        struct Row {
            #[serde(default, with = "flexible")]
            at: Option<DateTime<Utc>>,
        }
        let a: Row = serde_json::from_str(r#"{"at": "2024-01-01"}"#).unwrap();
        let b: Row = serde_json::from_str(r#"{"at": "2024-01-01T00:00:00Z"}"#).unwrap();
        let c: Row = serde_json::from_str(r#"{"at": null}"#).unwrap();
        let d: Row = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(a.at, Some(day(2024, 1, 1)));
        assert_eq!(a.at, b.at);
        assert_eq!(c.at, None);
        assert_eq!(d.at, None);
        assert!(serde_json::from_str::<Row>(r#"{"at": "soon"}"#).is_err());
    }
}
