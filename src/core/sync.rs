//! Report sync job: Zoom participation reports → local attendance totals.

use crate::config::Config;
use crate::core::attendance::aggregate;
use crate::core::matching::UserMatcher;
use crate::db::log::ttlog_quiet;
use crate::db::pool::DbPool;
use crate::db::queries::{mark_meeting_expired, meetings_for_selector, replace_attendance, users_in_course};
use crate::errors::{AppError, AppResult};
use crate::models::meeting::Meeting;
use crate::models::selector::Selector;
use crate::ui::messages::{success, warning};
use crate::zoom::ZoomApi;
use crate::zoom::report::fetch_participants;
use crate::zoom::retry::RetryPolicy;
use chrono::NaiveDate;

/// Optional inclusive filter on the meetings' scheduled start date.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.from.is_none_or(|f| day >= f) && self.to.is_none_or(|t| day <= t)
    }

    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    fn describe(&self) -> String {
        let bound = |d: Option<NaiveDate>| d.map(|d| d.to_string()).unwrap_or_else(|| "..".into());
        format!("{} to {}", bound(self.from), bound(self.to))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub meetings: usize,
    pub synced: usize,
    pub failed: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub rows: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct MeetingOutcome {
    matched: usize,
    unmatched: usize,
    rows: usize,
}

pub struct SyncJob<'a> {
    api: &'a dyn ZoomApi,
    policy: RetryPolicy,
    max_grade: f64,
    range: DateRange,
}

impl<'a> SyncJob<'a> {
    pub fn new(api: &'a dyn ZoomApi, cfg: &Config, range: DateRange) -> Self {
        Self {
            api,
            policy: RetryPolicy::new(cfg.max_retries, cfg.retry_backoff_ms),
            max_grade: cfg.max_grade,
            range,
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sync every meeting the selector resolves to, one after the other.
    /// The date range narrows the meetings by scheduled start; each synced
    /// meeting always gets its full report.
    /// A failing meeting is reported and skipped; the batch goes on.
    pub fn run(&self, pool: &mut DbPool, selector: &Selector) -> AppResult<SyncSummary> {
        let mut meetings = meetings_for_selector(&pool.conn, selector)?;
        meetings.retain(|m| self.range.contains(m.start_time.date_naive()));

        if meetings.is_empty() {
            let scope = if self.range.is_unbounded() {
                selector.to_string()
            } else {
                format!("{} starting {}", selector, self.range.describe())
            };
            return Err(AppError::NoMeetings(scope));
        }

        let mut summary = SyncSummary {
            meetings: meetings.len(),
            ..SyncSummary::default()
        };

        for meeting in &meetings {
            match self.sync_meeting(pool, meeting, selector) {
                Ok(out) => {
                    summary.synced += 1;
                    summary.matched += out.matched;
                    summary.unmatched += out.unmatched;
                    summary.rows += out.rows;
                    success(format!(
                        "Meeting {} '{}': {} attendance rows, {} unmatched participants",
                        meeting.id, meeting.topic, out.rows, out.unmatched
                    ));
                }
                Err(AppError::RemoteNotFound(_)) => {
                    summary.failed += 1;
                    warning(format!(
                        "Meeting {} '{}' no longer exists on Zoom: marked expired",
                        meeting.id, meeting.topic
                    ));
                    mark_meeting_expired(&pool.conn, meeting.id)?;
                    ttlog_quiet(&pool.conn, "meeting_expired", &meeting.id.to_string(), "not found during sync");
                }
                Err(e) => {
                    summary.failed += 1;
                    warning(format!("Meeting {} '{}' skipped: {}", meeting.id, meeting.topic, e));
                    ttlog_quiet(&pool.conn, "sync_failed", &meeting.id.to_string(), &e.to_string());
                }
            }
        }

        ttlog_quiet(
            &pool.conn,
            "sync",
            &selector.to_string(),
            &format!(
                "meetings={} synced={} failed={} matched={} unmatched={} rows={}",
                summary.meetings,
                summary.synced,
                summary.failed,
                summary.matched,
                summary.unmatched,
                summary.rows
            ),
        );

        Ok(summary)
    }

    /// The identifier used against the report endpoint: what the user
    /// asked for, else the stored UUID, else the numeric id.
    fn report_ref(meeting: &Meeting, selector: &Selector) -> Option<String> {
        match selector {
            Selector::MeetingUuid(uuid) => return Some(uuid.clone()),
            Selector::MeetingId(id) => return Some(id.to_string()),
            Selector::Course(_) => {}
        }
        if !meeting.uuid.is_empty() {
            return Some(meeting.uuid.clone());
        }
        (meeting.meeting_id != 0).then(|| meeting.meeting_id.to_string())
    }

    fn sync_meeting(
        &self,
        pool: &mut DbPool,
        meeting: &Meeting,
        selector: &Selector,
    ) -> AppResult<MeetingOutcome> {
        let reference = Self::report_ref(meeting, selector).ok_or_else(|| {
            AppError::Other("meeting has no Zoom id (it was never created remotely)".into())
        })?;

        let records = fetch_participants(self.api, &reference, &self.policy)?;

        let users = users_in_course(&pool.conn, meeting.course_id)?;
        let matcher = UserMatcher::new(&users);

        let mut matched = Vec::with_capacity(records.len());
        let mut unmatched = 0;
        for rec in &records {
            match matcher.resolve(rec) {
                Some((user, kind)) => {
                    log::debug!("'{}' → user {} ({:?})", rec.name, user.id, kind);
                    matched.push((user.id, rec));
                }
                None => {
                    log::info!("meeting {}: no local user for '{}'", meeting.id, rec.name);
                    unmatched += 1;
                }
            }
        }

        let totals = aggregate(meeting, &matched, self.max_grade);
        let rows = replace_attendance(&mut pool.conn, meeting.id, &totals)?;

        Ok(MeetingOutcome {
            matched: matched.len(),
            unmatched,
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::meeting::MeetingLogic;
    use crate::core::testing::{FakeZoom, at, participant, test_pool};
    use crate::db::queries::{enrol, load_attendance_totals, load_meeting, upsert_user};
    use crate::models::meeting::{MeetingDraft, MeetingOptions, MeetingStatus};
    use crate::zoom::CreatedMeeting;

    fn cfg() -> Config {
        Config {
            retry_backoff_ms: 0,
            ..Config::default()
        }
    }

    fn add_user(pool: &DbPool, course: i64, email: &str, first: &str, last: &str) -> i64 {
        let id = upsert_user(&pool.conn, email, first, last).unwrap();
        enrol(&pool.conn, id, course).unwrap();
        id
    }

    fn add_meeting(pool: &mut DbPool, course: i64, remote: i64, uuid: &str) -> Meeting {
        add_meeting_on(pool, course, remote, uuid, at(9, 0))
    }

    fn add_meeting_on(
        pool: &mut DbPool,
        course: i64,
        remote: i64,
        uuid: &str,
        start: chrono::DateTime<chrono::Utc>,
    ) -> Meeting {
        let api = FakeZoom::default().with_created(CreatedMeeting {
            id: remote,
            uuid: uuid.into(),
            join_url: format!("https://zoom.us/j/{remote}"),
            start_url: format!("https://zoom.us/s/{remote}"),
        });
        let draft = MeetingDraft {
            course_id: course,
            topic: format!("Meeting {remote}"),
            start_time: start,
            duration: 60,
            timezone: "UTC".into(),
            recurring: false,
            password: String::new(),
            options: MeetingOptions::default(),
        };
        MeetingLogic::create(pool, &api, &draft).unwrap()
    }

    #[test]
    fn test_sync_is_idempotent() {
        let mut pool = test_pool();
        let ada = add_user(&pool, 1, "ada@example.org", "Ada", "Lovelace");
        let alan = add_user(&pool, 1, "alan@example.org", "Alan", "Turing");
        let m = add_meeting(&mut pool, 1, 100, "uuid-100");

        let api = FakeZoom::default().with_report(
            "uuid-100",
            vec![
                participant("Ada L.", Some("ada@example.org"), at(9, 0), 30),
                participant("Ada L.", Some("ada@example.org"), at(9, 40), 20),
                participant("Alan Turing", None, at(9, 5), 55),
            ],
        );
        let job = SyncJob::new(&api, &cfg(), DateRange::default());

        let first = job.run(&mut pool, &Selector::Course(1)).unwrap();
        let rows_first = load_attendance_totals(&pool.conn, m.id).unwrap();
        let second = job.run(&mut pool, &Selector::Course(1)).unwrap();
        let rows_second = load_attendance_totals(&pool.conn, m.id).unwrap();

        assert_eq!(first, second);
        assert_eq!(rows_first, rows_second);
        assert_eq!(rows_first.len(), 2);
        assert_eq!(rows_first[0].user_id, ada);
        assert_eq!(rows_first[0].duration, 50 * 60);
        assert_eq!(rows_first[0].sessions, 2);
        assert_eq!(rows_first[1].user_id, alan);
    }

    #[test]
    fn test_rerun_replaces_previous_totals() {
        let mut pool = test_pool();
        let ada = add_user(&pool, 1, "ada@example.org", "Ada", "Lovelace");
        add_user(&pool, 1, "alan@example.org", "Alan", "Turing");
        let m = add_meeting(&mut pool, 1, 100, "uuid-100");

        let before = FakeZoom::default().with_report(
            "100",
            vec![
                participant("Ada", Some("ada@example.org"), at(9, 0), 10),
                participant("Alan", Some("alan@example.org"), at(9, 0), 10),
            ],
        );
        SyncJob::new(&before, &cfg(), DateRange::default())
            .run(&mut pool, &Selector::MeetingId(100))
            .unwrap();

        let after = FakeZoom::default().with_report(
            "100",
            vec![participant("Ada", Some("ada@example.org"), at(9, 0), 45)],
        );
        SyncJob::new(&after, &cfg(), DateRange::default())
            .run(&mut pool, &Selector::MeetingId(100))
            .unwrap();

        let rows = load_attendance_totals(&pool.conn, m.id).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].user_id, ada);
        assert_eq!(rows[0].duration, 45 * 60);
        assert_eq!(rows[0].grade, 75.0);
        assert_eq!(after.report_calls.borrow()[0], ("100".to_string(), None));
    }

    #[test]
    fn test_unmatched_records_are_skipped_and_counted() {
        let mut pool = test_pool();
        let ada = add_user(&pool, 1, "ada@example.org", "Ada", "Lovelace");
        add_user(&pool, 2, "other@example.org", "Other", "Course");
        let m = add_meeting(&mut pool, 1, 100, "uuid-100");

        let api = FakeZoom::default().with_report(
            "uuid-100",
            vec![
                participant("Guest", Some("guest@nowhere.org"), at(9, 0), 30),
                participant("Ada", Some("ADA@example.org"), at(9, 0), 30),
                // enrolled in another course only
                participant("Other Course", Some("other@example.org"), at(9, 0), 30),
            ],
        );

        let summary = SyncJob::new(&api, &cfg(), DateRange::default())
            .run(&mut pool, &Selector::Course(1))
            .unwrap();

        assert_eq!(summary.matched, 1);
        assert_eq!(summary.unmatched, 2);
        assert_eq!(summary.synced, 1);

        let rows = load_attendance_totals(&pool.conn, m.id).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].user_id, ada);
    }

    #[test]
    fn test_no_meetings_is_an_error_and_writes_nothing() {
        let mut pool = test_pool();
        add_meeting(&mut pool, 1, 100, "uuid-100");
        let api = FakeZoom::default();

        let err = SyncJob::new(&api, &cfg(), DateRange::default())
            .run(&mut pool, &Selector::Course(42))
            .unwrap_err();

        assert!(matches!(err, AppError::NoMeetings(_)));
        assert!(err.to_string().contains("course 42"));
        assert!(api.report_calls.borrow().is_empty());
        let count: i64 = pool
            .conn
            .query_row("SELECT COUNT(*) FROM attendance", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_failure_on_one_meeting_does_not_stop_the_batch() {
        let mut pool = test_pool();
        add_user(&pool, 1, "ada@example.org", "Ada", "Lovelace");
        let broken = add_meeting(&mut pool, 1, 100, "uuid-100");
        let gone = add_meeting(&mut pool, 1, 200, "uuid-200");
        let good = add_meeting(&mut pool, 1, 300, "uuid-300");

        let api = FakeZoom::default()
            .with_report_error(
                "uuid-100",
                AppError::Api {
                    status: 400,
                    message: "bad".into(),
                },
            )
            .with_report_error("uuid-200", AppError::RemoteNotFound("uuid-200".into()))
            .with_report(
                "uuid-300",
                vec![participant("Ada", Some("ada@example.org"), at(9, 0), 60)],
            );

        let summary = SyncJob::new(&api, &cfg(), DateRange::default())
            .run(&mut pool, &Selector::Course(1))
            .unwrap();

        assert_eq!(summary.meetings, 3);
        assert_eq!(summary.synced, 1);
        assert_eq!(summary.failed, 2);
        assert_eq!(load_attendance_totals(&pool.conn, good.id).unwrap().len(), 1);

        let gone = load_meeting(&pool.conn, gone.id).unwrap();
        assert_eq!(gone.status, MeetingStatus::Expired);
        assert_eq!(gone.meeting_id, 200);
        assert_eq!(gone.uuid, "uuid-200");
        assert_eq!(gone.join_url, "https://zoom.us/j/200");
        assert_eq!(gone.start_url, "https://zoom.us/s/200");
        assert_eq!(
            load_meeting(&pool.conn, broken.id).unwrap().status,
            MeetingStatus::Exists
        );
    }

    #[test]
    fn test_expired_meeting_keeps_identity_and_attendance() {
        let mut pool = test_pool();
        let ada = add_user(&pool, 1, "ada@example.org", "Ada", "Lovelace");
        let m = add_meeting(&mut pool, 1, 200, "uuid-200");

        let live = FakeZoom::default().with_report(
            "uuid-200",
            vec![participant("Ada", Some("ada@example.org"), at(9, 0), 30)],
        );
        SyncJob::new(&live, &cfg(), DateRange::default())
            .run(&mut pool, &Selector::Course(1))
            .unwrap();

        let deleted = FakeZoom::default()
            .with_report_error("uuid-200", AppError::RemoteNotFound("uuid-200".into()));
        let summary = SyncJob::new(&deleted, &cfg(), DateRange::default())
            .run(&mut pool, &Selector::Course(1))
            .unwrap();
        assert_eq!(summary.failed, 1);

        let stored = load_meeting(&pool.conn, m.id).unwrap();
        assert_eq!(stored.status, MeetingStatus::Expired);
        assert_eq!(stored.start_time, m.start_time);
        assert_eq!(stored.duration, m.duration);

        let rows = load_attendance_totals(&pool.conn, m.id).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].user_id, ada);

        // still selectable by its Zoom id
        let again = FakeZoom::default().with_report(
            "200",
            vec![participant("Ada", Some("ada@example.org"), at(9, 0), 45)],
        );
        let summary = SyncJob::new(&again, &cfg(), DateRange::default())
            .run(&mut pool, &Selector::MeetingId(200))
            .unwrap();
        assert_eq!(summary.synced, 1);
        assert_eq!(load_attendance_totals(&pool.conn, m.id).unwrap()[0].duration, 45 * 60);
    }

    #[test]
    fn test_transient_errors_are_retried() {
        let mut pool = test_pool();
        add_meeting(&mut pool, 1, 100, "uuid-100");
        let api = FakeZoom::default().with_report_error(
            "uuid-100",
            AppError::Api {
                status: 502,
                message: "gateway".into(),
            },
        );

        let summary = SyncJob::new(&api, &cfg(), DateRange::default())
            .with_policy(RetryPolicy::new(2, 0))
            .run(&mut pool, &Selector::Course(1))
            .unwrap();

        assert_eq!(summary.failed, 1);
        assert_eq!(api.report_calls.borrow().len(), 3);
    }

    #[test]
    fn test_all_pages_are_fetched() {
        let mut pool = test_pool();
        let names = ["a", "b", "c", "d", "e"];
        for n in names {
            add_user(&pool, 1, &format!("{n}@example.org"), n, "x");
        }
        let m = add_meeting(&mut pool, 1, 100, "uuid-100");

        let records = names
            .iter()
            .map(|n| participant(n, Some(format!("{n}@example.org").as_str()), at(9, 0), 10))
            .collect();
        let api = FakeZoom::default()
            .with_report("uuid-100", records)
            .with_page_size(2);

        let summary = SyncJob::new(&api, &cfg(), DateRange::default())
            .run(&mut pool, &Selector::MeetingUuid("uuid-100".into()))
            .unwrap();

        assert_eq!(summary.rows, 5);
        assert_eq!(api.report_calls.borrow().len(), 3);
        assert_eq!(load_attendance_totals(&pool.conn, m.id).unwrap().len(), 5);
    }

    #[test]
    fn test_date_range_selects_meetings_by_start() {
        let mut pool = test_pool();
        add_user(&pool, 1, "ada@example.org", "Ada", "Lovelace");
        let next_day = at(9, 0) + chrono::Duration::days(1);
        let first = add_meeting(&mut pool, 1, 100, "uuid-100");
        let second = add_meeting_on(&mut pool, 1, 200, "uuid-200", next_day);

        let full = FakeZoom::default()
            .with_report(
                "uuid-100",
                vec![participant("Ada", Some("ada@example.org"), at(9, 0), 10)],
            )
            .with_report(
                "uuid-200",
                vec![participant("Ada", Some("ada@example.org"), next_day, 20)],
            );
        SyncJob::new(&full, &cfg(), DateRange::default())
            .run(&mut pool, &Selector::Course(1))
            .unwrap();

        // the earlier meeting's report is gone remotely; it must not be touched
        let later = FakeZoom::default().with_report(
            "uuid-200",
            vec![participant("Ada", Some("ada@example.org"), next_day, 40)],
        );
        let range = DateRange {
            from: Some(next_day.date_naive()),
            to: None,
        };
        let summary = SyncJob::new(&later, &cfg(), range)
            .run(&mut pool, &Selector::Course(1))
            .unwrap();

        assert_eq!(summary.meetings, 1);
        assert_eq!(summary.failed, 0);
        assert_eq!(later.report_calls.borrow().len(), 1);

        let kept = load_attendance_totals(&pool.conn, first.id).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].duration, 10 * 60);

        let refreshed = load_attendance_totals(&pool.conn, second.id).unwrap();
        assert_eq!(refreshed[0].duration, 40 * 60);
    }

    #[test]
    fn test_date_range_without_meetings_writes_nothing() {
        let mut pool = test_pool();
        add_user(&pool, 1, "ada@example.org", "Ada", "Lovelace");
        let m = add_meeting(&mut pool, 1, 100, "uuid-100");

        let api = FakeZoom::default().with_report(
            "uuid-100",
            vec![participant("Ada", Some("ada@example.org"), at(9, 0), 30)],
        );
        SyncJob::new(&api, &cfg(), DateRange::default())
            .run(&mut pool, &Selector::Course(1))
            .unwrap();

        let range = DateRange {
            from: NaiveDate::from_ymd_opt(2025, 4, 1),
            to: None,
        };
        let err = SyncJob::new(&api, &cfg(), range)
            .run(&mut pool, &Selector::Course(1))
            .unwrap_err();

        assert!(matches!(err, AppError::NoMeetings(_)));
        assert!(err.to_string().contains("course 1 starting 2025-04-01 to .."));
        assert_eq!(load_attendance_totals(&pool.conn, m.id).unwrap().len(), 1);
    }

    #[test]
    fn test_meeting_without_remote_id_counts_as_failed() {
        let mut pool = test_pool();
        // creation refused → stored as expired with id 0
        let draft = MeetingDraft {
            course_id: 1,
            topic: "never created".into(),
            start_time: at(9, 0),
            duration: 60,
            timezone: "UTC".into(),
            recurring: false,
            password: String::new(),
            options: MeetingOptions::default(),
        };
        MeetingLogic::create(&mut pool, &FakeZoom::default(), &draft).unwrap();

        let api = FakeZoom::default();
        let summary = SyncJob::new(&api, &cfg(), DateRange::default())
            .run(&mut pool, &Selector::Course(1))
            .unwrap();

        assert_eq!(summary.failed, 1);
        assert!(api.report_calls.borrow().is_empty());
    }
}
