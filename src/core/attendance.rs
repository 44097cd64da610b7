use crate::models::attendance::AttendanceTotal;
use crate::models::meeting::Meeting;
use crate::models::participant::ParticipationRecord;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Total seconds covered by a set of intervals, overlaps counted once.
pub fn merged_seconds(mut intervals: Vec<(DateTime<Utc>, DateTime<Utc>)>) -> i64 {
    intervals.sort();

    let mut total = 0;
    let mut current: Option<(DateTime<Utc>, DateTime<Utc>)> = None;

    for (start, end) in intervals {
        match current {
            Some((cs, ce)) if start <= ce => current = Some((cs, ce.max(end))),
            Some((cs, ce)) => {
                total += (ce - cs).num_seconds();
                current = Some((start, end));
            }
            None => current = Some((start, end)),
        }
    }

    if let Some((cs, ce)) = current {
        total += (ce - cs).num_seconds();
    }
    total
}

/// Share of the scheduled duration attended, scaled to `max_grade`.
pub fn grade_for(attended: i64, scheduled: i64, max_grade: f64) -> f64 {
    if scheduled <= 0 {
        return 0.0;
    }
    let ratio = (attended as f64 / scheduled as f64).min(1.0);
    (ratio * max_grade * 100.0).round() / 100.0
}

/// Fold matched records into one total per user, ordered by user id.
pub fn aggregate(
    meeting: &Meeting,
    matched: &[(i64, &ParticipationRecord)],
    max_grade: f64,
) -> Vec<AttendanceTotal> {
    let mut per_user: BTreeMap<i64, Vec<&ParticipationRecord>> = BTreeMap::new();
    for (user_id, rec) in matched {
        per_user.entry(*user_id).or_default().push(*rec);
    }

    per_user
        .into_iter()
        .filter_map(|(user_id, recs)| {
            let first_join = recs.iter().map(|r| r.join_time).min()?;
            let last_leave = recs.iter().map(|r| r.end_time()).max()?;
            let duration =
                merged_seconds(recs.iter().map(|r| (r.join_time, r.end_time())).collect());

            Some(AttendanceTotal {
                meeting_id: meeting.id,
                user_id,
                first_join,
                last_leave,
                duration,
                sessions: recs.len() as i64,
                grade: grade_for(duration, meeting.scheduled_seconds(), max_grade),
            })
        })
        .collect()
}
