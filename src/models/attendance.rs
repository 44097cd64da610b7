use chrono::{DateTime, Utc};
use serde::Serialize;

/// Derived attendance of one local user in one meeting.
/// At most one row per (meeting_id, user_id).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttendanceTotal {
    pub meeting_id: i64,
    pub user_id: i64,
    pub first_join: DateTime<Utc>,
    pub last_leave: DateTime<Utc>,
    /// seconds, overlapping sessions counted once
    pub duration: i64,
    pub sessions: i64,
    pub grade: f64,
}

/// Attendance row joined with the user it belongs to, for reporting.
#[derive(Debug, Clone, Serialize)]
pub struct AttendanceRow {
    pub user_id: i64,
    pub email: String,
    pub name: String,
    pub first_join: String,
    pub last_leave: String,
    pub duration: i64,
    pub sessions: i64,
    pub grade: f64,
}
