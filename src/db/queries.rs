use crate::errors::{AppError, AppResult};
use crate::models::attendance::{AttendanceRow, AttendanceTotal};
use crate::models::meeting::{Meeting, MeetingOptions, MeetingStatus};
use crate::models::selector::Selector;
use crate::models::user::LocalUser;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, Result, Row, params};

const MEETING_COLUMNS: &str = "id, course_id, topic, meeting_id, uuid, start_time, duration, \
     timezone, recurring, password, join_before_host, waiting_room, host_video, \
     participant_video, mute_upon_entry, join_url, start_url, exists_on_remote, created_at";

pub fn fmt_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn parse_ts(idx: usize, raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            rusqlite::Error::FromSqlConversionFailure(
                idx,
                rusqlite::types::Type::Text,
                Box::new(AppError::InvalidDate(raw.to_string())),
            )
        })
}

// ---------------------------------------------------------------------------
// Users & enrolments
// ---------------------------------------------------------------------------

/// Insert a user or refresh the names of an existing one (matched by email).
pub fn upsert_user(conn: &Connection, email: &str, firstname: &str, lastname: &str) -> AppResult<i64> {
    let email = email.trim();
    if email.is_empty() {
        return Err(AppError::InvalidValue("email must not be empty".into()));
    }

    conn.execute(
        "INSERT INTO users (email, firstname, lastname) VALUES (?1, ?2, ?3)
         ON CONFLICT(email) DO UPDATE SET firstname = excluded.firstname,
                                          lastname  = excluded.lastname",
        params![email, firstname.trim(), lastname.trim()],
    )?;

    let id = conn.query_row("SELECT id FROM users WHERE email = ?1", [email], |row| {
        row.get(0)
    })?;
    Ok(id)
}

pub fn enrol(conn: &Connection, user_id: i64, course_id: i64) -> AppResult<bool> {
    let changed = conn.execute(
        "INSERT OR IGNORE INTO enrolments (user_id, course_id) VALUES (?1, ?2)",
        params![user_id, course_id],
    )?;
    Ok(changed > 0)
}

pub fn users_in_course(conn: &Connection, course_id: i64) -> AppResult<Vec<LocalUser>> {
    let mut stmt = conn.prepare(
        "SELECT u.id, u.email, u.firstname, u.lastname
         FROM users u
         JOIN enrolments e ON e.user_id = u.id
         WHERE e.course_id = ?1
         ORDER BY u.id ASC",
    )?;

    let rows = stmt.query_map([course_id], |row| {
        Ok(LocalUser {
            id: row.get(0)?,
            email: row.get(1)?,
            firstname: row.get(2)?,
            lastname: row.get(3)?,
        })
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Meetings
// ---------------------------------------------------------------------------

pub fn map_meeting(row: &Row) -> Result<Meeting> {
    let start_raw: String = row.get("start_time")?;
    let status_raw: String = row.get("exists_on_remote")?;

    let status = MeetingStatus::from_db_str(&status_raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            17,
            rusqlite::types::Type::Text,
            Box::new(AppError::InvalidValue(format!(
                "Invalid meeting status: {}",
                status_raw
            ))),
        )
    })?;

    let mut options = MeetingOptions::from_stored(
        row.get::<_, i32>("join_before_host")? == 1,
        row.get::<_, i32>("waiting_room")? == 1,
    );
    options.host_video = row.get::<_, i32>("host_video")? == 1;
    options.participant_video = row.get::<_, i32>("participant_video")? == 1;
    options.mute_upon_entry = row.get::<_, i32>("mute_upon_entry")? == 1;

    Ok(Meeting {
        id: row.get("id")?,
        course_id: row.get("course_id")?,
        topic: row.get("topic")?,
        meeting_id: row.get("meeting_id")?,
        uuid: row.get("uuid")?,
        start_time: parse_ts(5, &start_raw)?,
        duration: row.get("duration")?,
        timezone: row.get("timezone")?,
        recurring: row.get::<_, i32>("recurring")? == 1,
        password: row.get("password")?,
        options,
        join_url: row.get("join_url")?,
        start_url: row.get("start_url")?,
        status,
        created_at: row.get("created_at")?,
    })
}

pub fn insert_meeting(conn: &Connection, m: &Meeting) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO meetings (course_id, topic, meeting_id, uuid, start_time, duration, timezone,
                               recurring, password, join_before_host, waiting_room, host_video,
                               participant_video, mute_upon_entry, join_url, start_url,
                               exists_on_remote, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
        params![
            m.course_id,
            m.topic,
            m.meeting_id,
            m.uuid,
            fmt_ts(&m.start_time),
            m.duration,
            m.timezone,
            m.recurring as i32,
            m.password,
            m.options.join_before_host() as i32,
            m.options.waiting_room() as i32,
            m.options.host_video as i32,
            m.options.participant_video as i32,
            m.options.mute_upon_entry as i32,
            m.join_url,
            m.start_url,
            m.status.to_db_str(),
            m.created_at,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_meeting(conn: &Connection, m: &Meeting) -> AppResult<()> {
    let changed = conn.execute(
        "UPDATE meetings
         SET course_id = ?1, topic = ?2, meeting_id = ?3, uuid = ?4, start_time = ?5,
             duration = ?6, timezone = ?7, recurring = ?8, password = ?9,
             join_before_host = ?10, waiting_room = ?11, host_video = ?12,
             participant_video = ?13, mute_upon_entry = ?14, join_url = ?15,
             start_url = ?16, exists_on_remote = ?17
         WHERE id = ?18",
        params![
            m.course_id,
            m.topic,
            m.meeting_id,
            m.uuid,
            fmt_ts(&m.start_time),
            m.duration,
            m.timezone,
            m.recurring as i32,
            m.password,
            m.options.join_before_host() as i32,
            m.options.waiting_room() as i32,
            m.options.host_video as i32,
            m.options.participant_video as i32,
            m.options.mute_upon_entry as i32,
            m.join_url,
            m.start_url,
            m.status.to_db_str(),
            m.id,
        ],
    )?;

    if changed == 0 {
        return Err(AppError::UnknownMeeting(m.id));
    }
    Ok(())
}

pub fn load_meeting(conn: &Connection, id: i64) -> AppResult<Meeting> {
    let sql = format!("SELECT {} FROM meetings WHERE id = ?1", MEETING_COLUMNS);
    conn.query_row(&sql, [id], map_meeting)
        .optional()?
        .ok_or(AppError::UnknownMeeting(id))
}

fn query_meetings(conn: &Connection, where_clause: &str, param: &dyn rusqlite::ToSql) -> AppResult<Vec<Meeting>> {
    let sql = format!(
        "SELECT {} FROM meetings {} ORDER BY start_time ASC, id ASC",
        MEETING_COLUMNS, where_clause
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = if where_clause.is_empty() {
        stmt.query_map([], map_meeting)?
    } else {
        stmt.query_map([param], map_meeting)?
    };

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn list_meetings(conn: &Connection, course_id: Option<i64>) -> AppResult<Vec<Meeting>> {
    match course_id {
        Some(c) => query_meetings(conn, "WHERE course_id = ?1", &c),
        None => query_meetings(conn, "", &0),
    }
}

/// Resolve a sync selector to the locally stored meetings it targets.
pub fn meetings_for_selector(conn: &Connection, selector: &Selector) -> AppResult<Vec<Meeting>> {
    match selector {
        Selector::Course(id) => query_meetings(conn, "WHERE course_id = ?1", id),
        Selector::MeetingId(id) => query_meetings(conn, "WHERE meeting_id = ?1 AND meeting_id != 0", id),
        Selector::MeetingUuid(uuid) => {
            query_meetings(conn, "WHERE uuid = ?1 AND uuid != ''", uuid)
        }
    }
}

/// Flag a meeting as gone from Zoom. Remote id, UUID and URLs stay as stored.
pub fn mark_meeting_expired(conn: &Connection, id: i64) -> AppResult<()> {
    let changed = conn.execute(
        "UPDATE meetings SET exists_on_remote = 'expired' WHERE id = ?1",
        [id],
    )?;

    if changed == 0 {
        return Err(AppError::UnknownMeeting(id));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Attendance
// ---------------------------------------------------------------------------

/// Replace every attendance row of `meeting_id` with `totals`, atomically.
pub fn replace_attendance(
    conn: &mut Connection,
    meeting_id: i64,
    totals: &[AttendanceTotal],
) -> AppResult<usize> {
    let tx = conn.transaction()?;

    tx.execute("DELETE FROM attendance WHERE meeting_id = ?1", [meeting_id])?;

    {
        let mut stmt = tx.prepare(
            "INSERT INTO attendance (meeting_id, user_id, first_join, last_leave, duration, sessions, grade)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;
        for t in totals {
            stmt.execute(params![
                meeting_id,
                t.user_id,
                fmt_ts(&t.first_join),
                fmt_ts(&t.last_leave),
                t.duration,
                t.sessions,
                t.grade,
            ])?;
        }
    }

    tx.commit()?;
    Ok(totals.len())
}

pub fn load_attendance_totals(conn: &Connection, meeting_id: i64) -> AppResult<Vec<AttendanceTotal>> {
    let mut stmt = conn.prepare(
        "SELECT meeting_id, user_id, first_join, last_leave, duration, sessions, grade
         FROM attendance
         WHERE meeting_id = ?1
         ORDER BY user_id ASC",
    )?;

    let rows = stmt.query_map([meeting_id], |row| {
        let first: String = row.get(2)?;
        let last: String = row.get(3)?;
        Ok(AttendanceTotal {
            meeting_id: row.get(0)?,
            user_id: row.get(1)?,
            first_join: parse_ts(2, &first)?,
            last_leave: parse_ts(3, &last)?,
            duration: row.get(4)?,
            sessions: row.get(5)?,
            grade: row.get(6)?,
        })
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn load_attendance(conn: &Connection, meeting_id: i64) -> AppResult<Vec<AttendanceRow>> {
    let mut stmt = conn.prepare(
        "SELECT a.user_id, u.email, u.firstname || ' ' || u.lastname,
                a.first_join, a.last_leave, a.duration, a.sessions, a.grade
         FROM attendance a
         JOIN users u ON u.id = a.user_id
         WHERE a.meeting_id = ?1
         ORDER BY u.lastname COLLATE NOCASE ASC, u.firstname COLLATE NOCASE ASC",
    )?;

    let rows = stmt.query_map([meeting_id], |row| {
        Ok(AttendanceRow {
            user_id: row.get(0)?,
            email: row.get(1)?,
            name: row.get(2)?,
            first_join: row.get(3)?,
            last_leave: row.get(4)?,
            duration: row.get(5)?,
            sessions: row.get(6)?,
            grade: row.get(7)?,
        })
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn count_rows(conn: &Connection, table: &str) -> Result<i64> {
    conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
        row.get(0)
    })
}
