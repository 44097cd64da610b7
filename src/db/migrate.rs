use crate::ui::messages::success;
use rusqlite::{Connection, OptionalExtension, Result};

/// Ensure that the `log` table exists. It also records applied migrations.
fn ensure_log_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn migration_applied(conn: &Connection, version: &str) -> Result<bool> {
    let mut chk = conn.prepare(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

/// Run `sql` once, then mark `version` as applied in the log table.
fn apply_migration(conn: &Connection, version: &str, description: &str, sql: &str) -> Result<()> {
    if migration_applied(conn, version)? {
        return Ok(());
    }

    conn.execute_batch(&format!("BEGIN;\n{}\nCOMMIT;", sql))
        .inspect_err(|_| {
            let _ = conn.execute_batch("ROLLBACK;");
        })?;

    conn.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (datetime('now'), 'migration_applied', ?1, ?2)",
        [version, description],
    )?;

    success(format!("Migration applied: {} → {}", version, description));
    Ok(())
}

const CREATE_CORE_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    email      TEXT NOT NULL UNIQUE COLLATE NOCASE,
    firstname  TEXT NOT NULL DEFAULT '',
    lastname   TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS enrolments (
    user_id    INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    course_id  INTEGER NOT NULL,
    PRIMARY KEY (user_id, course_id)
);

CREATE TABLE IF NOT EXISTS meetings (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    course_id        INTEGER NOT NULL,
    topic            TEXT NOT NULL,
    meeting_id       INTEGER NOT NULL DEFAULT 0,
    uuid             TEXT NOT NULL DEFAULT '',
    start_time       TEXT NOT NULL,
    duration         INTEGER NOT NULL DEFAULT 0,
    timezone         TEXT NOT NULL DEFAULT 'UTC',
    recurring        INTEGER NOT NULL DEFAULT 0,
    password         TEXT NOT NULL DEFAULT '',
    join_before_host INTEGER NOT NULL DEFAULT 0,
    waiting_room     INTEGER NOT NULL DEFAULT 0,
    host_video       INTEGER NOT NULL DEFAULT 0,
    participant_video INTEGER NOT NULL DEFAULT 0,
    mute_upon_entry  INTEGER NOT NULL DEFAULT 0,
    join_url         TEXT NOT NULL DEFAULT '',
    start_url        TEXT NOT NULL DEFAULT '',
    exists_on_remote TEXT NOT NULL DEFAULT 'exists'
                     CHECK(exists_on_remote IN ('exists','expired')),
    created_at       TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_meetings_course ON meetings(course_id);
CREATE INDEX IF NOT EXISTS idx_meetings_remote ON meetings(meeting_id);
CREATE INDEX IF NOT EXISTS idx_meetings_uuid ON meetings(uuid);

CREATE TABLE IF NOT EXISTS attendance (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    meeting_id  INTEGER NOT NULL REFERENCES meetings(id) ON DELETE CASCADE,
    user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    first_join  TEXT NOT NULL,
    last_leave  TEXT NOT NULL,
    duration    INTEGER NOT NULL DEFAULT 0,
    sessions    INTEGER NOT NULL DEFAULT 0,
    UNIQUE (meeting_id, user_id)
);
"#;

const ADD_ATTENDANCE_GRADE: &str = r#"
ALTER TABLE attendance ADD COLUMN grade REAL NOT NULL DEFAULT 0;
"#;

/// Public entry point: run all pending migrations.
///
/// Invoked by db::initialize::init_db().
pub fn run_pending_migrations(conn: &Connection) -> Result<()> {
    ensure_log_table(conn)?;

    apply_migration(
        conn,
        "20250301_0001_create_core_tables",
        "created users, enrolments, meetings and attendance tables",
        CREATE_CORE_TABLES,
    )?;

    apply_migration(
        conn,
        "20250412_0002_add_attendance_grade",
        "added grade to attendance",
        ADD_ATTENDANCE_GRADE,
    )?;

    Ok(())
}
