use crate::db::pool::DbPool;
use crate::db::queries::{load_attendance, load_meeting, users_in_course};
use crate::errors::{AppError, AppResult};
use crate::export::{ReportFormat, export_attendance};
use crate::models::attendance::AttendanceRow;
use crate::models::meeting::Meeting;
use crate::utils::colors::{CYAN, GREY, RESET, color_for_status};
use crate::utils::formatting::pad_right;
use crate::utils::secs2readable;
use std::path::Path;

pub struct ReportLogic;

impl ReportLogic {
    pub fn run(
        pool: &mut DbPool,
        meeting_id: i64,
        format: ReportFormat,
        file: Option<&str>,
        force: bool,
    ) -> AppResult<()> {
        let meeting = load_meeting(&pool.conn, meeting_id)?;
        let rows = load_attendance(&pool.conn, meeting.id)?;

        match (format, file) {
            (ReportFormat::Table, _) => {
                let enrolled = users_in_course(&pool.conn, meeting.course_id)?.len();
                print_table(&meeting, &rows, enrolled);
                Ok(())
            }
            (_, Some(path)) => export_attendance(format, Path::new(path), &rows, force),
            (_, None) => Err(AppError::Export(format!(
                "--file is required for {} output",
                format.as_str()
            ))),
        }
    }
}

fn print_table(meeting: &Meeting, rows: &[AttendanceRow], enrolled: usize) {
    let status = meeting.status.to_db_str();
    println!(
        "📊 {}{}{} (course {}, {} min, {}{}{})\n",
        CYAN,
        meeting.topic,
        RESET,
        meeting.course_id,
        meeting.duration,
        color_for_status(status),
        status,
        RESET
    );

    if rows.is_empty() {
        println!("{}No attendance recorded yet.{}", GREY, RESET);
        return;
    }

    let name_w = rows.iter().map(|r| r.name.len()).max().unwrap_or(4).max(4);
    let email_w = rows.iter().map(|r| r.email.len()).max().unwrap_or(5).max(5);

    println!(
        "{} {} {:>8} {:>8} {:>7}",
        pad_right("NAME", name_w),
        pad_right("EMAIL", email_w),
        "TIME",
        "SESSIONS",
        "GRADE"
    );
    println!("{}", "-".repeat(name_w + email_w + 28));

    for r in rows {
        println!(
            "{} {} {:>8} {:>8} {:>7.2}",
            pad_right(&r.name, name_w),
            pad_right(&r.email, email_w),
            secs2readable(r.duration, true),
            r.sessions,
            r.grade
        );
    }

    println!(
        "\n{} of {} enrolled users attended",
        rows.len(),
        enrolled
    );
}
