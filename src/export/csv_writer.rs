use crate::errors::AppResult;
use crate::models::attendance::AttendanceRow;
use csv::Writer;
use std::path::Path;

/// Write attendance rows as CSV, one line per user.
pub fn write_csv(path: &Path, rows: &[AttendanceRow]) -> AppResult<()> {
    let mut wtr = Writer::from_path(path)?;

    wtr.write_record([
        "user_id",
        "email",
        "name",
        "first_join",
        "last_leave",
        "duration_secs",
        "sessions",
        "grade",
    ])?;

    for r in rows {
        wtr.write_record(&[
            r.user_id.to_string(),
            r.email.clone(),
            r.name.clone(),
            r.first_join.clone(),
            r.last_leave.clone(),
            r.duration.to_string(),
            r.sessions.to_string(),
            format!("{:.2}", r.grade),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
