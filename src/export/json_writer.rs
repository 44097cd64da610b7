use crate::errors::AppResult;
use crate::models::attendance::AttendanceRow;
use std::path::Path;

/// Write attendance rows as pretty-printed JSON.
pub fn write_json(path: &Path, rows: &[AttendanceRow]) -> AppResult<()> {
    let json = serde_json::to_string_pretty(rows)?;
    std::fs::write(path, json)?;
    Ok(())
}
