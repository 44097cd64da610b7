// src/export/mod.rs

mod csv_writer;
mod fs_utils;
mod json_writer;

use crate::errors::AppResult;
use crate::models::attendance::AttendanceRow;
use crate::ui::messages::success;
use clap::ValueEnum;
use std::path::Path;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Table,
    Csv,
    Json,
}

impl ReportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportFormat::Table => "table",
            ReportFormat::Csv => "csv",
            ReportFormat::Json => "json",
        }
    }
}

/// Write attendance rows to `path` in a file format (csv or json).
pub fn export_attendance(
    format: ReportFormat,
    path: &Path,
    rows: &[AttendanceRow],
    force: bool,
) -> AppResult<()> {
    fs_utils::ensure_writable(path, force)?;

    match format {
        ReportFormat::Csv => csv_writer::write_csv(path, rows)?,
        ReportFormat::Json => json_writer::write_json(path, rows)?,
        ReportFormat::Table => {
            return Err(crate::errors::AppError::Export(
                "table output cannot be written to a file; use csv or json".into(),
            ));
        }
    }

    success(format!(
        "{} export completed: {}",
        format.as_str().to_uppercase(),
        path.display()
    ));
    Ok(())
}
