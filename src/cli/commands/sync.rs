use crate::cli::parser::{Commands, SyncSelector};
use crate::config::Config;
use crate::core::sync::{DateRange, SyncJob};
use crate::errors::{AppError, AppResult};
use crate::models::selector::Selector;
use crate::ui::messages::{header, info, warning};
use crate::utils::date::parse_date;
use crate::zoom::client::HttpZoomClient;

fn to_selector(sel: &SyncSelector) -> AppResult<Selector> {
    match (sel.course_id, sel.meeting_id, sel.meeting_uuid.as_deref()) {
        (Some(c), None, None) => Ok(Selector::Course(c)),
        (None, Some(m), None) => Ok(Selector::MeetingId(m)),
        (None, None, Some(u)) if !u.trim().is_empty() => {
            Ok(Selector::MeetingUuid(u.trim().to_string()))
        }
        _ => Err(AppError::InvalidValue(
            "use exactly one of --courseid, --meetingid, --meetinguuid".into(),
        )),
    }
}

fn to_date(raw: Option<&String>) -> AppResult<Option<chrono::NaiveDate>> {
    raw.map(|s| parse_date(s).ok_or_else(|| AppError::InvalidDate(s.clone())))
        .transpose()
}

/// Run the report sync job for the selected meetings.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Sync { selector, from, to } = cmd {
        let selector = to_selector(selector)?;
        let range = DateRange {
            from: to_date(from.as_ref())?,
            to: to_date(to.as_ref())?,
        };

        let mut pool = super::open_pool(cfg)?;
        let api = HttpZoomClient::new(cfg)?;

        header(format!("Syncing participation reports for {}", selector));
        let summary = SyncJob::new(&api, cfg, range).run(&mut pool, &selector)?;

        println!();
        info(format!(
            "{} meetings: {} synced, {} failed | {} participants matched, {} unmatched | {} attendance rows",
            summary.meetings,
            summary.synced,
            summary.failed,
            summary.matched,
            summary.unmatched,
            summary.rows
        ));
        if summary.failed > 0 {
            warning("Some meetings were skipped; see `rzoomsync log --print` for details.");
        }
    }
    Ok(())
}
