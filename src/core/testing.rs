//! In-memory fixtures shared by the core unit tests.

use crate::db::initialize::init_db;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::models::participant::ParticipationRecord;
use crate::zoom::{CreatedMeeting, MeetingRequest, ParticipantPage, ZoomApi};
use chrono::{DateTime, TimeZone, Utc};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

pub fn test_pool() -> DbPool {
    let pool = DbPool::in_memory().unwrap();
    init_db(&pool.conn).unwrap();
    pool
}

pub fn at(h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, h, m, 0).unwrap()
}

pub fn participant(name: &str, email: Option<&str>, join: DateTime<Utc>, mins: i64) -> ParticipationRecord {
    ParticipationRecord {
        id: String::new(),
        name: name.into(),
        email: email.map(String::from),
        join_time: join,
        leave_time: Some(join + chrono::Duration::minutes(mins)),
        duration: mins * 60,
    }
}

/// Scripted Zoom API.
/// Reports are served per meeting reference, split in pages of `page_size`.
#[derive(Default)]
pub struct FakeZoom {
    pub created: Option<CreatedMeeting>,
    pub reports: HashMap<String, AppResult<Vec<ParticipationRecord>>>,
    pub page_size: usize,
    pub fail_updates: Cell<bool>,
    pub updates: RefCell<Vec<MeetingRequest>>,
    pub report_calls: RefCell<Vec<(String, Option<String>)>>,
}

impl FakeZoom {
    pub fn with_created(mut self, created: CreatedMeeting) -> Self {
        self.created = Some(created);
        self
    }

    pub fn with_report(mut self, meeting: &str, records: Vec<ParticipationRecord>) -> Self {
        self.reports.insert(meeting.to_string(), Ok(records));
        self
    }

    pub fn with_report_error(mut self, meeting: &str, err: AppError) -> Self {
        self.reports.insert(meeting.to_string(), Err(err));
        self
    }

    pub fn with_page_size(mut self, n: usize) -> Self {
        self.page_size = n;
        self
    }
}

fn clone_err(e: &AppError) -> AppError {
    match e {
        AppError::RemoteNotFound(s) => AppError::RemoteNotFound(s.clone()),
        AppError::Api { status, message } => AppError::Api {
            status: *status,
            message: message.clone(),
        },
        other => AppError::Other(other.to_string()),
    }
}

impl ZoomApi for FakeZoom {
    fn create_meeting(&self, _req: &MeetingRequest) -> AppResult<CreatedMeeting> {
        self.created.clone().ok_or(AppError::Api {
            status: 400,
            message: "create refused".into(),
        })
    }

    fn update_meeting(&self, _meeting_id: i64, req: &MeetingRequest) -> AppResult<()> {
        if self.fail_updates.get() {
            return Err(AppError::RemoteNotFound("meeting".into()));
        }
        self.updates.borrow_mut().push(req.clone());
        Ok(())
    }

    fn participants_page(
        &self,
        meeting: &str,
        next_page_token: Option<&str>,
    ) -> AppResult<ParticipantPage> {
        self.report_calls
            .borrow_mut()
            .push((meeting.to_string(), next_page_token.map(String::from)));

        let records = match self.reports.get(meeting) {
            Some(Ok(r)) => r,
            Some(Err(e)) => return Err(clone_err(e)),
            None => return Err(AppError::RemoteNotFound(meeting.to_string())),
        };

        let size = if self.page_size == 0 {
            records.len().max(1)
        } else {
            self.page_size
        };
        let offset: usize = next_page_token.map(|t| t.parse().unwrap_or(0)).unwrap_or(0);
        let end = (offset + size).min(records.len());

        Ok(ParticipantPage {
            participants: records[offset.min(end)..end].to_vec(),
            next_page_token: if end < records.len() {
                end.to_string()
            } else {
                String::new()
            },
            total_records: records.len() as u64,
        })
    }
}
