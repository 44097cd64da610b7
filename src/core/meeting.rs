use crate::db::log::ttlog_quiet;
use crate::db::pool::DbPool;
use crate::db::queries::{insert_meeting, load_meeting, update_meeting};
use crate::errors::AppResult;
use crate::models::meeting::{Meeting, MeetingDraft, MeetingStatus};
use crate::zoom::{MeetingRequest, ZoomApi};

/// High-level business logic for the `meeting` command.
pub struct MeetingLogic;

impl MeetingLogic {
    /// Create the meeting on Zoom and store it locally.
    ///
    /// A failed remote call does not fail the command: the meeting is stored
    /// as expired, with no remote id and no URLs.
    pub fn create(pool: &mut DbPool, api: &dyn ZoomApi, draft: &MeetingDraft) -> AppResult<Meeting> {
        let mut meeting = Meeting::from_draft(draft);

        match api.create_meeting(&MeetingRequest::from_meeting(&meeting)) {
            Ok(created) => {
                meeting.meeting_id = created.id;
                meeting.uuid = created.uuid;
                meeting.join_url = created.join_url;
                meeting.start_url = created.start_url;
                meeting.status = MeetingStatus::Exists;
            }
            Err(e) => {
                log::warn!("Zoom create failed for '{}': {}", meeting.topic, e);
                meeting.mark_expired();
            }
        }

        meeting.id = insert_meeting(&pool.conn, &meeting)?;

        ttlog_quiet(
            &pool.conn,
            "meeting_create",
            &meeting.id.to_string(),
            &format!(
                "course={} remote_id={} status={}",
                meeting.course_id,
                meeting.meeting_id,
                meeting.status.to_db_str()
            ),
        );

        Ok(meeting)
    }

    /// Apply flag toggles in order, then push the change to Zoom when the
    /// meeting still exists there. Local flags are saved either way.
    pub fn update_options(
        pool: &mut DbPool,
        api: &dyn ZoomApi,
        id: i64,
        toggles: &[OptionToggle],
    ) -> AppResult<Meeting> {
        let mut meeting = load_meeting(&pool.conn, id)?;

        for t in toggles {
            match *t {
                OptionToggle::JoinBeforeHost(on) => meeting.options.set_join_before_host(on),
                OptionToggle::WaitingRoom(on) => meeting.options.set_waiting_room(on),
            }
        }

        if meeting.status == MeetingStatus::Exists && meeting.has_remote_identity() {
            let req = MeetingRequest::from_meeting(&meeting);
            if let Err(e) = api.update_meeting(meeting.meeting_id, &req) {
                log::warn!("Zoom update failed for meeting {}: {}", meeting.meeting_id, e);
                meeting.status = MeetingStatus::Expired;
            }
        }

        update_meeting(&pool.conn, &meeting)?;

        ttlog_quiet(
            &pool.conn,
            "meeting_options",
            &meeting.id.to_string(),
            &format!(
                "join_before_host={} waiting_room={} status={}",
                meeting.options.join_before_host(),
                meeting.options.waiting_room(),
                meeting.status.to_db_str()
            ),
        );

        Ok(meeting)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionToggle {
    JoinBeforeHost(bool),
    WaitingRoom(bool),
}
