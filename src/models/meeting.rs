use chrono::{DateTime, Local, Utc};
use serde::Serialize;

/// Whether the meeting is still known to Zoom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MeetingStatus {
    Exists,
    Expired,
}

impl MeetingStatus {
    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            MeetingStatus::Exists => "exists",
            MeetingStatus::Expired => "expired",
        }
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "exists" => Some(MeetingStatus::Exists),
            "expired" => Some(MeetingStatus::Expired),
            _ => None,
        }
    }
}

/// Meeting feature flags.
///
/// `join_before_host` and `waiting_room` cannot both be on: switching one on
/// switches the other off. Switching one off leaves the other alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MeetingOptions {
    join_before_host: bool,
    waiting_room: bool,
    pub host_video: bool,
    pub participant_video: bool,
    pub mute_upon_entry: bool,
}

impl MeetingOptions {
    pub fn join_before_host(&self) -> bool {
        self.join_before_host
    }

    pub fn waiting_room(&self) -> bool {
        self.waiting_room
    }

    pub fn set_join_before_host(&mut self, on: bool) {
        self.join_before_host = on;
        if on {
            self.waiting_room = false;
        }
    }

    pub fn set_waiting_room(&mut self, on: bool) {
        self.waiting_room = on;
        if on {
            self.join_before_host = false;
        }
    }

    /// Rebuild from stored columns. A row holding both flags (written by an
    /// older tool) keeps the waiting room.
    pub fn from_stored(join_before_host: bool, waiting_room: bool) -> Self {
        let mut opts = MeetingOptions::default();
        opts.set_join_before_host(join_before_host);
        opts.set_waiting_room(waiting_room);
        opts
    }
}

/// Scheduling fields supplied by the user when creating a meeting.
#[derive(Debug, Clone)]
pub struct MeetingDraft {
    pub course_id: i64,
    pub topic: String,
    pub start_time: DateTime<Utc>,
    /// minutes
    pub duration: i64,
    pub timezone: String,
    pub recurring: bool,
    pub password: String,
    pub options: MeetingOptions,
}

#[derive(Debug, Clone, Serialize)]
pub struct Meeting {
    pub id: i64,                    // ⇔ meetings.id (local)
    pub course_id: i64,             // ⇔ meetings.course_id
    pub topic: String,              // ⇔ meetings.topic
    pub meeting_id: i64,            // ⇔ meetings.meeting_id (remote, 0 = none)
    pub uuid: String,               // ⇔ meetings.uuid (remote, '' = none)
    pub start_time: DateTime<Utc>,  // ⇔ meetings.start_time (RFC3339)
    pub duration: i64,              // ⇔ meetings.duration (minutes)
    pub timezone: String,           // ⇔ meetings.timezone
    pub recurring: bool,            // ⇔ meetings.recurring
    pub password: String,           // ⇔ meetings.password
    pub options: MeetingOptions,    // ⇔ meetings.join_before_host / waiting_room / ...
    pub join_url: String,           // ⇔ meetings.join_url
    pub start_url: String,          // ⇔ meetings.start_url
    pub status: MeetingStatus,      // ⇔ meetings.exists_on_remote
    pub created_at: String,         // ⇔ meetings.created_at (RFC3339)
}

impl Meeting {
    /// Local row for a draft, before any remote call.
    pub fn from_draft(draft: &MeetingDraft) -> Self {
        Self {
            id: 0,
            course_id: draft.course_id,
            topic: draft.topic.clone(),
            meeting_id: 0,
            uuid: String::new(),
            start_time: draft.start_time,
            duration: draft.duration,
            timezone: draft.timezone.clone(),
            recurring: draft.recurring,
            password: draft.password.clone(),
            options: draft.options,
            join_url: String::new(),
            start_url: String::new(),
            status: MeetingStatus::Exists,
            created_at: Local::now().to_rfc3339(),
        }
    }

    /// Drop every remote reference. Used when Zoom refuses to create the meeting.
    pub fn mark_expired(&mut self) {
        self.status = MeetingStatus::Expired;
        self.meeting_id = 0;
        self.uuid.clear();
        self.join_url.clear();
        self.start_url.clear();
    }

    pub fn has_remote_identity(&self) -> bool {
        self.meeting_id != 0 || !self.uuid.is_empty()
    }

    pub fn scheduled_seconds(&self) -> i64 {
        self.duration.max(0) * 60
    }

    pub fn start_str(&self) -> String {
        self.start_time.format("%Y-%m-%d %H:%M").to_string()
    }
}
