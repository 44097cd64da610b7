//! Zoom REST API access.
//!
//! [`ZoomApi`] is the seam between the core logic and the network:
//! [`client::HttpZoomClient`] talks to Zoom, unit tests plug in fakes.

pub mod client;
pub mod report;
pub mod retry;

use crate::errors::AppResult;
use crate::models::meeting::Meeting;
use crate::models::participant::ParticipationRecord;
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

/// Zoom meeting types.
pub const MEETING_TYPE_SCHEDULED: u8 = 2;
pub const MEETING_TYPE_RECURRING_NO_FIXED_TIME: u8 = 3;

pub trait ZoomApi {
    /// POST /users/{host}/meetings
    fn create_meeting(&self, req: &MeetingRequest) -> AppResult<CreatedMeeting>;

    /// PATCH /meetings/{id}
    fn update_meeting(&self, meeting_id: i64, req: &MeetingRequest) -> AppResult<()>;

    /// GET /report/meetings/{meeting}/participants, one page.
    fn participants_page(
        &self,
        meeting: &str,
        next_page_token: Option<&str>,
    ) -> AppResult<ParticipantPage>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeetingSettings {
    pub join_before_host: bool,
    pub waiting_room: bool,
    pub host_video: bool,
    pub participant_video: bool,
    pub mute_upon_entry: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeetingRequest {
    pub topic: String,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    pub duration: i64,
    pub timezone: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub password: String,
    pub settings: MeetingSettings,
}

impl MeetingRequest {
    pub fn from_meeting(m: &Meeting) -> Self {
        let (kind, start_time) = if m.recurring {
            (MEETING_TYPE_RECURRING_NO_FIXED_TIME, None)
        } else {
            (
                MEETING_TYPE_SCHEDULED,
                Some(m.start_time.to_rfc3339_opts(SecondsFormat::Secs, true)),
            )
        };

        Self {
            topic: m.topic.clone(),
            kind,
            start_time,
            duration: m.duration,
            timezone: m.timezone.clone(),
            password: m.password.clone(),
            settings: MeetingSettings {
                join_before_host: m.options.join_before_host(),
                waiting_room: m.options.waiting_room(),
                host_video: m.options.host_video,
                participant_video: m.options.participant_video,
                mute_upon_entry: m.options.mute_upon_entry,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreatedMeeting {
    pub id: i64,
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub join_url: String,
    #[serde(default)]
    pub start_url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParticipantPage {
    #[serde(default)]
    pub participants: Vec<ParticipationRecord>,
    #[serde(default)]
    pub next_page_token: String,
    #[serde(default)]
    pub total_records: u64,
}
