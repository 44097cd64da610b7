use crate::cli::parser::{Commands, MeetingAction, Toggle};
use crate::config::Config;
use crate::core::meeting::{MeetingLogic, OptionToggle};
use crate::db::queries::list_meetings;
use crate::errors::{AppError, AppResult};
use crate::models::meeting::{Meeting, MeetingDraft, MeetingOptions, MeetingStatus};
use crate::ui::messages::{info, success, warning};
use crate::utils::colors::{RESET, color_for_status, colorize_optional};
use crate::utils::date::parse_start_time;
use crate::utils::formatting::{on_off, pad_right};
use crate::zoom::client::HttpZoomClient;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Meeting { action } = cmd else {
        return Ok(());
    };

    match action {
        MeetingAction::Create {
            course,
            topic,
            start,
            duration,
            timezone,
            recurring,
            password,
            join_before_host,
            waiting_room,
        } => {
            let start_time =
                parse_start_time(start).ok_or_else(|| AppError::InvalidDate(start.to_string()))?;
            if *duration <= 0 {
                return Err(AppError::InvalidValue(format!(
                    "duration must be positive, got {}",
                    duration
                )));
            }

            let mut options = MeetingOptions::default();
            options.set_join_before_host(*join_before_host);
            options.set_waiting_room(*waiting_room);

            let draft = MeetingDraft {
                course_id: *course,
                topic: topic.trim().to_string(),
                start_time,
                duration: *duration,
                timezone: timezone.clone(),
                recurring: *recurring,
                password: password.clone(),
                options,
            };

            let mut pool = super::open_pool(cfg)?;
            let api = HttpZoomClient::new(cfg)?;
            let meeting = MeetingLogic::create(&mut pool, &api, &draft)?;

            match meeting.status {
                MeetingStatus::Exists => success(format!(
                    "Meeting {} created (Zoom id {}): {}",
                    meeting.id, meeting.meeting_id, meeting.join_url
                )),
                MeetingStatus::Expired => warning(format!(
                    "Meeting {} stored as expired: Zoom did not accept it",
                    meeting.id
                )),
            }
        }

        MeetingAction::List { course } => {
            let pool = super::open_pool(cfg)?;
            let meetings = list_meetings(&pool.conn, *course)?;
            print_meetings(&meetings);
        }

        MeetingAction::Options {
            id,
            join_before_host,
            waiting_room,
        } => {
            if *join_before_host == Some(Toggle::On) && *waiting_room == Some(Toggle::On) {
                return Err(AppError::InvalidValue(
                    "join before host and waiting room cannot both be on".into(),
                ));
            }

            let mut toggles = Vec::new();
            if let Some(t) = join_before_host {
                toggles.push(OptionToggle::JoinBeforeHost(t.is_on()));
            }
            if let Some(t) = waiting_room {
                toggles.push(OptionToggle::WaitingRoom(t.is_on()));
            }

            let mut pool = super::open_pool(cfg)?;
            let api = HttpZoomClient::new(cfg)?;
            let meeting = MeetingLogic::update_options(&mut pool, &api, *id, &toggles)?;

            success(format!(
                "Meeting {}: join before host {}, waiting room {}",
                meeting.id,
                on_off(meeting.options.join_before_host()),
                on_off(meeting.options.waiting_room())
            ));
            if meeting.status == MeetingStatus::Expired {
                warning(format!("Meeting {} is expired on Zoom", meeting.id));
            }
        }
    }

    Ok(())
}

fn print_meetings(meetings: &[Meeting]) {
    if meetings.is_empty() {
        info("No meetings stored.");
        return;
    }

    let topic_w = meetings.iter().map(|m| m.topic.len()).max().unwrap_or(5).max(5);

    println!(
        "{:>4}  {:>6}  {}  {:<16}  {:>5}  {:<7}  {:>12}  {}",
        "ID",
        "COURSE",
        pad_right("TOPIC", topic_w),
        "START (UTC)",
        "MIN",
        "STATUS",
        "ZOOM ID",
        "JOIN URL"
    );

    for m in meetings {
        let status = m.status.to_db_str();
        println!(
            "{:>4}  {:>6}  {}  {:<16}  {:>5}  {}{:<7}{}  {:>12}  {}",
            m.id,
            m.course_id,
            pad_right(&m.topic, topic_w),
            m.start_str(),
            m.duration,
            color_for_status(status),
            status,
            RESET,
            m.meeting_id,
            colorize_optional(&m.join_url)
        );
    }
}
