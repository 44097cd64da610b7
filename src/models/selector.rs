use std::fmt;

/// Scope of a report sync run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Course(i64),
    MeetingId(i64),
    MeetingUuid(String),
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Course(id) => write!(f, "course {}", id),
            Selector::MeetingId(id) => write!(f, "meeting id {}", id),
            Selector::MeetingUuid(uuid) => write!(f, "meeting uuid {}", uuid),
        }
    }
}
