use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// One attendee session as reported by Zoom's participants report.
/// Fetched fresh on every sync; never stored as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipationRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "user_email", deserialize_with = "empty_as_none")]
    pub email: Option<String>,
    pub join_time: DateTime<Utc>,
    #[serde(default)]
    pub leave_time: Option<DateTime<Utc>>,
    /// seconds
    #[serde(default)]
    pub duration: i64,
}

impl ParticipationRecord {
    /// End of the session: the reported leave time, else join + duration.
    /// A duration out of chrono's range collapses to the join time.
    pub fn end_time(&self) -> DateTime<Utc> {
        match self.leave_time {
            Some(t) if t >= self.join_time => t,
            _ => TimeDelta::try_seconds(self.duration.max(0))
                .and_then(|d| self.join_time.checked_add_signed(d))
                .unwrap_or(self.join_time),
        }
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}
