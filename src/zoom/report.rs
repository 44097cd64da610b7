use super::ZoomApi;
use super::retry::{RetryPolicy, with_retry};
use crate::errors::AppResult;
use crate::models::participant::ParticipationRecord;

/// Fetch every page of the participants report for `meeting`.
pub fn fetch_participants(
    api: &dyn ZoomApi,
    meeting: &str,
    policy: &RetryPolicy,
) -> AppResult<Vec<ParticipationRecord>> {
    let mut all = Vec::new();
    let mut token: Option<String> = None;

    loop {
        let page = with_retry(policy, "participants report", || {
            api.participants_page(meeting, token.as_deref())
        })?;

        log::debug!(
            "meeting {}: page with {} participants (total {})",
            meeting,
            page.participants.len(),
            page.total_records
        );
        all.extend(page.participants);

        if page.next_page_token.is_empty() {
            break;
        }
        token = Some(page.next_page_token);
    }

    Ok(all)
}
