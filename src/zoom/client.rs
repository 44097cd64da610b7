//! Blocking HTTP client for the Zoom REST API (Server-to-Server OAuth).

use super::{CreatedMeeting, MeetingRequest, ParticipantPage, ZoomApi};
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Deserialize;
use std::cell::RefCell;
use std::time::Duration;

const USER_AGENT: &str = concat!("rzoomsync/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

pub struct HttpZoomClient {
    http: Client,
    api_url: String,
    oauth_url: String,
    account_id: String,
    client_id: String,
    client_secret: String,
    host_user: String,
    page_size: u32,
    token: RefCell<Option<String>>,
}

impl HttpZoomClient {
    pub fn new(cfg: &Config) -> AppResult<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            api_url: cfg.api_url.trim_end_matches('/').to_string(),
            oauth_url: cfg.oauth_url.trim_end_matches('/').to_string(),
            account_id: cfg.account_id.clone(),
            client_id: cfg.client_id.clone(),
            client_secret: cfg.client_secret.clone(),
            host_user: cfg.host_user.clone(),
            page_size: cfg.page_size.clamp(1, 300),
            token: RefCell::new(None),
        })
    }

    /// Bearer token, requested once per process.
    fn access_token(&self) -> AppResult<String> {
        if let Some(token) = self.token.borrow().as_ref() {
            return Ok(token.clone());
        }

        if self.account_id.is_empty() || self.client_id.is_empty() || self.client_secret.is_empty()
        {
            return Err(AppError::Config(
                "Zoom credentials missing: set account_id, client_id and client_secret".into(),
            ));
        }

        log::debug!("requesting Zoom access token");
        let resp = self
            .http
            .post(format!("{}/oauth/token", self.oauth_url))
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .query(&[
                ("grant_type", "account_credentials"),
                ("account_id", self.account_id.as_str()),
            ])
            .send()?;

        let body: TokenResponse = check_status(resp, "oauth")?.json()?;
        *self.token.borrow_mut() = Some(body.access_token.clone());
        Ok(body.access_token)
    }

    fn authed(&self, req: RequestBuilder) -> AppResult<RequestBuilder> {
        Ok(req.bearer_auth(self.access_token()?))
    }
}

/// Turn non-2xx responses into errors. 404 is reported as a missing meeting.
fn check_status(resp: Response, what: &str) -> AppResult<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let message = resp.text().unwrap_or_default();
    if status == StatusCode::NOT_FOUND {
        return Err(AppError::RemoteNotFound(what.to_string()));
    }
    Err(AppError::Api {
        status: status.as_u16(),
        message,
    })
}

/// UUIDs starting with '/' or containing '//' must be encoded twice.
pub fn encode_meeting_ref(meeting: &str) -> String {
    let once = urlencoding::encode(meeting).into_owned();
    if meeting.starts_with('/') || meeting.contains("//") {
        urlencoding::encode(&once).into_owned()
    } else {
        once
    }
}

impl ZoomApi for HttpZoomClient {
    fn create_meeting(&self, req: &MeetingRequest) -> AppResult<CreatedMeeting> {
        let url = format!(
            "{}/users/{}/meetings",
            self.api_url,
            urlencoding::encode(&self.host_user)
        );
        log::debug!("POST {}", url);

        let resp = self.authed(self.http.post(&url).json(req))?.send()?;
        Ok(check_status(resp, &self.host_user)?.json()?)
    }

    fn update_meeting(&self, meeting_id: i64, req: &MeetingRequest) -> AppResult<()> {
        let url = format!("{}/meetings/{}", self.api_url, meeting_id);
        log::debug!("PATCH {}", url);

        let resp = self.authed(self.http.patch(&url).json(req))?.send()?;
        check_status(resp, &meeting_id.to_string())?;
        Ok(())
    }

    fn participants_page(
        &self,
        meeting: &str,
        next_page_token: Option<&str>,
    ) -> AppResult<ParticipantPage> {
        let url = format!(
            "{}/report/meetings/{}/participants",
            self.api_url,
            encode_meeting_ref(meeting)
        );
        log::debug!("GET {}", url);

        let mut req = self
            .http
            .get(&url)
            .query(&[("page_size", self.page_size.to_string())]);
        if let Some(token) = next_page_token {
            req = req.query(&[("next_page_token", token)]);
        }

        let resp = self.authed(req)?.send()?;
        Ok(check_status(resp, meeting)?.json()?)
    }
}
