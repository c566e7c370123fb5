use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{storage::entities::EntryRecord, tracker::entry::Entry};

use super::{wire, SyncError};

/// Contract with the remote copy of the entry list. Both operations move the whole
/// list; there is no per-entry endpoint.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn pull(&self) -> Result<Vec<Entry>, SyncError>;

    /// Replaces the remote list, returning how many entries the remote accepted.
    async fn push(&self, entries: Vec<Entry>) -> Result<usize, SyncError>;
}

#[derive(Serialize)]
struct SaveRequest {
    entries: Vec<EntryRecord>,
}

#[derive(Deserialize)]
struct SaveResponse {
    saved: usize,
}

#[derive(Deserialize)]
struct LoadResponse {
    #[serde(default)]
    entries: Vec<EntryRecord>,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    pin: &'a str,
}

/// [RemoteStore] over the HTTP persistence API. Authentication state is a session
/// cookie the caller obtained from [HttpRemoteStore::login] and keeps in config.
pub struct HttpRemoteStore {
    base_url: String,
    client: reqwest::Client,
}

impl HttpRemoteStore {
    pub fn new(base_url: &str, session_cookie: Option<&str>) -> Result<Self, SyncError> {
        let mut headers = reqwest::header::HeaderMap::new();
        if let Some(cookie) = session_cookie {
            let value = reqwest::header::HeaderValue::from_str(cookie)
                .map_err(|e| SyncError::Network(format!("illegal session cookie: {e}")))?;
            headers.insert(reqwest::header::COOKIE, value);
        }

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Authenticates and returns the session cookie to persist for later calls.
    pub async fn login(&self, username: &str, pin: &str) -> Result<String, SyncError> {
        let response = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&LoginRequest { username, pin })
            .send()
            .await?;

        let response = check_authorized(response)?.error_for_status()?;

        response
            .headers()
            .get(reqwest::header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            // keep only the name=value pair, not the cookie attributes
            .and_then(|cookie| cookie.split(';').next())
            .map(str::to_string)
            .ok_or(SyncError::Unauthorized)
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn pull(&self) -> Result<Vec<Entry>, SyncError> {
        let response = self.client.get(self.url("/api/load_entries")).send().await?;
        let response = check_authorized(response)?.error_for_status()?;

        let payload = response.json::<LoadResponse>().await?;
        debug!("Pulled {} remote entries", payload.entries.len());
        Ok(wire::entries_from_payload(&payload.entries))
    }

    async fn push(&self, entries: Vec<Entry>) -> Result<usize, SyncError> {
        let request = SaveRequest {
            entries: entries.iter().map(wire::to_payload).collect(),
        };

        let response = self
            .client
            .post(self.url("/api/save_entries"))
            .json(&request)
            .send()
            .await?;
        let response = check_authorized(response)?.error_for_status()?;

        let accepted = response.json::<SaveResponse>().await?.saved;
        debug!("Remote accepted {accepted} entries");
        Ok(accepted)
    }
}

fn check_authorized(response: reqwest::Response) -> Result<reqwest::Response, SyncError> {
    // 403 is what the endpoint answers when server-side persistence is disabled or the
    // session is gone; both need a fresh login, same as 401.
    if matches!(
        response.status(),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
    ) {
        return Err(SyncError::Unauthorized);
    }
    Ok(response)
}
