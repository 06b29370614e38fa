//! Dropbox HTTP API v2 client (blocking, `ureq`).
//!
//! # Endpoints
//!
//! | Operation            | Endpoint                                   |
//! |----------------------|--------------------------------------------|
//! | account lookup       | `api/2/users/get_current_account`          |
//! | download             | `content/2/files/download`                 |
//! | upload (overwrite)   | `content/2/files/upload`                   |
//! | list / continue      | `api/2/files/list_folder[/continue]`       |
//! | folder exists        | `api/2/files/get_metadata`                 |
//! | create folder        | `api/2/files/create_folder_v2`             |
//! | token refresh        | `api/oauth2/token`                         |
//!
//! Content endpoints take their JSON argument in the `Dropbox-API-Arg` header,
//! which must be ASCII; see [`header_safe_json`].

use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{Reauthenticate, RefreshCredentials, TokenExchange};
use crate::retry::RetryPolicy;
use crate::store::{
    Account, Entry, EntryKind, FolderOutcome, ListPage, ProfileStore, StoreError, StoreErrorCode,
};

const API_BASE: &str = "https://api.dropboxapi.com";
const CONTENT_BASE: &str = "https://content.dropboxapi.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct AccountResponse {
    email: String,
    name: AccountName,
}

#[derive(Debug, Deserialize)]
struct AccountName {
    display_name: String,
}

#[derive(Debug, Deserialize)]
struct ListFolderResponse {
    entries: Vec<RawEntry>,
    cursor: String,
    has_more: bool,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(rename = ".tag")]
    tag: String,
    name: String,
    path_display: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct DropboxClient {
    agent: ureq::Agent,
    access_token: String,
    retry: RetryPolicy,
    api_base: String,
    content_base: String,
}

impl DropboxClient {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build(),
            access_token: access_token.into(),
            retry: RetryPolicy::default(),
            api_base: API_BASE.to_string(),
            content_base: CONTENT_BASE.to_string(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Point the client at different hosts (proxies, test servers).
    pub fn with_endpoints(mut self, api_base: impl Into<String>, content_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self.content_base = content_base.into();
        self
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }

    fn rpc(&self, route: &str, arg: Value) -> Result<ureq::Response, StoreError> {
        let url = format!("{}/2/{route}", self.api_base);
        self.retry.run(route, || {
            self.agent
                .post(&url)
                .set("Authorization", &self.bearer())
                .send_json(arg.clone())
                .map_err(classify_ureq_error)
        })
    }

    fn rpc_json<T: serde::de::DeserializeOwned>(&self, route: &str, arg: Value) -> Result<T, StoreError> {
        let response = self.rpc(route, arg)?;
        response.into_json::<T>().map_err(|e| {
            StoreError::new(StoreErrorCode::Protocol, format!("{route}: bad response body: {e}"))
        })
    }

    fn list_page(raw: ListFolderResponse) -> ListPage {
        let entries = raw
            .entries
            .into_iter()
            .filter_map(|e| {
                let kind = match e.tag.as_str() {
                    "file" => EntryKind::File,
                    "folder" => EntryKind::Folder,
                    _ => return None,
                };
                Some(Entry {
                    kind,
                    path: e.path_display?,
                    name: e.name,
                })
            })
            .collect();
        ListPage {
            entries,
            cursor: raw.cursor,
            has_more: raw.has_more,
        }
    }
}

impl ProfileStore for DropboxClient {
    fn backend(&self) -> &'static str {
        "dropbox"
    }

    fn current_account(&self) -> Result<Account, StoreError> {
        let url = format!("{}/2/users/get_current_account", self.api_base);
        let response = self.retry.run("users/get_current_account", || {
            self.agent
                .post(&url)
                .set("Authorization", &self.bearer())
                .call()
                .map_err(classify_ureq_error)
        })?;
        let account: AccountResponse = response.into_json().map_err(|e| {
            StoreError::new(StoreErrorCode::Protocol, format!("account response: {e}"))
        })?;
        Ok(Account {
            email: account.email,
            display_name: account.name.display_name,
        })
    }

    fn download(&self, path: &str) -> Result<String, StoreError> {
        let url = format!("{}/2/files/download", self.content_base);
        let arg = header_safe_json(&json!({ "path": path }));
        let response = self.retry.run("files/download", || {
            self.agent
                .post(&url)
                .set("Authorization", &self.bearer())
                .set("Dropbox-API-Arg", &arg)
                .call()
                .map_err(classify_ureq_error)
        })?;
        let mut bytes = Vec::new();
        std::io::Read::read_to_end(&mut response.into_reader(), &mut bytes).map_err(|e| {
            StoreError::new(StoreErrorCode::Network, format!("{path}: body read failed: {e}"))
        })?;
        String::from_utf8(bytes).map_err(|e| {
            StoreError::new(StoreErrorCode::Protocol, format!("{path} is not UTF-8: {e}"))
        })
    }

    fn upload(&self, path: &str, content: &str) -> Result<(), StoreError> {
        let url = format!("{}/2/files/upload", self.content_base);
        let arg = header_safe_json(&json!({
            "path": path,
            "mode": "overwrite",
            "autorename": false,
            "mute": true,
        }));
        self.retry.run("files/upload", || {
            self.agent
                .post(&url)
                .set("Authorization", &self.bearer())
                .set("Dropbox-API-Arg", &arg)
                .set("Content-Type", "application/octet-stream")
                .send_bytes(content.as_bytes())
                .map_err(classify_ureq_error)
        })?;
        Ok(())
    }

    fn list_folder(&self, path: &str, recursive: bool) -> Result<ListPage, StoreError> {
        let raw: ListFolderResponse = self.rpc_json(
            "files/list_folder",
            json!({ "path": path, "recursive": recursive }),
        )?;
        Ok(Self::list_page(raw))
    }

    fn list_folder_continue(&self, cursor: &str) -> Result<ListPage, StoreError> {
        let raw: ListFolderResponse =
            self.rpc_json("files/list_folder/continue", json!({ "cursor": cursor }))?;
        Ok(Self::list_page(raw))
    }

    fn folder_exists(&self, path: &str) -> Result<bool, StoreError> {
        match self.rpc_json::<Value>("files/get_metadata", json!({ "path": path })) {
            Ok(meta) => Ok(meta.get(".tag").and_then(Value::as_str) == Some("folder")),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }

    fn create_folder(&self, path: &str) -> Result<FolderOutcome, StoreError> {
        match self.rpc("files/create_folder_v2", json!({ "path": path, "autorename": false })) {
            Ok(_) => Ok(FolderOutcome::Created),
            Err(err) if err.code == StoreErrorCode::Conflict && err.message.contains("conflict/folder") => {
                Ok(FolderOutcome::AlreadyExists)
            }
            Err(err) => Err(err),
        }
    }
}

impl Reauthenticate for DropboxClient {
    fn set_access_token(&mut self, token: String) {
        self.access_token = token;
    }
}

impl TokenExchange for DropboxClient {
    fn exchange(&self, creds: &RefreshCredentials) -> Result<String, StoreError> {
        let url = format!("{}/oauth2/token", self.api_base);
        let response = self.retry.run("oauth2/token", || {
            self.agent
                .post(&url)
                .send_form(&[
                    ("grant_type", "refresh_token"),
                    ("refresh_token", creds.refresh_token.as_str()),
                    ("client_id", creds.app_key.as_str()),
                    ("client_secret", creds.app_secret.as_str()),
                ])
                .map_err(|err| match err {
                    // The token endpoint answers 400 for a revoked or unknown grant.
                    ureq::Error::Status(400, resp) => StoreError::new(
                        StoreErrorCode::InvalidCredential,
                        resp.into_string().unwrap_or_default(),
                    ),
                    other => classify_ureq_error(other),
                })
        })?;
        let token: TokenResponse = response.into_json().map_err(|e| {
            StoreError::new(StoreErrorCode::Protocol, format!("token response: {e}"))
        })?;
        Ok(token.access_token)
    }
}

// ---------------------------------------------------------------------------
// Error classification
// ---------------------------------------------------------------------------

fn classify_ureq_error(err: ureq::Error) -> StoreError {
    match err {
        ureq::Error::Status(status, response) => {
            let body = response.into_string().unwrap_or_default();
            classify_status(status, &body)
        }
        ureq::Error::Transport(transport) => {
            StoreError::new(StoreErrorCode::Network, transport.to_string())
        }
    }
}

/// Map an HTTP status plus Dropbox error body to a [`StoreError`].
///
/// Dropbox puts a slash-separated tag path in `error_summary`, e.g.
/// `path/not_found/..` or `expired_access_token/`.
pub(crate) fn classify_status(status: u16, body: &str) -> StoreError {
    let summary = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error_summary").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string());

    let code = match status {
        401 if summary.starts_with("expired_access_token") => StoreErrorCode::ExpiredCredential,
        401 => StoreErrorCode::InvalidCredential,
        409 if summary.contains("not_found") => StoreErrorCode::NotFound,
        409 if summary.contains("conflict") => StoreErrorCode::Conflict,
        429 => StoreErrorCode::RateLimited,
        500..=599 => StoreErrorCode::Network,
        _ => StoreErrorCode::Protocol,
    };
    StoreError::new(code, format!("HTTP {status}: {summary}"))
}

/// Serialize `value` to JSON with every non-ASCII character (and DEL) escaped
/// as `\uXXXX`, as required for the `Dropbox-API-Arg` header.
pub fn header_safe_json(value: &Value) -> String {
    let raw = value.to_string();
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if (c as u32) < 0x7f {
            out.push(c);
        } else {
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                out.push_str(&format!("\\u{unit:04x}"));
            }
        }
    }
    out
}
