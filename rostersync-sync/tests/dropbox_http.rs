//! Dropbox client against an in-process HTTP server speaking the v2 routes.

use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use serde_json::{json, Value};
use tiny_http::{Request, Response, Server, StatusCode};

use rostersync_sync::{
    authenticate, DropboxClient, EntryKind, FolderOutcome, ProfileStore, RefreshCredentials,
    RetryPolicy, StoreErrorCode,
};

const FRESH_TOKEN: &str = "fresh-token";

#[derive(Debug, Clone)]
struct Seen {
    url: String,
    authorization: Option<String>,
    api_arg: Option<String>,
    body: String,
}

#[derive(Default)]
struct State {
    files: HashMap<String, String>,
    folders: HashSet<String>,
    seen: Vec<Seen>,
    /// Remaining 429 answers for `list_folder` before it succeeds.
    throttle_listing: usize,
}

struct MockDropbox {
    base: String,
    server: Arc<Server>,
    state: Arc<Mutex<State>>,
    handle: Option<JoinHandle<()>>,
}

impl MockDropbox {
    fn start(state: State) -> Self {
        let server = Arc::new(Server::http("127.0.0.1:0").expect("http server"));
        let base = format!("http://{}", server.server_addr());
        let state = Arc::new(Mutex::new(state));
        let handle = {
            let server = Arc::clone(&server);
            let state = Arc::clone(&state);
            thread::spawn(move || {
                for req in server.incoming_requests() {
                    respond(req, &state);
                }
            })
        };
        Self {
            base,
            server,
            state,
            handle: Some(handle),
        }
    }

    fn client(&self, token: &str) -> DropboxClient {
        DropboxClient::new(token)
            .with_retry(RetryPolicy::once())
            .with_endpoints(self.base.clone(), self.base.clone())
    }

    fn seen(&self, url: &str) -> Vec<Seen> {
        let state = self.state.lock().expect("state");
        state.seen.iter().filter(|s| s.url == url).cloned().collect()
    }
}

impl Drop for MockDropbox {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn header(req: &Request, name: &'static str) -> Option<String> {
    req.headers()
        .iter()
        .find(|h| h.field.equiv(name))
        .map(|h| h.value.as_str().to_string())
}

fn json_response(status: u16, body: Value) -> Response<std::io::Cursor<Vec<u8>>> {
    Response::from_string(body.to_string()).with_status_code(StatusCode(status))
}

fn dropbox_error(status: u16, summary: &str) -> Response<std::io::Cursor<Vec<u8>>> {
    json_response(status, json!({ "error_summary": summary, "error": {} }))
}

fn respond(mut req: Request, state: &Mutex<State>) {
    let url = req.url().to_string();
    let authorization = header(&req, "Authorization");
    let api_arg = header(&req, "Dropbox-API-Arg");
    let mut body = String::new();
    let _ = req.as_reader().read_to_string(&mut body);

    let mut state = state.lock().expect("state");
    state.seen.push(Seen {
        url: url.clone(),
        authorization: authorization.clone(),
        api_arg: api_arg.clone(),
        body: body.clone(),
    });

    if url == "/oauth2/token" {
        let response = if body.contains("refresh_token=good-refresh") {
            json_response(200, json!({ "access_token": FRESH_TOKEN, "expires_in": 14400 }))
        } else {
            json_response(400, json!({ "error": "invalid_grant" }))
        };
        let _ = req.respond(response);
        return;
    }

    let expected = format!("Bearer {FRESH_TOKEN}");
    if authorization.as_deref() != Some(expected.as_str()) {
        let _ = req.respond(dropbox_error(401, "expired_access_token/"));
        return;
    }

    let arg: Value = api_arg
        .as_deref()
        .map(|a| serde_json::from_str(a).expect("api arg json"))
        .unwrap_or_else(|| serde_json::from_str(&body).unwrap_or(Value::Null));
    let path = arg.get("path").and_then(Value::as_str).unwrap_or_default().to_string();

    let response = match url.as_str() {
        "/2/users/get_current_account" => json_response(
            200,
            json!({ "email": "ops@example.com", "name": { "display_name": "Ops" } }),
        ),
        "/2/files/download" => match state.files.get(&path) {
            Some(content) => Response::from_string(content.clone()),
            None => dropbox_error(409, "path/not_found/.."),
        },
        "/2/files/upload" => {
            state.files.insert(path.clone(), body);
            json_response(200, json!({ "name": path, "path_display": path }))
        }
        "/2/files/list_folder" => {
            if state.throttle_listing > 0 {
                state.throttle_listing -= 1;
                dropbox_error(429, "too_many_requests/")
            } else {
                json_response(
                    200,
                    json!({
                        "entries": [
                            { ".tag": "folder", "name": "Dev", "path_display": "/Nov25/Dev" }
                        ],
                        "cursor": "page-2",
                        "has_more": true
                    }),
                )
            }
        }
        "/2/files/list_folder/continue" => {
            if arg.get("cursor").and_then(Value::as_str) == Some("page-2") {
                json_response(
                    200,
                    json!({
                        "entries": [
                            {
                                ".tag": "file",
                                "name": "Profile Developer Jane Doe.md",
                                "path_display": "/Nov25/Dev/Jane Doe/Profile Developer Jane Doe.md"
                            }
                        ],
                        "cursor": "done",
                        "has_more": false
                    }),
                )
            } else {
                dropbox_error(409, "reset/")
            }
        }
        "/2/files/get_metadata" => {
            if state.folders.contains(&path) {
                json_response(200, json!({ ".tag": "folder", "name": "x", "path_display": path }))
            } else {
                dropbox_error(409, "path/not_found/..")
            }
        }
        "/2/files/create_folder_v2" => {
            if state.folders.insert(path.clone()) {
                json_response(200, json!({ "metadata": { "name": "x", "path_display": path } }))
            } else {
                dropbox_error(409, "path/conflict/folder/..")
            }
        }
        _ => Response::from_string("unknown route").with_status_code(StatusCode(404)),
    };
    let _ = req.respond(response);
}

#[test]
fn expired_token_is_refreshed_then_accepted() {
    let mock = MockDropbox::start(State::default());
    let mut client = mock.client("stale-token");
    let creds = RefreshCredentials::from_parts(
        Some("key".to_string()),
        Some("secret".to_string()),
        Some("good-refresh".to_string()),
    )
    .expect("creds");

    let account = authenticate(&mut client, Some(&creds)).expect("authenticated");
    assert_eq!(account.email, "ops@example.com");

    let token_calls = mock.seen("/oauth2/token");
    assert_eq!(token_calls.len(), 1);
    assert!(token_calls[0].body.contains("grant_type=refresh_token"));
    assert!(token_calls[0].body.contains("client_id=key"));

    let lookups = mock.seen("/2/users/get_current_account");
    assert_eq!(lookups.len(), 2);
    assert_eq!(lookups[0].authorization.as_deref(), Some("Bearer stale-token"));
    assert_eq!(lookups[1].authorization.as_deref(), Some("Bearer fresh-token"));
}

#[test]
fn rejected_refresh_fails_authentication() {
    let mock = MockDropbox::start(State::default());
    let mut client = mock.client("stale-token");
    let creds = RefreshCredentials::from_parts(
        Some("key".to_string()),
        Some("secret".to_string()),
        Some("revoked".to_string()),
    )
    .expect("creds");

    let err = authenticate(&mut client, Some(&creds)).unwrap_err();
    assert!(err.to_string().contains("token refresh failed"));
    assert_eq!(mock.seen("/2/users/get_current_account").len(), 1);
}

#[test]
fn download_sends_ascii_argument_and_returns_body() {
    let path = "/Nov25/Dev/José Müller/Profile Developer José Müller.md";
    let mut state = State::default();
    state.files.insert(path.to_string(), "**ID:** E7\n".to_string());
    let mock = MockDropbox::start(state);
    let client = mock.client(FRESH_TOKEN);

    assert_eq!(client.download(path).expect("download"), "**ID:** E7\n");

    let seen = mock.seen("/2/files/download");
    let arg = seen[0].api_arg.as_deref().expect("api arg header");
    assert!(arg.is_ascii());
    assert!(arg.contains(r"Jos\u00e9 M\u00fcller"));
}

#[test]
fn download_of_missing_file_is_not_found() {
    let mock = MockDropbox::start(State::default());
    let err = mock.client(FRESH_TOKEN).download("/Nov25/ghost.md").unwrap_err();
    assert_eq!(err.code, StoreErrorCode::NotFound);
}

#[test]
fn upload_overwrites_with_raw_body() {
    let mock = MockDropbox::start(State::default());
    let client = mock.client(FRESH_TOKEN);
    let path = "/Nov25/Dev/Jane Doe/Profile Developer Jane Doe.md";

    client.upload(path, "**ID:** E100\n").expect("upload");

    let seen = mock.seen("/2/files/upload");
    assert_eq!(seen[0].body, "**ID:** E100\n");
    let arg: Value = serde_json::from_str(seen[0].api_arg.as_deref().expect("arg")).expect("json");
    assert_eq!(arg["mode"], "overwrite");
    assert_eq!(arg["autorename"], false);
    assert_eq!(
        mock.state.lock().expect("state").files.get(path).map(String::as_str),
        Some("**ID:** E100\n")
    );
}

#[test]
fn listing_follows_cursor_across_pages() {
    let mock = MockDropbox::start(State::default());
    let client = mock.client(FRESH_TOKEN);

    let first = client.list_folder("/Nov25", true).expect("first page");
    assert!(first.has_more);
    assert_eq!(first.entries[0].kind, EntryKind::Folder);

    let second = client.list_folder_continue(&first.cursor).expect("second page");
    assert!(!second.has_more);
    assert_eq!(second.entries.len(), 1);
    assert_eq!(second.entries[0].kind, EntryKind::File);
    assert_eq!(
        second.entries[0].path,
        "/Nov25/Dev/Jane Doe/Profile Developer Jane Doe.md"
    );

    let listing: Value =
        serde_json::from_str(&mock.seen("/2/files/list_folder")[0].body).expect("json");
    assert_eq!(listing["recursive"], true);
}

#[test]
fn throttled_listing_is_retried() {
    let mock = MockDropbox::start(State {
        throttle_listing: 1,
        ..State::default()
    });
    let client = mock.client(FRESH_TOKEN).with_retry(RetryPolicy {
        max_attempts: 2,
        base_backoff_ms: 0,
    });

    let page = client.list_folder("/Nov25", true).expect("listing");
    assert_eq!(page.cursor, "page-2");
    assert_eq!(mock.seen("/2/files/list_folder").len(), 2);
}

#[test]
fn existing_folder_conflict_is_already_exists() {
    let mock = MockDropbox::start(State::default());
    let client = mock.client(FRESH_TOKEN);

    assert!(!client.folder_exists("/Nov25/Dev/Jane Doe").expect("exists"));
    assert_eq!(
        client.create_folder("/Nov25/Dev/Jane Doe").expect("create"),
        FolderOutcome::Created
    );
    assert!(client.folder_exists("/Nov25/Dev/Jane Doe").expect("exists"));
    assert_eq!(
        client.create_folder("/Nov25/Dev/Jane Doe").expect("create again"),
        FolderOutcome::AlreadyExists
    );
}
