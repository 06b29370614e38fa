//! Credential validation with one-shot token refresh.
//!
//! ```text
//! Unauthenticated ──check ok──────────────────────────▶ Authenticated
//!        │
//!        └─expired + refresh creds─▶ RefreshAttempted ─check ok─▶ Authenticated
//!                                           │
//!                                           └─any failure──────▶ Failed
//! ```
//!
//! Transitions are driven by [`StoreErrorCode`] only. Any failure other than
//! an expired credential, or an expired credential with no refresh
//! credentials configured, goes straight to `Failed`.

use crate::error::SyncError;
use crate::store::{Account, ProfileStore, StoreError, StoreErrorCode};

/// App key, app secret and long-lived refresh token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshCredentials {
    pub app_key: String,
    pub app_secret: String,
    pub refresh_token: String,
}

impl RefreshCredentials {
    /// All three parts present and non-empty, or `None`.
    pub fn from_parts(
        app_key: Option<String>,
        app_secret: Option<String>,
        refresh_token: Option<String>,
    ) -> Option<Self> {
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        Some(Self {
            app_key: non_empty(app_key)?,
            app_secret: non_empty(app_secret)?,
            refresh_token: non_empty(refresh_token)?,
        })
    }
}

/// A store whose bearer credential can be swapped after a refresh.
pub trait Reauthenticate {
    fn set_access_token(&mut self, token: String);
}

/// Exchanges refresh credentials for a fresh access token.
pub trait TokenExchange {
    fn exchange(&self, creds: &RefreshCredentials) -> Result<String, StoreError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    RefreshAttempted,
    Authenticated(Account),
    Failed(String),
}

impl AuthState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Authenticated(_) | Self::Failed(_))
    }
}

/// Advance the machine by one transition. Terminal states are returned as-is.
pub fn step<S>(state: AuthState, store: &mut S, refresh: Option<&RefreshCredentials>) -> AuthState
where
    S: ProfileStore + Reauthenticate + TokenExchange,
{
    match state {
        AuthState::Unauthenticated => match store.current_account() {
            Ok(account) => AuthState::Authenticated(account),
            Err(err) if err.code == StoreErrorCode::ExpiredCredential => match refresh {
                Some(creds) => match store.exchange(creds) {
                    Ok(token) => {
                        store.set_access_token(token);
                        AuthState::RefreshAttempted
                    }
                    Err(err) => AuthState::Failed(format!("token refresh failed: {err}")),
                },
                None => AuthState::Failed(
                    "access token expired and no refresh credentials are configured".to_string(),
                ),
            },
            Err(err) => AuthState::Failed(err.to_string()),
        },
        AuthState::RefreshAttempted => match store.current_account() {
            Ok(account) => AuthState::Authenticated(account),
            Err(err) => AuthState::Failed(format!("refreshed token rejected: {err}")),
        },
        terminal => terminal,
    }
}

/// Drive the machine to a terminal state.
pub fn authenticate<S>(store: &mut S, refresh: Option<&RefreshCredentials>) -> Result<Account, SyncError>
where
    S: ProfileStore + Reauthenticate + TokenExchange,
{
    let mut state = AuthState::Unauthenticated;
    while !state.is_terminal() {
        state = step(state, store, refresh);
        tracing::debug!(backend = store.backend(), state = ?state, "auth transition");
    }
    match state {
        AuthState::Authenticated(account) => {
            tracing::info!(account = %account.email, "authenticated");
            Ok(account)
        }
        AuthState::Failed(reason) => Err(SyncError::Auth(reason)),
        AuthState::Unauthenticated | AuthState::RefreshAttempted => {
            Err(SyncError::Auth("authentication did not complete".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FolderOutcome, ListPage};
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Answers the account lookup from a script; nothing else is reachable.
    struct ScriptedStore {
        lookups: RefCell<VecDeque<Result<Account, StoreError>>>,
        exchange_result: Result<String, StoreError>,
        exchanges: RefCell<usize>,
        token: String,
    }

    impl ScriptedStore {
        fn new(lookups: Vec<Result<Account, StoreError>>) -> Self {
            Self {
                lookups: RefCell::new(lookups.into()),
                exchange_result: Ok("fresh".to_string()),
                exchanges: RefCell::new(0),
                token: "stale".to_string(),
            }
        }
    }

    impl ProfileStore for ScriptedStore {
        fn backend(&self) -> &'static str {
            "scripted"
        }
        fn current_account(&self) -> Result<Account, StoreError> {
            self.lookups
                .borrow_mut()
                .pop_front()
                .expect("lookup script exhausted")
        }
        fn download(&self, _: &str) -> Result<String, StoreError> {
            unreachable!()
        }
        fn upload(&self, _: &str, _: &str) -> Result<(), StoreError> {
            unreachable!()
        }
        fn list_folder(&self, _: &str, _: bool) -> Result<ListPage, StoreError> {
            unreachable!()
        }
        fn list_folder_continue(&self, _: &str) -> Result<ListPage, StoreError> {
            unreachable!()
        }
        fn folder_exists(&self, _: &str) -> Result<bool, StoreError> {
            unreachable!()
        }
        fn create_folder(&self, _: &str) -> Result<FolderOutcome, StoreError> {
            unreachable!()
        }
    }

    impl Reauthenticate for ScriptedStore {
        fn set_access_token(&mut self, token: String) {
            self.token = token;
        }
    }

    impl TokenExchange for ScriptedStore {
        fn exchange(&self, _: &RefreshCredentials) -> Result<String, StoreError> {
            *self.exchanges.borrow_mut() += 1;
            self.exchange_result.clone()
        }
    }

    fn account() -> Account {
        Account {
            email: "ops@example.com".to_string(),
            display_name: "Ops".to_string(),
        }
    }

    fn expired() -> StoreError {
        StoreError::new(StoreErrorCode::ExpiredCredential, "expired_access_token/")
    }

    fn creds() -> RefreshCredentials {
        RefreshCredentials {
            app_key: "k".to_string(),
            app_secret: "s".to_string(),
            refresh_token: "r".to_string(),
        }
    }

    #[test]
    fn valid_token_authenticates_without_refresh() {
        let mut store = ScriptedStore::new(vec![Ok(account())]);
        let got = authenticate(&mut store, Some(&creds())).unwrap();
        assert_eq!(got, account());
        assert_eq!(*store.exchanges.borrow(), 0);
        assert_eq!(store.token, "stale");
    }

    #[test]
    fn expired_token_is_refreshed_once() {
        let mut store = ScriptedStore::new(vec![Err(expired()), Ok(account())]);
        authenticate(&mut store, Some(&creds())).unwrap();
        assert_eq!(*store.exchanges.borrow(), 1);
        assert_eq!(store.token, "fresh");
    }

    #[test]
    fn expired_without_refresh_credentials_fails() {
        let mut store = ScriptedStore::new(vec![Err(expired())]);
        let err = authenticate(&mut store, None).unwrap_err();
        assert!(matches!(err, SyncError::Auth(ref m) if m.contains("no refresh credentials")));
    }

    #[test]
    fn second_lookup_failure_is_terminal() {
        let mut store = ScriptedStore::new(vec![Err(expired()), Err(expired())]);
        let err = authenticate(&mut store, Some(&creds())).unwrap_err();
        assert!(matches!(err, SyncError::Auth(_)));
        // Exactly one refresh; the lookup script had no third entry.
        assert_eq!(*store.exchanges.borrow(), 1);
    }

    #[test]
    fn invalid_token_never_refreshes() {
        let mut store = ScriptedStore::new(vec![Err(StoreError::new(
            StoreErrorCode::InvalidCredential,
            "invalid_access_token/",
        ))]);
        assert!(authenticate(&mut store, Some(&creds())).is_err());
        assert_eq!(*store.exchanges.borrow(), 0);
    }

    #[test]
    fn failed_exchange_is_terminal() {
        let mut store = ScriptedStore::new(vec![Err(expired())]);
        store.exchange_result = Err(StoreError::new(StoreErrorCode::InvalidCredential, "bad grant"));
        let state = step(AuthState::Unauthenticated, &mut store, Some(&creds()));
        assert!(matches!(state, AuthState::Failed(ref m) if m.contains("bad grant")));
    }

    #[test]
    fn refresh_credentials_require_all_parts() {
        assert!(RefreshCredentials::from_parts(Some("k".into()), Some("s".into()), None).is_none());
        assert!(RefreshCredentials::from_parts(Some("k".into()), Some(" ".into()), Some("r".into()))
            .is_none());
        assert_eq!(
            RefreshCredentials::from_parts(Some("k".into()), Some("s".into()), Some("r".into())),
            Some(creds())
        );
    }
}
