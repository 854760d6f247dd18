//! Scripted collaborators shared by the service and router tests.

use std::{
    collections::HashSet,
    io,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::SystemTime,
};

use futures::future::BoxFuture;
use reqwest::StatusCode;
use uuid::Uuid;

use crate::{
    config::{AppConfig, SpotifyCredentials, SpotifySettings},
    dao::{
        account_store::{AccountStore, memory::MemoryAccountStore},
        models::{AccountEntity, SpotifyLinkEntity},
        storage::{StorageError, StorageResult},
    },
    spotify::{SpotifyApi, SpotifyError, SpotifyProfile, SpotifyResult, TokenGrant},
    state::{AppState, SharedState},
};

/// How a scripted Spotify call answers.
#[derive(Debug, Clone)]
pub enum Reply<T> {
    Ok(T),
    /// `invalid_grant` on the token endpoint, 401 on `/v1/me`.
    Rejected,
    /// 503 from Spotify.
    Unavailable,
}

struct FakeSpotifyInner {
    exchange: Mutex<Reply<TokenGrant>>,
    refresh: Mutex<Reply<TokenGrant>>,
    profile: Mutex<Reply<SpotifyProfile>>,
    consumed_codes: Mutex<HashSet<String>>,
    probed_tokens: Mutex<Vec<String>>,
    exchange_calls: AtomicUsize,
    refresh_calls: AtomicUsize,
    profile_calls: AtomicUsize,
}

/// In-process [`SpotifyApi`] honouring single-use authorization codes.
#[derive(Clone)]
pub struct FakeSpotify {
    inner: Arc<FakeSpotifyInner>,
}

impl Default for FakeSpotify {
    fn default() -> Self {
        Self {
            inner: Arc::new(FakeSpotifyInner {
                exchange: Mutex::new(Reply::Ok(TokenGrant {
                    access_token: "access-1".into(),
                    refresh_token: Some("refresh-1".into()),
                    expires_in: Some(3600),
                })),
                refresh: Mutex::new(Reply::Ok(TokenGrant {
                    access_token: "access-2".into(),
                    refresh_token: None,
                    expires_in: Some(3600),
                })),
                profile: Mutex::new(Reply::Ok(SpotifyProfile {
                    id: "spotify-user".into(),
                    display_name: Some("DJ Quiz".into()),
                })),
                consumed_codes: Mutex::new(HashSet::new()),
                probed_tokens: Mutex::new(Vec::new()),
                exchange_calls: AtomicUsize::new(0),
                refresh_calls: AtomicUsize::new(0),
                profile_calls: AtomicUsize::new(0),
            }),
        }
    }
}

impl FakeSpotify {
    pub fn set_exchange(&self, reply: Reply<TokenGrant>) {
        *self.inner.exchange.lock().unwrap() = reply;
    }

    pub fn set_refresh(&self, reply: Reply<TokenGrant>) {
        *self.inner.refresh.lock().unwrap() = reply;
    }

    pub fn set_profile(&self, reply: Reply<SpotifyProfile>) {
        *self.inner.profile.lock().unwrap() = reply;
    }

    pub fn exchange_calls(&self) -> usize {
        self.inner.exchange_calls.load(Ordering::SeqCst)
    }

    pub fn refresh_calls(&self) -> usize {
        self.inner.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn profile_calls(&self) -> usize {
        self.inner.profile_calls.load(Ordering::SeqCst)
    }

    /// Bearer tokens presented to `/v1/me`, in call order.
    pub fn probed_tokens(&self) -> Vec<String> {
        self.inner.probed_tokens.lock().unwrap().clone()
    }
}

fn unavailable(endpoint: &'static str) -> SpotifyError {
    SpotifyError::Status {
        endpoint,
        status: StatusCode::SERVICE_UNAVAILABLE,
        body: "upstream down".into(),
    }
}

fn invalid_grant(description: &str) -> SpotifyError {
    SpotifyError::InvalidGrant {
        error: "invalid_grant".into(),
        description: Some(description.into()),
    }
}

impl SpotifyApi for FakeSpotify {
    fn exchange_code(&self, code: String) -> BoxFuture<'static, SpotifyResult<TokenGrant>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            inner.exchange_calls.fetch_add(1, Ordering::SeqCst);
            if inner.consumed_codes.lock().unwrap().contains(&code) {
                return Err(invalid_grant("Invalid authorization code"));
            }
            let reply = inner.exchange.lock().unwrap().clone();
            match reply {
                Reply::Ok(grant) => {
                    inner.consumed_codes.lock().unwrap().insert(code);
                    Ok(grant)
                }
                Reply::Rejected => Err(invalid_grant("Authorization code expired")),
                Reply::Unavailable => Err(unavailable("/api/token")),
            }
        })
    }

    fn refresh_access_token(
        &self,
        _refresh_token: String,
    ) -> BoxFuture<'static, SpotifyResult<TokenGrant>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            inner.refresh_calls.fetch_add(1, Ordering::SeqCst);
            let reply = inner.refresh.lock().unwrap().clone();
            match reply {
                Reply::Ok(grant) => Ok(grant),
                Reply::Rejected => Err(invalid_grant("Refresh token revoked")),
                Reply::Unavailable => Err(unavailable("/api/token")),
            }
        })
    }

    fn current_user(
        &self,
        access_token: String,
    ) -> BoxFuture<'static, SpotifyResult<SpotifyProfile>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            inner.profile_calls.fetch_add(1, Ordering::SeqCst);
            inner.probed_tokens.lock().unwrap().push(access_token);
            let reply = inner.profile.lock().unwrap().clone();
            match reply {
                Reply::Ok(profile) => Ok(profile),
                Reply::Rejected => Err(SpotifyError::Unauthorized),
                Reply::Unavailable => Err(unavailable("/v1/me")),
            }
        })
    }
}

/// [`MemoryAccountStore`] that records every save and can refuse writes.
#[derive(Clone, Default)]
pub struct RecordingStore {
    inner: MemoryAccountStore,
    saves: Arc<Mutex<Vec<AccountEntity>>>,
    fail_writes: Arc<AtomicBool>,
}

impl RecordingStore {
    /// Insert an account without recording a save.
    pub fn seed(&self, account: AccountEntity) {
        self.inner.insert(account);
    }

    pub fn account(&self, id: Uuid) -> AccountEntity {
        self.inner.get(id).expect("account seeded")
    }

    pub fn saves(&self) -> Vec<AccountEntity> {
        self.saves.lock().unwrap().clone()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl AccountStore for RecordingStore {
    fn find_account(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<AccountEntity>>> {
        self.inner.find_account(id)
    }

    fn find_account_by_email(
        &self,
        email: String,
    ) -> BoxFuture<'static, StorageResult<Option<AccountEntity>>> {
        self.inner.find_account_by_email(email)
    }

    fn save_account(&self, account: AccountEntity) -> BoxFuture<'static, StorageResult<()>> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Box::pin(async {
                Err(StorageError::unavailable(
                    "write refused",
                    io::Error::other("injected failure"),
                ))
            });
        }
        self.saves.lock().unwrap().push(account.clone());
        self.inner.save_account(account)
    }

    fn delete_account(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        self.inner.delete_account(id)
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        self.inner.health_check()
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        self.inner.try_reconnect()
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        spotify: SpotifySettings::default(),
        credentials: SpotifyCredentials::new(
            "client-id",
            "client-secret",
            "http://localhost:3000/callback",
        ),
    }
}

/// Shared state wired to the given fakes, out of degraded mode.
pub async fn test_state(spotify: &FakeSpotify, store: &RecordingStore) -> SharedState {
    let state = AppState::new(test_config(), Arc::new(spotify.clone()));
    state.set_account_store(Arc::new(store.clone())).await;
    state
}

/// Account that has never been linked.
pub fn unlinked_account() -> AccountEntity {
    AccountEntity::new(Uuid::new_v4(), "player@example.com")
}

/// Account linked with `access-0`/`refresh-0`, token obtained at `obtained_at`.
pub fn linked_account(obtained_at: SystemTime) -> AccountEntity {
    let mut account = unlinked_account();
    account.spotify = SpotifyLinkEntity::linked(
        "access-0".into(),
        "refresh-0".into(),
        "DJ Quiz".into(),
        obtained_at,
    );
    account
}
