use std::sync::Arc;

use tokio::sync::{RwLock, watch};

use crate::{
    config::AppConfig,
    dao::account_store::AccountStore,
    error::ServiceError,
    services::callback_guard::CallbackGuard,
    spotify::SpotifyApi,
};

/// Handle to [`AppState`] shared by every handler and background task.
pub type SharedState = Arc<AppState>;

/// Central application state: storage handle, Spotify client and callback guard.
pub struct AppState {
    account_store: RwLock<Option<Arc<dyn AccountStore>>>,
    spotify: Arc<dyn SpotifyApi>,
    config: AppConfig,
    callback_guard: CallbackGuard,
    degraded: watch::Sender<bool>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig, spotify: Arc<dyn SpotifyApi>) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            account_store: RwLock::new(None),
            spotify,
            config,
            callback_guard: CallbackGuard::default(),
            degraded: degraded_tx,
        })
    }

    /// Obtain a handle to the current account store, if one is installed.
    pub async fn account_store(&self) -> Option<Arc<dyn AccountStore>> {
        let guard = self.account_store.read().await;
        guard.as_ref().cloned()
    }

    /// Account store or [`ServiceError::Degraded`] when none is installed.
    pub async fn require_account_store(&self) -> Result<Arc<dyn AccountStore>, ServiceError> {
        self.account_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new account store implementation and leave degraded mode.
    pub async fn set_account_store(&self, store: Arc<dyn AccountStore>) {
        {
            let mut guard = self.account_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false);
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Update the degraded flag, notifying watchers only when it changes.
    pub fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        });
    }

    /// Client used for every call to Spotify.
    pub fn spotify(&self) -> &dyn SpotifyApi {
        self.spotify.as_ref()
    }

    /// Loaded application configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Guard rejecting concurrent exchanges of the same authorization code.
    pub fn callback_guard(&self) -> &CallbackGuard {
        &self.callback_guard
    }
}
