//! Application-level configuration: Spotify endpoints, scopes, client credentials and
//! the storage backend selection.

use std::{env, fmt, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "SPOTIQUIZ_BACK_CONFIG_PATH";
const DEFAULT_ACCOUNTS_BASE_URL: &str = "https://accounts.spotify.com";
const DEFAULT_API_BASE_URL: &str = "https://api.spotify.com";
const DEFAULT_SCOPES: [&str; 4] = [
    "user-read-private",
    "user-read-email",
    "playlist-read-private",
    "streaming",
];
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors raised while assembling the runtime configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable is missing or empty.
    #[error("missing environment variable `{var}`")]
    MissingEnvVar {
        /// Variable name.
        var: &'static str,
    },
    /// Environment variable holds a value we do not understand.
    #[error("invalid value `{value}` for environment variable `{var}`")]
    InvalidEnvVar {
        /// Variable name.
        var: &'static str,
        /// Value found.
        value: String,
    },
}

/// Immutable runtime configuration shared across the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Non-secret Spotify endpoint settings.
    pub spotify: SpotifySettings,
    /// OAuth client registration.
    pub credentials: SpotifyCredentials,
}

impl AppConfig {
    /// Load the JSON settings file (with defaults) and the credentials from the environment.
    pub fn load() -> Result<Self, ConfigError> {
        Ok(Self {
            spotify: SpotifySettings::load(),
            credentials: SpotifyCredentials::from_env()?,
        })
    }
}

/// Spotify endpoints and request policy.
#[derive(Debug, Clone)]
pub struct SpotifySettings {
    /// Base URL of the accounts service (`/authorize`, `/api/token`).
    pub accounts_base_url: String,
    /// Base URL of the Web API (`/v1/me`).
    pub api_base_url: String,
    /// Scopes requested when building the authorization URL.
    pub scopes: Vec<String>,
    /// Timeout applied to every outbound Spotify request.
    pub request_timeout: Duration,
}

impl SpotifySettings {
    /// Read the settings file, falling back to the built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let settings: Self = raw.into();
                    info!(
                        path = %path.display(),
                        accounts = %settings.accounts_base_url,
                        api = %settings.api_base_url,
                        "loaded Spotify settings from config"
                    );
                    settings
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }
}

impl Default for SpotifySettings {
    fn default() -> Self {
        Self {
            accounts_base_url: DEFAULT_ACCOUNTS_BASE_URL.to_owned(),
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
            scopes: DEFAULT_SCOPES.iter().map(|scope| (*scope).to_owned()).collect(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// OAuth client registration. The secret never shows up in `Debug` output.
#[derive(Clone)]
pub struct SpotifyCredentials {
    /// Application client id from the Spotify dashboard.
    pub client_id: String,
    /// Application client secret.
    pub client_secret: String,
    /// Redirect URI registered for the application.
    pub redirect_uri: String,
}

impl SpotifyCredentials {
    /// Bundle a client registration.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
        }
    }

    /// Read `SPOTIFY_CLIENT_ID`, `SPOTIFY_CLIENT_SECRET` and `SPOTIFY_REDIRECT_URI`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::new(
            required_env("SPOTIFY_CLIENT_ID")?,
            required_env("SPOTIFY_CLIENT_SECRET")?,
            required_env("SPOTIFY_REDIRECT_URI")?,
        ))
    }
}

impl fmt::Debug for SpotifyCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpotifyCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .finish()
    }
}

/// Persistence backend selected through `STORAGE_BACKEND`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// MongoDB, configured through `MONGO_URI` and `MONGO_DB`.
    Mongo,
}

impl StorageBackend {
    /// Parse `STORAGE_BACKEND`, defaulting to MongoDB.
    pub fn from_env() -> Result<Self, ConfigError> {
        match env::var("STORAGE_BACKEND") {
            Ok(value) => Self::parse(&value).ok_or(ConfigError::InvalidEnvVar {
                var: "STORAGE_BACKEND",
                value,
            }),
            Err(_) => Ok(Self::Mongo),
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "mongo" | "mongodb" => Some(Self::Mongo),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default)]
    spotify: RawSpotifySettings,
}

#[derive(Debug, Default, Deserialize)]
struct RawSpotifySettings {
    accounts_base_url: Option<String>,
    api_base_url: Option<String>,
    scopes: Option<Vec<String>>,
    request_timeout_secs: Option<u64>,
}

impl From<RawConfig> for SpotifySettings {
    fn from(value: RawConfig) -> Self {
        let defaults = Self::default();
        let raw = value.spotify;
        Self {
            accounts_base_url: raw.accounts_base_url.unwrap_or(defaults.accounts_base_url),
            api_base_url: raw.api_base_url.unwrap_or(defaults.api_base_url),
            scopes: raw
                .scopes
                .filter(|scopes| !scopes.is_empty())
                .unwrap_or(defaults.scopes),
            request_timeout: raw
                .request_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
        }
    }
}

fn required_env(var: &'static str) -> Result<String, ConfigError> {
    env::var(var)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or(ConfigError::MissingEnvVar { var })
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
