use reqwest::StatusCode;
use thiserror::Error;

/// Convenient result alias returning [`SpotifyError`] failures.
pub type SpotifyResult<T> = Result<T, SpotifyError>;

/// Classified failures of a Spotify call.
#[derive(Debug, Error)]
pub enum SpotifyError {
    /// The token endpoint refused the code or refresh token (`invalid_grant`).
    #[error("spotify rejected the grant ({error})")]
    InvalidGrant {
        /// OAuth error code.
        error: String,
        /// `error_description` from the body.
        description: Option<String>,
    },
    /// The Web API refused the bearer token (HTTP 401).
    #[error("spotify rejected the access token")]
    Unauthorized,
    /// The HTTP client could not be built.
    #[error("failed to build the spotify HTTP client")]
    ClientBuilder {
        /// HTTP client error.
        #[source]
        source: reqwest::Error,
    },
    /// Network failure or timeout.
    #[error("failed to reach spotify endpoint `{endpoint}`")]
    Transport {
        /// Endpoint path called.
        endpoint: &'static str,
        /// HTTP client error.
        #[source]
        source: reqwest::Error,
    },
    /// Any other non-success status. `body` is kept for logs only.
    #[error("unexpected spotify response status {status} from `{endpoint}`")]
    Status {
        /// Endpoint path called.
        endpoint: &'static str,
        /// Returned status.
        status: StatusCode,
        /// Raw response body.
        body: String,
    },
    /// Success status with a payload we could not decode.
    #[error("failed to decode spotify response from `{endpoint}`")]
    Decode {
        /// Endpoint path called.
        endpoint: &'static str,
        /// Decoder error.
        #[source]
        source: serde_json::Error,
    },
    /// Configured base URL could not be turned into a request URL.
    #[error("invalid spotify URL `{url}`: {message}")]
    InvalidUrl {
        /// URL that failed to parse.
        url: String,
        /// Parser message.
        message: String,
    },
}

impl SpotifyError {
    /// Spotify answered and refused the credential: retrying with the same
    /// credential cannot succeed.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::InvalidGrant { .. } | Self::Unauthorized)
    }

    /// Upstream response body, when one was captured.
    pub fn upstream_body(&self) -> Option<&str> {
        match self {
            Self::Status { body, .. } => Some(body.as_str()),
            Self::InvalidGrant { description, .. } => description.as_deref(),
            _ => None,
        }
    }
}
