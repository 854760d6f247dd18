//! Construction of the Spotify consent URL the client redirects the user to.

use rand::{Rng, distr::Alphanumeric, rng};
use reqwest::Url;

use super::error::{SpotifyError, SpotifyResult};
use crate::config::{SpotifyCredentials, SpotifySettings};

const STATE_LENGTH: usize = 32;

/// Random opaque value echoed back by Spotify on the redirect.
pub fn generate_state() -> String {
    rng()
        .sample_iter(&Alphanumeric)
        .take(STATE_LENGTH)
        .map(char::from)
        .collect()
}

/// `{accounts}/authorize?client_id&response_type=code&redirect_uri&scope&state`.
pub fn authorization_url(
    settings: &SpotifySettings,
    credentials: &SpotifyCredentials,
    state: &str,
) -> SpotifyResult<Url> {
    let base = format!(
        "{}/authorize",
        settings.accounts_base_url.trim_end_matches('/')
    );
    let scope = settings.scopes.join(" ");

    Url::parse_with_params(
        &base,
        &[
            ("client_id", credentials.client_id.as_str()),
            ("response_type", "code"),
            ("redirect_uri", credentials.redirect_uri.as_str()),
            ("scope", scope.as_str()),
            ("state", state),
        ],
    )
    .map_err(|err| SpotifyError::InvalidUrl {
        url: base.clone(),
        message: err.to_string(),
    })
}
