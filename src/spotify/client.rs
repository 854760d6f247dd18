use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{
    SpotifyApi, SpotifyProfile, TokenGrant,
    error::{SpotifyError, SpotifyResult},
    models::{OAuthErrorBody, ProfileResponse, TokenResponse},
};
use crate::config::{SpotifyCredentials, SpotifySettings};

const TOKEN_ENDPOINT: &str = "/api/token";
const PROFILE_ENDPOINT: &str = "/v1/me";

/// [`SpotifyApi`] implementation talking to the real accounts service and Web API.
#[derive(Clone)]
pub struct HttpSpotifyClient {
    client: Client,
    token_url: Arc<str>,
    profile_url: Arc<str>,
    credentials: Arc<SpotifyCredentials>,
}

impl HttpSpotifyClient {
    /// Build a client whose every request carries the configured timeout.
    pub fn new(settings: &SpotifySettings, credentials: SpotifyCredentials) -> SpotifyResult<Self> {
        let client = Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|source| SpotifyError::ClientBuilder { source })?;

        Ok(Self {
            client,
            token_url: Arc::from(format!(
                "{}{}",
                settings.accounts_base_url.trim_end_matches('/'),
                TOKEN_ENDPOINT
            )),
            profile_url: Arc::from(format!(
                "{}{}",
                settings.api_base_url.trim_end_matches('/'),
                PROFILE_ENDPOINT
            )),
            credentials: Arc::new(credentials),
        })
    }

    async fn request_token(&self, form: &[(&str, &str)]) -> SpotifyResult<TokenGrant> {
        let response = self
            .client
            .post(self.token_url.as_ref())
            .form(form)
            .send()
            .await
            .map_err(|source| SpotifyError::Transport {
                endpoint: TOKEN_ENDPOINT,
                source,
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| SpotifyError::Transport {
                endpoint: TOKEN_ENDPOINT,
                source,
            })?;

        if !status.is_success() {
            return Err(classify_token_failure(status, body));
        }

        decode::<TokenResponse>(TOKEN_ENDPOINT, &body).map(Into::into)
    }

    async fn fetch_profile(&self, access_token: &str) -> SpotifyResult<SpotifyProfile> {
        let response = self
            .client
            .get(self.profile_url.as_ref())
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|source| SpotifyError::Transport {
                endpoint: PROFILE_ENDPOINT,
                source,
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| SpotifyError::Transport {
                endpoint: PROFILE_ENDPOINT,
                source,
            })?;

        match status {
            StatusCode::UNAUTHORIZED => Err(SpotifyError::Unauthorized),
            status if status.is_success() => {
                decode::<ProfileResponse>(PROFILE_ENDPOINT, &body).map(Into::into)
            }
            status => Err(SpotifyError::Status {
                endpoint: PROFILE_ENDPOINT,
                status,
                body,
            }),
        }
    }
}

impl SpotifyApi for HttpSpotifyClient {
    fn exchange_code(&self, code: String) -> BoxFuture<'static, SpotifyResult<TokenGrant>> {
        let client = self.clone();
        Box::pin(async move {
            debug!("exchanging spotify authorization code");
            let credentials = client.credentials.clone();
            client
                .request_token(&[
                    ("grant_type", "authorization_code"),
                    ("code", code.as_str()),
                    ("redirect_uri", credentials.redirect_uri.as_str()),
                    ("client_id", credentials.client_id.as_str()),
                    ("client_secret", credentials.client_secret.as_str()),
                ])
                .await
        })
    }

    fn refresh_access_token(
        &self,
        refresh_token: String,
    ) -> BoxFuture<'static, SpotifyResult<TokenGrant>> {
        let client = self.clone();
        Box::pin(async move {
            debug!("refreshing spotify access token");
            let credentials = client.credentials.clone();
            client
                .request_token(&[
                    ("grant_type", "refresh_token"),
                    ("refresh_token", refresh_token.as_str()),
                    ("client_id", credentials.client_id.as_str()),
                    ("client_secret", credentials.client_secret.as_str()),
                ])
                .await
        })
    }

    fn current_user(
        &self,
        access_token: String,
    ) -> BoxFuture<'static, SpotifyResult<SpotifyProfile>> {
        let client = self.clone();
        Box::pin(async move { client.fetch_profile(&access_token).await })
    }
}

/// Map a non-success token endpoint response onto a [`SpotifyError`].
///
/// Only an explicit `invalid_grant` on 400/401 counts as a rejection; anything
/// else (including `invalid_client`) is reported as an upstream failure.
fn classify_token_failure(status: StatusCode, body: String) -> SpotifyError {
    if matches!(status, StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED) {
        if let Ok(parsed) = serde_json::from_str::<OAuthErrorBody>(&body) {
            if parsed.error == "invalid_grant" {
                return SpotifyError::InvalidGrant {
                    error: parsed.error,
                    description: parsed.error_description,
                };
            }
        }
    }

    SpotifyError::Status {
        endpoint: TOKEN_ENDPOINT,
        status,
        body,
    }
}

fn decode<T: DeserializeOwned>(endpoint: &'static str, body: &str) -> SpotifyResult<T> {
    serde_json::from_str(body).map_err(|source| SpotifyError::Decode { endpoint, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_grant_is_a_rejection() {
        let err = classify_token_failure(
            StatusCode::BAD_REQUEST,
            r#"{"error":"invalid_grant","error_description":"Invalid authorization code"}"#.into(),
        );
        match &err {
            SpotifyError::InvalidGrant { error, description } => {
                assert_eq!(error, "invalid_grant");
                assert_eq!(description.as_deref(), Some("Invalid authorization code"));
            }
            other => panic!("expected invalid grant, got {other:?}"),
        }
        assert!(err.is_rejection());
    }

    #[test]
    fn other_oauth_errors_are_not_rejections() {
        let err = classify_token_failure(
            StatusCode::BAD_REQUEST,
            r#"{"error":"invalid_client"}"#.into(),
        );
        assert!(matches!(err, SpotifyError::Status { status, .. } if status == StatusCode::BAD_REQUEST));
        assert!(!err.is_rejection());
    }

    #[test]
    fn server_errors_keep_body_for_logs() {
        let err = classify_token_failure(StatusCode::BAD_GATEWAY, "<html>oops</html>".into());
        assert!(!err.is_rejection());
        assert_eq!(err.upstream_body(), Some("<html>oops</html>"));
    }

    #[test]
    fn token_payload_without_refresh_token_decodes() {
        let grant: TokenGrant =
            decode::<TokenResponse>(TOKEN_ENDPOINT, r#"{"access_token":"abc","expires_in":3600}"#)
                .unwrap()
                .into();
        assert_eq!(grant.access_token, "abc");
        assert_eq!(grant.refresh_token, None);
        assert_eq!(grant.expires_in, Some(3600));
    }

    mod over_http {
        use std::time::Duration;

        use httpmock::prelude::*;
        use serde_json::json;

        use super::*;

        fn client_for(server: &MockServer, timeout: Duration) -> HttpSpotifyClient {
            let settings = SpotifySettings {
                accounts_base_url: server.base_url(),
                api_base_url: server.base_url(),
                request_timeout: timeout,
                ..SpotifySettings::default()
            };
            HttpSpotifyClient::new(
                &settings,
                SpotifyCredentials::new("client-id", "client-secret", "http://localhost:3000/callback"),
            )
            .unwrap()
        }

        fn client(server: &MockServer) -> HttpSpotifyClient {
            client_for(server, Duration::from_secs(5))
        }

        #[tokio::test]
        async fn code_exchange_posts_the_authorization_code_form() {
            let server = MockServer::start_async().await;
            let token = server
                .mock_async(|when, then| {
                    when.method(POST)
                        .path("/api/token")
                        .x_www_form_urlencoded_tuple("grant_type", "authorization_code")
                        .x_www_form_urlencoded_tuple("code", "code-1")
                        .x_www_form_urlencoded_tuple("redirect_uri", "http://localhost:3000/callback")
                        .x_www_form_urlencoded_tuple("client_id", "client-id")
                        .x_www_form_urlencoded_tuple("client_secret", "client-secret");
                    then.status(200).json_body(json!({
                        "access_token": "access-1",
                        "refresh_token": "refresh-1",
                        "expires_in": 3600,
                        "token_type": "Bearer"
                    }));
                })
                .await;

            let grant = client(&server).exchange_code("code-1".into()).await.unwrap();

            token.assert_async().await;
            assert_eq!(grant.access_token, "access-1");
            assert_eq!(grant.refresh_token.as_deref(), Some("refresh-1"));
        }

        #[tokio::test]
        async fn refresh_posts_the_refresh_token_form() {
            let server = MockServer::start_async().await;
            let token = server
                .mock_async(|when, then| {
                    when.method(POST)
                        .path("/api/token")
                        .x_www_form_urlencoded_tuple("grant_type", "refresh_token")
                        .x_www_form_urlencoded_tuple("refresh_token", "refresh-0")
                        .x_www_form_urlencoded_tuple("client_id", "client-id")
                        .x_www_form_urlencoded_tuple("client_secret", "client-secret");
                    then.status(200)
                        .json_body(json!({"access_token": "access-2", "expires_in": 3600}));
                })
                .await;

            let grant = client(&server)
                .refresh_access_token("refresh-0".into())
                .await
                .unwrap();

            token.assert_async().await;
            assert_eq!(grant.access_token, "access-2");
            assert_eq!(grant.refresh_token, None);
        }

        #[tokio::test]
        async fn invalid_grant_response_is_a_rejection() {
            let server = MockServer::start_async().await;
            server
                .mock_async(|when, then| {
                    when.method(POST).path("/api/token");
                    then.status(400).json_body(json!({
                        "error": "invalid_grant",
                        "error_description": "Invalid authorization code"
                    }));
                })
                .await;

            let err = client(&server).exchange_code("used".into()).await.unwrap_err();

            assert!(matches!(err, SpotifyError::InvalidGrant { .. }));
            assert!(err.is_rejection());
        }

        #[tokio::test]
        async fn invalid_client_and_server_errors_are_upstream_failures() {
            let server = MockServer::start_async().await;
            let mut invalid_client = server
                .mock_async(|when, then| {
                    when.method(POST).path("/api/token");
                    then.status(400).json_body(json!({"error": "invalid_client"}));
                })
                .await;

            let err = client(&server)
                .refresh_access_token("refresh-0".into())
                .await
                .unwrap_err();
            assert!(matches!(err, SpotifyError::Status { status, .. } if status == StatusCode::BAD_REQUEST));
            assert!(!err.is_rejection());

            invalid_client.delete_async().await;
            server
                .mock_async(|when, then| {
                    when.method(POST).path("/api/token");
                    then.status(500).body("upstream down");
                })
                .await;

            let err = client(&server)
                .refresh_access_token("refresh-0".into())
                .await
                .unwrap_err();
            assert!(matches!(err, SpotifyError::Status { status, .. } if status == StatusCode::INTERNAL_SERVER_ERROR));
            assert!(!err.is_rejection());
            assert_eq!(err.upstream_body(), Some("upstream down"));
        }

        #[tokio::test]
        async fn profile_is_read_with_bearer_token() {
            let server = MockServer::start_async().await;
            let me = server
                .mock_async(|when, then| {
                    when.method(GET)
                        .path("/v1/me")
                        .header("authorization", "Bearer access-1");
                    then.status(200)
                        .json_body(json!({"id": "spotify-user", "display_name": "DJ Quiz"}));
                })
                .await;

            let profile = client(&server).current_user("access-1".into()).await.unwrap();

            me.assert_async().await;
            assert_eq!(profile.id, "spotify-user");
            assert_eq!(profile.username(), "DJ Quiz");
        }

        #[tokio::test]
        async fn profile_unauthorized_is_a_rejection() {
            let server = MockServer::start_async().await;
            server
                .mock_async(|when, then| {
                    when.method(GET).path("/v1/me");
                    then.status(401).json_body(json!({
                        "error": {"status": 401, "message": "The access token expired"}
                    }));
                })
                .await;

            let err = client(&server)
                .current_user("revoked".into())
                .await
                .unwrap_err();

            assert!(matches!(err, SpotifyError::Unauthorized));
            assert!(err.is_rejection());
        }

        #[tokio::test]
        async fn other_profile_failures_are_transient() {
            for code in [403_u16, 429, 503] {
                let server = MockServer::start_async().await;
                server
                    .mock_async(|when, then| {
                        when.method(GET).path("/v1/me");
                        then.status(code).body("try later");
                    })
                    .await;

                let err = client(&server)
                    .current_user("access-1".into())
                    .await
                    .unwrap_err();

                assert!(
                    matches!(err, SpotifyError::Status { status, .. } if status.as_u16() == code),
                    "status {code} gave {err:?}"
                );
                assert!(!err.is_rejection());
            }
        }

        #[tokio::test]
        async fn slow_response_hits_the_request_timeout() {
            let server = MockServer::start_async().await;
            server
                .mock_async(|when, then| {
                    when.method(GET).path("/v1/me");
                    then.status(200)
                        .delay(Duration::from_secs(2))
                        .json_body(json!({"id": "spotify-user"}));
                })
                .await;

            let err = client_for(&server, Duration::from_millis(200))
                .current_user("access-1".into())
                .await
                .unwrap_err();

            assert!(matches!(err, SpotifyError::Transport { endpoint: PROFILE_ENDPOINT, .. }));
            assert!(!err.is_rejection());
        }
    }

    #[test]
    fn endpoints_are_joined_without_double_slash() {
        let settings = SpotifySettings {
            accounts_base_url: "http://accounts.local/".into(),
            api_base_url: "http://api.local".into(),
            ..SpotifySettings::default()
        };
        let client =
            HttpSpotifyClient::new(&settings, SpotifyCredentials::new("id", "secret", "http://cb"))
                .unwrap();
        assert_eq!(client.token_url.as_ref(), "http://accounts.local/api/token");
        assert_eq!(client.profile_url.as_ref(), "http://api.local/v1/me");
    }
}
