use axum::{
    Extension, Json, Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::spotify::{
        AccessTokenResponse, AuthorizeResponse, CallbackRequest, ConnectionStatusResponse,
        DisconnectResponse, LinkedTokensResponse,
    },
    error::AppError,
    services::{
        authorization, code_exchange, connection_verifier, disconnect as disconnect_service,
        token_refresh,
    },
    state::SharedState,
};

const ACCOUNT_ID_HEADER: &str = "x-account-id";

/// Authenticated account resolved by [`require_account`].
#[derive(Debug, Clone, Copy)]
pub struct AccountId(
    /// Account identifier from the `X-Account-Id` header.
    pub Uuid,
);

/// Spotify link lifecycle endpoints, all scoped to the calling account.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/spotify/authorize", get(authorize))
        .route("/spotify/callback", post(callback))
        .route("/spotify/connection", get(connection))
        .route("/spotify/refresh", post(refresh))
        .route("/spotify/disconnect", post(disconnect))
        .route_layer(middleware::from_fn(require_account))
}

/// Build the Spotify consent URL for the calling account.
#[utoipa::path(
    get,
    path = "/spotify/authorize",
    tag = "spotify",
    params(("X-Account-Id" = Uuid, Header, description = "Authenticated account identifier")),
    responses(
        (status = 200, description = "Consent URL and state", body = AuthorizeResponse),
        (status = 404, description = "Unknown account")
    )
)]
pub async fn authorize(
    State(state): State<SharedState>,
    Extension(AccountId(account_id)): Extension<AccountId>,
) -> Result<Json<AuthorizeResponse>, AppError> {
    Ok(Json(
        authorization::authorization_url(&state, account_id).await?,
    ))
}

/// Exchange the authorization code Spotify redirected back with.
#[utoipa::path(
    post,
    path = "/spotify/callback",
    tag = "spotify",
    params(("X-Account-Id" = Uuid, Header, description = "Authenticated account identifier")),
    request_body = CallbackRequest,
    responses(
        (status = 200, description = "Account linked", body = LinkedTokensResponse),
        (status = 400, description = "Code invalid, expired or already used"),
        (status = 409, description = "Code already being exchanged"),
        (status = 503, description = "Spotify unavailable; link cleared, retry connecting")
    )
)]
pub async fn callback(
    State(state): State<SharedState>,
    Extension(AccountId(account_id)): Extension<AccountId>,
    Json(payload): Json<CallbackRequest>,
) -> Result<Json<LinkedTokensResponse>, AppError> {
    payload.validate()?;
    let tokens =
        code_exchange::exchange_authorization_code(&state, account_id, payload.code).await?;
    Ok(Json(tokens))
}

/// Verify the stored link, refreshing or disconnecting as needed.
#[utoipa::path(
    get,
    path = "/spotify/connection",
    tag = "spotify",
    params(("X-Account-Id" = Uuid, Header, description = "Authenticated account identifier")),
    responses(
        (status = 200, description = "Connection status", body = ConnectionStatusResponse),
        (status = 503, description = "Spotify unavailable; link kept, retry later")
    )
)]
pub async fn connection(
    State(state): State<SharedState>,
    Extension(AccountId(account_id)): Extension<AccountId>,
) -> Result<Json<ConnectionStatusResponse>, AppError> {
    Ok(Json(
        connection_verifier::check_connection(&state, account_id).await?,
    ))
}

/// Mint a new access token from the stored refresh token.
#[utoipa::path(
    post,
    path = "/spotify/refresh",
    tag = "spotify",
    params(("X-Account-Id" = Uuid, Header, description = "Authenticated account identifier")),
    responses(
        (status = 200, description = "New access token", body = AccessTokenResponse),
        (status = 401, description = "Refresh token rejected; link cleared"),
        (status = 409, description = "Account not connected")
    )
)]
pub async fn refresh(
    State(state): State<SharedState>,
    Extension(AccountId(account_id)): Extension<AccountId>,
) -> Result<Json<AccessTokenResponse>, AppError> {
    Ok(Json(token_refresh::refresh_token(&state, account_id).await?))
}

/// Forget the Spotify link of the calling account.
#[utoipa::path(
    post,
    path = "/spotify/disconnect",
    tag = "spotify",
    params(("X-Account-Id" = Uuid, Header, description = "Authenticated account identifier")),
    responses((status = 200, description = "Link cleared", body = DisconnectResponse))
)]
pub async fn disconnect(
    State(state): State<SharedState>,
    Extension(AccountId(account_id)): Extension<AccountId>,
) -> Result<Json<DisconnectResponse>, AppError> {
    Ok(Json(disconnect_service::disconnect(&state, account_id).await?))
}

async fn require_account(mut req: Request<Body>, next: Next) -> Result<Response, AppError> {
    let account_id = req
        .headers()
        .get(ACCOUNT_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| Uuid::parse_str(value.trim()).ok())
        .ok_or_else(|| {
            AppError::Unauthorized("missing or invalid account header `X-Account-Id`".into())
        })?;

    req.extensions_mut().insert(AccountId(account_id));
    Ok(next.run(req).await)
}
