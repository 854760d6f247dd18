use utoipa::OpenApi;

/// Aggregated OpenAPI specification for Spotiquiz Back.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::spotify::authorize,
        crate::routes::spotify::callback,
        crate::routes::spotify::connection,
        crate::routes::spotify::refresh,
        crate::routes::spotify::disconnect,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::health::HealthStatus,
            crate::dto::spotify::AuthorizeResponse,
            crate::dto::spotify::CallbackRequest,
            crate::dto::spotify::LinkedTokensResponse,
            crate::dto::spotify::AccessTokenResponse,
            crate::dto::spotify::ConnectionStatusResponse,
            crate::dto::spotify::DisconnectResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "spotify", description = "Spotify account link lifecycle"),
    )
)]
pub struct ApiDoc;
