use axum::Router;

use crate::state::SharedState;

/// Swagger UI and OpenAPI JSON.
pub mod docs;
/// Health check route.
pub mod health;
/// Spotify link routes.
pub mod spotify;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router().merge(spotify::router());

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}
