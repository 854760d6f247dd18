use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Ping the account store and report the degraded flag alongside the result.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let storage_reachable = match state.account_store().await {
        Some(store) => match store.health_check().await {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "storage health check failed");
                false
            }
        },
        None => {
            warn!("storage unavailable (degraded mode)");
            false
        }
    };

    HealthResponse::new(state.is_degraded(), storage_reachable)
}
