use serde::Serialize;
use utoipa::ToSchema;

/// Overall service health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    /// Account store installed.
    Ok,
    /// No usable account store; Spotify link operations are refused.
    Degraded,
}

/// Health payload returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Overall status.
    pub status: HealthStatus,
    /// Result of the last storage ping done for this request.
    pub storage_reachable: bool,
}

impl HealthResponse {
    /// Build the payload from the degraded flag and the storage ping result.
    pub fn new(degraded: bool, storage_reachable: bool) -> Self {
        Self {
            status: if degraded {
                HealthStatus::Degraded
            } else {
                HealthStatus::Ok
            },
            storage_reachable,
        }
    }
}
