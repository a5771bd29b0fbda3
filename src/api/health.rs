use serde::Deserialize;

use crate::error::ApiResult;
use crate::gateway::Gateway;
use crate::transport::Transport;

const HEALTH_PATH: &str = "/health";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub service: Option<String>,
}

impl HealthStatus {
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Probe the public health endpoint.
pub async fn check<T: Transport>(gateway: &Gateway<T>) -> ApiResult<HealthStatus> {
    gateway.get(HEALTH_PATH).await
}
