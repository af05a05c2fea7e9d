//! Health check DTOs for API responses.

use std::collections::BTreeMap;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Health check response structure.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "status": "healthy",
    "version": "0.1.0",
    "timestamp": "2024-01-01T12:00:00Z",
    "checks": {
        "storage": {
            "status": "healthy",
            "message": "Reachable",
            "response_time_ms": 5
        }
    }
}))]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    #[schema(value_type = String, format = DateTime)]
    pub timestamp: Timestamp,
    /// Per-component results keyed by component name
    pub checks: BTreeMap<String, ComponentHealth>,
}

/// Health status enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Individual component health information.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ComponentHealth {
    pub status: HealthStatus,
    pub message: Option<String>,
    pub response_time_ms: Option<u64>,
}

impl HealthResponse {
    /// Unhealthy as soon as one component is.
    pub fn from_checks(version: &str, checks: BTreeMap<String, ComponentHealth>) -> Self {
        let status = if checks
            .values()
            .any(|c| c.status == HealthStatus::Unhealthy)
        {
            HealthStatus::Unhealthy
        } else {
            HealthStatus::Healthy
        };

        Self {
            status,
            version: version.to_string(),
            timestamp: Timestamp::now(),
            checks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn component(status: HealthStatus) -> ComponentHealth {
        ComponentHealth {
            status,
            message: None,
            response_time_ms: Some(1),
        }
    }

    #[test]
    fn test_health_status_serialization() {
        assert_eq!(
            serde_json::to_string(&HealthStatus::Healthy).unwrap(),
            "\"healthy\""
        );
    }

    #[test]
    fn test_one_unhealthy_component_fails_the_whole() {
        let mut checks = BTreeMap::new();
        checks.insert("a".to_string(), component(HealthStatus::Healthy));
        assert_eq!(
            HealthResponse::from_checks("0.1.0", checks).status,
            HealthStatus::Healthy
        );

        let mut checks = BTreeMap::new();
        checks.insert("a".to_string(), component(HealthStatus::Healthy));
        checks.insert("b".to_string(), component(HealthStatus::Unhealthy));
        assert_eq!(
            HealthResponse::from_checks("0.1.0", checks).status,
            HealthStatus::Unhealthy
        );
    }
}
