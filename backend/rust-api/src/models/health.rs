use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyStatus {
    Connected,
    Error,
}

impl DependencyStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DependencyStatus::Connected => "connected",
            DependencyStatus::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Healthy,
    Degraded,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceStatuses {
    pub database: DependencyStatus,
    pub redis: DependencyStatus,
}

/// Body of `GET /health`. Failures are reported in-band, never as an HTTP error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: OverallStatus,
    pub version: String,
    pub timestamp: String,
    pub environment: String,
    pub services: ServiceStatuses,
    /// Whole seconds since the reporter was created
    pub uptime: u64,
    pub response_time: u64,
}
