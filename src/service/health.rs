//! Service health reporting
//!
//! The roster file is the only external dependency, so health boils down to
//! whether it can still be read.

use crate::service::app::TableMatcherService;
use serde::{Deserialize, Serialize};
use tracing::error;

/// Health check status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "healthy"),
            HealthStatus::Unhealthy => write!(f, "unhealthy"),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheck {
    pub status: HealthStatus,
    pub service: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub stats: ServiceStats,
    /// Set when the roster could not be read
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Session figures included with every health report
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStats {
    pub session_active: bool,
    pub roster_size: usize,
    pub players_waiting: usize,
    pub active_matches: usize,
}

impl HealthCheck {
    pub async fn check(service: &TableMatcherService) -> Self {
        let snapshot = service.session_state().await;
        let mut stats = ServiceStats {
            session_active: snapshot.is_active,
            players_waiting: snapshot.waiting_players.len(),
            active_matches: snapshot.active_matches.len(),
            ..ServiceStats::default()
        };

        let (status, message) = match service.roster_size().await {
            Ok(size) => {
                stats.roster_size = size;
                (HealthStatus::Healthy, None)
            }
            Err(e) => {
                error!("Health check could not read roster: {}", e);
                (HealthStatus::Unhealthy, Some(e.to_string()))
            }
        };

        Self {
            status,
            service: service.name().to_string(),
            version: crate::VERSION.to_string(),
            timestamp: chrono::Utc::now(),
            stats,
            message,
        }
    }
}
