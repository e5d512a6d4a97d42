//! Service layer for the table matcher
//!
//! Owns the session scheduler and coordinates it with roster persistence,
//! rating updates and metrics.

pub mod app;
pub mod health;

pub use app::TableMatcherService;
pub use health::{HealthCheck, HealthStatus, ServiceStats};
