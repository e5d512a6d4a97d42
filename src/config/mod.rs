//! Configuration management for the table matcher
//!
//! This module handles configuration loading from TOML files and environment
//! variables, validation, and default values.

pub mod app;
pub mod rating;
pub mod session;

// Re-export commonly used types
pub use app::{validate_config, AppConfig, RosterSettings, ServiceSettings};
pub use rating::RatingConfig;
pub use session::SessionConfig;
