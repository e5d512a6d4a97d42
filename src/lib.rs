//! Table Matcher - round-robin table scheduler for club play sessions
//!
//! This crate keeps a CSV roster of players with Elo ratings, queues the
//! active ones by rating, seats them at a fixed number of tables and updates
//! ratings from reported results. An Axum HTTP API exposes it all.

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod rating;
pub mod roster;
pub mod service;
pub mod session;
pub mod types;

// Re-export commonly used types and traits
pub use error::{Result, TableMatcherError};
pub use types::*;

// Re-export key components
pub use roster::{CsvRosterStore, InMemoryRosterStore, RosterStore};
pub use service::TableMatcherService;
pub use session::SessionScheduler;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
