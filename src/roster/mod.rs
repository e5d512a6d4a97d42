//! Player roster persistence
//!
//! The roster is the source of truth for player identity, rating, record and
//! active flag. This module provides the storage interface consumed by the
//! session scheduler and its CSV and in-memory implementations.

pub mod csv_store;
pub mod store;

// Re-export commonly used types
pub use csv_store::CsvRosterStore;
pub use store::{find_player, find_player_mut, next_player_id, InMemoryRosterStore, RosterStore};
