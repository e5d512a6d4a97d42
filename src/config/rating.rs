//! Rating system configuration

use serde::{Deserialize, Serialize};

/// Elo parameters for result processing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingConfig {
    /// Rating assigned to newly added players
    pub starting_rating: i64,
    /// Base K-factor applied to every result
    pub k_factor: f64,
    /// Multiplier on the K-factor for a 2-0 result
    pub shutout_multiplier: f64,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            starting_rating: 1000,
            k_factor: 32.0,
            shutout_multiplier: 1.5,
        }
    }
}
