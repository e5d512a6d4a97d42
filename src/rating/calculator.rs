//! Rating engine trait and result types
//!
//! The scheduler only needs one question answered: given the two current
//! ratings and the reported score, what are the new ratings. Implementations
//! are pure; they never touch the roster or the session.

use crate::types::Rating;
use serde::{Deserialize, Serialize};

/// Outcome of a single rating computation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingUpdate {
    pub new_winner_rating: Rating,
    pub new_loser_rating: Rating,
    /// Unrounded points moved from loser to winner
    pub delta: f64,
    /// K-factor actually applied (after any shutout multiplier)
    pub k_factor: f64,
}

impl RatingUpdate {
    /// Whether the K-factor was amplified for this result
    pub fn is_amplified(&self, base_k: f64) -> bool {
        self.k_factor > base_k
    }
}

/// Trait for computing rating changes after a reported result
pub trait RatingEngine: Send + Sync {
    /// Compute updated ratings for a finished match.
    ///
    /// Inputs are assumed valid: scores are non-negative and the two players
    /// are distinct.
    fn compute_update(
        &self,
        winner_rating: Rating,
        loser_rating: Rating,
        winner_score: u32,
        loser_score: u32,
    ) -> RatingUpdate;

    /// Rating assigned to newly added players
    fn initial_rating(&self) -> Rating;

    /// Base K-factor before any result-dependent multiplier
    fn base_k_factor(&self) -> f64;
}
