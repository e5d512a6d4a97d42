//! Elo rating engine
//!
//! Wraps the `skillratings` Elo implementation with the club's best-of-three
//! rule: a 2-0 result swings ratings harder than a 2-1.

use crate::config::RatingConfig;
use crate::rating::calculator::{RatingEngine, RatingUpdate};
use crate::types::Rating;
use skillratings::elo::{elo, EloConfig, EloRating};
use skillratings::Outcomes;

/// Score of a best-of-three shutout
const SHUTOUT_WINNER_SCORE: u32 = 2;
const SHUTOUT_LOSER_SCORE: u32 = 0;

/// Elo engine with a shutout-amplified K-factor.
///
/// New ratings are rounded half away from zero (`f64::round`), each side
/// independently, so the pair is not guaranteed to be zero-sum after
/// rounding.
#[derive(Debug, Clone)]
pub struct EloRatingEngine {
    config: RatingConfig,
}

impl EloRatingEngine {
    pub fn new(config: RatingConfig) -> Self {
        Self { config }
    }

    /// K-factor for a given score line
    pub fn k_factor_for(&self, winner_score: u32, loser_score: u32) -> f64 {
        if winner_score == SHUTOUT_WINNER_SCORE && loser_score == SHUTOUT_LOSER_SCORE {
            self.config.k_factor * self.config.shutout_multiplier
        } else {
            self.config.k_factor
        }
    }

    pub fn config(&self) -> &RatingConfig {
        &self.config
    }
}

impl Default for EloRatingEngine {
    fn default() -> Self {
        Self::new(RatingConfig::default())
    }
}

impl RatingEngine for EloRatingEngine {
    fn compute_update(
        &self,
        winner_rating: Rating,
        loser_rating: Rating,
        winner_score: u32,
        loser_score: u32,
    ) -> RatingUpdate {
        let k = self.k_factor_for(winner_score, loser_score);
        let winner = EloRating {
            rating: winner_rating as f64,
        };
        let loser = EloRating {
            rating: loser_rating as f64,
        };

        let (new_winner, new_loser) = elo(&winner, &loser, &Outcomes::WIN, &EloConfig { k });

        RatingUpdate {
            new_winner_rating: new_winner.rating.round() as Rating,
            new_loser_rating: new_loser.rating.round() as Rating,
            delta: new_winner.rating - winner.rating,
            k_factor: k,
        }
    }

    fn initial_rating(&self) -> Rating {
        self.config.starting_rating
    }

    fn base_k_factor(&self) -> f64 {
        self.config.k_factor
    }
}
