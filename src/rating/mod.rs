//! Rating calculations for reported match results
//!
//! This module defines the rating engine interface and the Elo
//! implementation backed by the skillratings crate.

pub mod calculator;
pub mod elo;

// Re-export commonly used types
pub use calculator::{RatingEngine, RatingUpdate};
pub use elo::EloRatingEngine;
