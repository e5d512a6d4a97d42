//! Shared roster builders and temp-file helpers for integration tests

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use table_matcher::config::{RatingConfig, SessionConfig};
use table_matcher::metrics::MetricsCollector;
use table_matcher::rating::EloRatingEngine;
use table_matcher::roster::{CsvRosterStore, InMemoryRosterStore, RosterStore};
use table_matcher::types::{MatchResult, Player};
use table_matcher::TableMatcherService;

/// Roster file in the system temp dir, removed on drop
pub struct TempRoster {
    path: PathBuf,
}

impl TempRoster {
    pub fn new() -> Self {
        Self {
            path: std::env::temp_dir()
                .join(format!("table-matcher-it-{}.csv", uuid::Uuid::new_v4())),
        }
    }

    /// Temp roster pre-filled with the given raw CSV text
    pub fn with_contents(contents: &str) -> Self {
        let roster = Self::new();
        std::fs::write(&roster.path, contents).expect("Failed to write temp roster");
        roster
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn store(&self) -> CsvRosterStore {
        CsvRosterStore::new(&self.path)
    }

    pub fn read(&self) -> String {
        std::fs::read_to_string(&self.path).expect("Failed to read temp roster")
    }
}

impl Drop for TempRoster {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Active player with a clean record
pub fn player(id: &str, rating: i64) -> Player {
    Player::new(id, format!("Player {}", id), rating)
}

/// `count` active players with ids "1".."count", all at 1000
pub fn even_roster(count: usize) -> Vec<Player> {
    (1..=count).map(|i| player(&i.to_string(), 1000)).collect()
}

/// Players with the given ratings, ids assigned in order from "1"
pub fn rated_roster(ratings: &[i64]) -> Vec<Player> {
    ratings
        .iter()
        .enumerate()
        .map(|(i, rating)| player(&(i + 1).to_string(), *rating))
        .collect()
}

pub fn result(winner: &str, loser: &str, winner_score: u32, loser_score: u32) -> MatchResult {
    MatchResult {
        winner_id: winner.to_string(),
        loser_id: loser.to_string(),
        winner_score,
        loser_score,
    }
}

/// Service over an arbitrary store with default rating and session settings
pub fn service_over(store: Arc<dyn RosterStore>) -> TableMatcherService {
    TableMatcherService::new(
        "table-matcher-test",
        SessionConfig::default(),
        store,
        Arc::new(EloRatingEngine::new(RatingConfig::default())),
        Arc::new(MetricsCollector::new().expect("Failed to create metrics collector")),
    )
}

/// Service over an in-memory roster, returning the store for inspection
pub fn in_memory_service(players: Vec<Player>) -> (TableMatcherService, Arc<InMemoryRosterStore>) {
    let store = Arc::new(InMemoryRosterStore::with_players(players));
    (service_over(store.clone()), store)
}
