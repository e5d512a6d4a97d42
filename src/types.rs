//! Common types used throughout the table matcher

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Unique identifier for players (decimal string assigned by the roster)
pub type PlayerId = String;

/// Integer Elo-style rating
pub type Rating = i64;

/// A roster entry.
///
/// Field names on the wire follow the persisted roster layout
/// (`id, name, elo, wins, losses, is_playing`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    #[serde(rename = "elo")]
    pub rating: Rating,
    pub wins: u32,
    pub losses: u32,
    #[serde(rename = "is_playing")]
    pub active: bool,
}

impl Player {
    /// Create a fresh, active player with no games played
    pub fn new(id: impl Into<PlayerId>, name: impl Into<String>, rating: Rating) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            rating,
            wins: 0,
            losses: 0,
            active: true,
        }
    }
}

/// Unordered pair of player ids identifying a table assignment.
///
/// The two ids are stored in canonical order so `(a, b)` and `(b, a)` compare
/// equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatchKey(PlayerId, PlayerId);

impl MatchKey {
    pub fn new(a: &str, b: &str) -> Self {
        if a <= b {
            Self(a.to_string(), b.to_string())
        } else {
            Self(b.to_string(), a.to_string())
        }
    }

    pub fn contains(&self, player_id: &str) -> bool {
        self.0 == player_id || self.1 == player_id
    }
}

/// Two players currently seated at a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: String,
    pub player1_id: PlayerId,
    pub player2_id: PlayerId,
}

impl Match {
    /// Seat two players; the display id keeps their queue order
    pub fn new(player1_id: PlayerId, player2_id: PlayerId) -> Self {
        Self {
            id: format!("match-{}-{}", player1_id, player2_id),
            player1_id,
            player2_id,
        }
    }

    pub fn key(&self) -> MatchKey {
        MatchKey::new(&self.player1_id, &self.player2_id)
    }

    pub fn involves(&self, player_id: &str) -> bool {
        self.player1_id == player_id || self.player2_id == player_id
    }
}

/// A match with both seats resolved against the session player cache
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchView {
    pub id: String,
    pub player1_id: PlayerId,
    pub player2_id: PlayerId,
    pub player1: Option<Player>,
    pub player2: Option<Player>,
}

/// Read-only projection of the session for external reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub is_active: bool,
    pub table_capacity: usize,
    pub started_at: Option<DateTime<Utc>>,
    pub active_matches: Vec<MatchView>,
    pub waiting_players: Vec<Player>,
}

impl SessionSnapshot {
    /// Snapshot of a session that is not running
    pub fn inactive() -> Self {
        Self {
            is_active: false,
            table_capacity: 0,
            started_at: None,
            active_matches: Vec::new(),
            waiting_players: Vec::new(),
        }
    }
}

/// Read a player id sent either as a string or as a JSON integer
pub fn deserialize_player_id<'de, D>(deserializer: D) -> Result<PlayerId, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Signed(i64),
        Unsigned(u64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(id) => id.trim().to_string(),
        RawId::Signed(id) => id.to_string(),
        RawId::Unsigned(id) => id.to_string(),
    })
}

/// A reported result between two players
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    #[serde(deserialize_with = "deserialize_player_id")]
    pub winner_id: PlayerId,
    #[serde(deserialize_with = "deserialize_player_id")]
    pub loser_id: PlayerId,
    pub winner_score: u32,
    pub loser_score: u32,
}
