//! Roster storage interface and the in-memory implementation
//!
//! The roster is the durable list of players. The scheduler never depends on
//! how it is persisted; it reads the whole roster, mutates records, and writes
//! the whole roster back.

use crate::error::TableMatcherError;
use crate::types::{Player, PlayerId};
use std::sync::RwLock;

/// Trait for roster storage operations
#[cfg_attr(test, mockall::automock)]
pub trait RosterStore: Send + Sync {
    /// Read every valid player record, in stored order
    fn list_all(&self) -> crate::error::Result<Vec<Player>>;

    /// Write back the complete roster.
    ///
    /// The given slice becomes the full stored roster; records not present in
    /// it are dropped. There are no partial updates.
    fn upsert_all(&self, players: &[Player]) -> crate::error::Result<()>;

    /// Look up a single player by id
    fn find_by_id(&self, player_id: &str) -> crate::error::Result<Option<Player>> {
        Ok(find_player(&self.list_all()?, player_id).cloned())
    }
}

/// Next free player id: highest numeric id plus one, or `"1"` for an empty
/// roster. Ids that do not parse as integers are ignored.
pub fn next_player_id(players: &[Player]) -> PlayerId {
    players
        .iter()
        .filter_map(|p| p.id.parse::<u64>().ok())
        .max()
        .map_or(1, |max| max + 1)
        .to_string()
}

/// Find a player in an already loaded roster
pub fn find_player<'a>(players: &'a [Player], player_id: &str) -> Option<&'a Player> {
    players.iter().find(|p| p.id == player_id)
}

/// Mutable lookup in an already loaded roster
pub fn find_player_mut<'a>(players: &'a mut [Player], player_id: &str) -> Option<&'a mut Player> {
    players.iter_mut().find(|p| p.id == player_id)
}

/// In-memory roster storage implementation
#[derive(Debug, Default)]
pub struct InMemoryRosterStore {
    players: RwLock<Vec<Player>>,
}

impl InMemoryRosterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with the given players
    pub fn with_players(players: Vec<Player>) -> Self {
        Self {
            players: RwLock::new(players),
        }
    }
}

impl RosterStore for InMemoryRosterStore {
    fn list_all(&self) -> crate::error::Result<Vec<Player>> {
        let players = self
            .players
            .read()
            .map_err(|_| TableMatcherError::StorageError {
                message: "Failed to acquire roster read lock".to_string(),
            })?;

        Ok(players.clone())
    }

    fn upsert_all(&self, players: &[Player]) -> crate::error::Result<()> {
        let mut stored = self
            .players
            .write()
            .map_err(|_| TableMatcherError::StorageError {
                message: "Failed to acquire roster write lock".to_string(),
            })?;

        *stored = players.to_vec();
        Ok(())
    }
}
