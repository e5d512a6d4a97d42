//! Session scheduler: waiting queue, table assignments and result handling
//!
//! The scheduler is a two-state machine. While inactive it holds nothing and
//! only roster-level rating updates are possible. While active it owns a cache
//! of the session's players, the waiting queue (highest rating first) and the
//! set of matches currently seated, never more than the table capacity.
//!
//! Tables are filled greedily from the front of the queue: the two players at
//! the front are seated together regardless of how far apart their ratings are.

use crate::error::{Result, TableMatcherError};
use crate::rating::{RatingEngine, RatingUpdate};
use crate::roster::{find_player, find_player_mut};
use crate::session::queue::WaitingQueue;
use crate::types::{
    Match, MatchKey, MatchResult, MatchView, Player, PlayerId, Rating, SessionSnapshot,
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Minimum number of active players needed to open a session
pub const MIN_SESSION_PLAYERS: usize = 2;

/// State held while a session is running
#[derive(Debug, Clone)]
struct ActiveSession {
    players: HashMap<PlayerId, Player>,
    waiting: WaitingQueue,
    matches: Vec<Match>,
    table_capacity: usize,
    started_at: DateTime<Utc>,
}

impl ActiveSession {
    fn rating_of(&self, player_id: &str) -> Rating {
        self.players.get(player_id).map_or(0, |p| p.rating)
    }

    fn sort_waiting(&mut self) {
        let players = &self.players;
        self.waiting
            .sort_stable_descending_by(|id| players.get(id).map_or(0, |p| p.rating));
    }

    fn seat_of(&self, player_id: &str) -> Option<&Match> {
        self.matches.iter().find(|m| m.involves(player_id))
    }

    fn fill_tables(&mut self) -> Vec<Match> {
        let mut formed = Vec::new();

        while self.matches.len() < self.table_capacity && self.waiting.len() >= 2 {
            let (Some(player1), Some(player2)) =
                (self.waiting.pop_front(), self.waiting.pop_front())
            else {
                break;
            };

            let seated = Match::new(player1, player2);
            debug!(
                "Seated {} ({}) vs {} ({}) as {}",
                seated.player1_id,
                self.rating_of(&seated.player1_id),
                seated.player2_id,
                self.rating_of(&seated.player2_id),
                seated.id
            );
            self.matches.push(seated.clone());
            formed.push(seated);
        }

        if !formed.is_empty() && !self.waiting.is_empty() {
            debug!("{} players still waiting", self.waiting.len());
        }
        formed
    }
}

/// Scheduler lifecycle state
#[derive(Debug, Clone)]
enum SessionState {
    Inactive,
    Active(ActiveSession),
}

/// What a recorded result changed
#[derive(Debug, Clone)]
pub struct RecordOutcome {
    pub update: RatingUpdate,
    /// Winner's roster record after the update
    pub winner: Player,
    /// Loser's roster record after the update
    pub loser: Player,
    /// The match that was freed, if the pair was seated
    pub completed_match: Option<Match>,
    /// Matches formed by the refill that followed
    pub new_matches: Vec<Match>,
    /// Whether a session was running when the result came in
    pub session_active: bool,
}

impl RecordOutcome {
    /// A live session had no table for this pair
    pub fn match_missing(&self) -> bool {
        self.session_active && self.completed_match.is_none()
    }
}

/// Owns all scheduling state for the single session
pub struct SessionScheduler {
    rating_engine: Arc<dyn RatingEngine>,
    state: SessionState,
}

impl SessionScheduler {
    pub fn new(rating_engine: Arc<dyn RatingEngine>) -> Self {
        Self {
            rating_engine,
            state: SessionState::Inactive,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, SessionState::Active(_))
    }

    fn active(&self) -> Option<&ActiveSession> {
        match &self.state {
            SessionState::Active(session) => Some(session),
            SessionState::Inactive => None,
        }
    }

    fn active_mut(&mut self) -> Result<&mut ActiveSession> {
        match &mut self.state {
            SessionState::Active(session) => Ok(session),
            SessionState::Inactive => Err(TableMatcherError::SessionInactive.into()),
        }
    }

    pub fn table_capacity(&self) -> usize {
        self.active().map_or(0, |s| s.table_capacity)
    }

    /// Ids waiting for a table, front first
    pub fn waiting_ids(&self) -> Vec<PlayerId> {
        self.active()
            .map(|s| s.waiting.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn active_matches(&self) -> &[Match] {
        self.active()
            .map(|s| s.matches.as_slice())
            .unwrap_or_default()
    }

    /// Whether the player belongs to the running session
    pub fn contains_player(&self, player_id: &str) -> bool {
        self.active()
            .is_some_and(|s| s.players.contains_key(player_id))
    }

    /// Whether the player is currently seated at a table
    pub fn is_seated(&self, player_id: &str) -> bool {
        self.active()
            .is_some_and(|s| s.seat_of(player_id).is_some())
    }

    /// Open a session with the active players of the roster.
    ///
    /// Inactive players are ignored. Starting while a session is already
    /// running discards it and starts over.
    pub fn start_session(
        &mut self,
        table_capacity: usize,
        players: impl IntoIterator<Item = Player>,
    ) -> Result<Vec<Match>> {
        if table_capacity == 0 {
            return Err(TableMatcherError::InvalidRequest {
                reason: "Table count must be at least 1".to_string(),
            }
            .into());
        }

        let mut session_players = HashMap::new();
        let mut waiting = WaitingQueue::new();
        for player in players.into_iter().filter(|p| p.active) {
            if !session_players.contains_key(&player.id) {
                waiting.push_back(player.id.clone());
                session_players.insert(player.id.clone(), player);
            }
        }

        if session_players.len() < MIN_SESSION_PLAYERS {
            return Err(TableMatcherError::InsufficientPlayers {
                found: session_players.len(),
            }
            .into());
        }

        if self.is_active() {
            info!("Restarting session; previous session state discarded");
        }

        let mut session = ActiveSession {
            players: session_players,
            waiting,
            matches: Vec::new(),
            table_capacity,
            started_at: Utc::now(),
        };
        session.sort_waiting();
        let formed = session.fill_tables();

        info!(
            "Session started - players: {}, tables: {}, seated: {}, waiting: {}",
            session.players.len(),
            table_capacity,
            session.matches.len(),
            session.waiting.len()
        );

        self.state = SessionState::Active(session);
        Ok(formed)
    }

    /// Discard all session state. Returns whether a session was running.
    pub fn end_session(&mut self) -> bool {
        let was_active = self.is_active();
        self.state = SessionState::Inactive;
        if was_active {
            info!("Session ended");
        }
        was_active
    }

    /// Bring a player into the running session and refill tables.
    ///
    /// A player already in the session has its cached record refreshed
    /// instead of being queued twice.
    pub fn admit_player(&mut self, player: Player) -> Result<Vec<Match>> {
        let session = self.active_mut()?;

        if let Some(cached) = session.players.get_mut(&player.id) {
            debug!("Player {} already in session, refreshing record", player.id);
            *cached = player;
        } else {
            info!(
                "Admitting player {} ({}) into session",
                player.id, player.rating
            );
            session.waiting.push_back(player.id.clone());
            session.players.insert(player.id.clone(), player);
        }

        session.sort_waiting();
        Ok(session.fill_tables())
    }

    /// Take a waiting player out of the session.
    ///
    /// Seated players cannot be removed. Returns whether the player was part
    /// of the session.
    pub fn remove_player(&mut self, player_id: &str) -> Result<bool> {
        let session = self.active_mut()?;

        if session.seat_of(player_id).is_some() {
            return Err(TableMatcherError::PlayerInMatch {
                player_id: player_id.to_string(),
            }
            .into());
        }

        let queued = session.waiting.remove(player_id);
        let cached = session.players.remove(player_id).is_some();
        if cached {
            info!("Removed player {} from session", player_id);
        }
        Ok(queued || cached)
    }

    /// Refresh cached session records from a freshly read roster.
    ///
    /// Used when the roster is the side that changed. Players missing from
    /// the roster keep their cached record.
    pub fn reconcile(&mut self, roster: &[Player]) {
        let Ok(session) = self.active_mut() else {
            return;
        };

        let mut refreshed = 0;
        for (id, cached) in session.players.iter_mut() {
            if let Some(current) = find_player(roster, id) {
                if cached != current {
                    *cached = current.clone();
                    refreshed += 1;
                }
            }
        }

        if refreshed > 0 {
            debug!("Reconciled {} session players with roster", refreshed);
            session.sort_waiting();
        }
    }

    /// Apply a reported result to the roster and, when a session is running,
    /// to the session.
    ///
    /// Both players must exist in the roster, and in the session when one is
    /// running; otherwise nothing is changed. If the pair is not seated the
    /// ratings still move but nobody is requeued.
    pub fn record_result(
        &mut self,
        roster: &mut [Player],
        result: &MatchResult,
    ) -> Result<RecordOutcome> {
        let MatchResult {
            winner_id,
            loser_id,
            winner_score,
            loser_score,
        } = result;

        if winner_id == loser_id {
            return Err(TableMatcherError::InvalidRequest {
                reason: "Winner and loser must be different players".to_string(),
            }
            .into());
        }

        for id in [winner_id, loser_id] {
            let in_roster = find_player(roster, id).is_some();
            let in_session = self
                .active()
                .map_or(true, |s| s.players.contains_key(id));
            if !in_roster || !in_session {
                return Err(TableMatcherError::PlayerNotFound {
                    player_id: id.clone(),
                }
                .into());
            }
        }

        let winner_rating = find_player(roster, winner_id).map_or(0, |p| p.rating);
        let loser_rating = find_player(roster, loser_id).map_or(0, |p| p.rating);
        let update = self.rating_engine.compute_update(
            winner_rating,
            loser_rating,
            *winner_score,
            *loser_score,
        );

        let mut winner = None;
        if let Some(p) = find_player_mut(roster, winner_id) {
            p.rating = update.new_winner_rating;
            p.wins = p.wins.saturating_add(1);
            winner = Some(p.clone());
        }
        let mut loser = None;
        if let Some(p) = find_player_mut(roster, loser_id) {
            p.rating = update.new_loser_rating;
            p.losses = p.losses.saturating_add(1);
            loser = Some(p.clone());
        }
        let (Some(winner), Some(loser)) = (winner, loser) else {
            return Err(TableMatcherError::PlayerNotFound {
                player_id: winner_id.clone(),
            }
            .into());
        };

        info!(
            "Result {} {}-{} {}: {} -> {}, {} -> {} (delta {:.2}, k {})",
            winner_id,
            winner_score,
            loser_score,
            loser_id,
            winner_rating,
            winner.rating,
            loser_rating,
            loser.rating,
            update.delta,
            update.k_factor
        );

        let mut outcome = RecordOutcome {
            update,
            winner,
            loser,
            completed_match: None,
            new_matches: Vec::new(),
            session_active: false,
        };

        let SessionState::Active(session) = &mut self.state else {
            return Ok(outcome);
        };
        outcome.session_active = true;

        for updated in [&outcome.winner, &outcome.loser] {
            if let Some(cached) = session.players.get_mut(&updated.id) {
                cached.rating = updated.rating;
                cached.wins = updated.wins;
                cached.losses = updated.losses;
            }
        }

        let key = MatchKey::new(winner_id, loser_id);
        if let Some(index) = session.matches.iter().position(|m| m.key() == key) {
            let freed = session.matches.remove(index);
            debug!("Table freed by {}", freed.id);
            session.waiting.push_back(winner_id.clone());
            session.waiting.push_back(loser_id.clone());
            outcome.completed_match = Some(freed);
        }

        session.sort_waiting();
        outcome.new_matches = session.fill_tables();
        Ok(outcome)
    }

    /// Read-only projection of the current session
    pub fn snapshot(&self) -> SessionSnapshot {
        let Some(session) = self.active() else {
            return SessionSnapshot::inactive();
        };

        SessionSnapshot {
            is_active: true,
            table_capacity: session.table_capacity,
            started_at: Some(session.started_at),
            active_matches: session
                .matches
                .iter()
                .map(|m| MatchView {
                    id: m.id.clone(),
                    player1_id: m.player1_id.clone(),
                    player2_id: m.player2_id.clone(),
                    player1: session.players.get(&m.player1_id).cloned(),
                    player2: session.players.get(&m.player2_id).cloned(),
                })
                .collect(),
            waiting_players: session
                .waiting
                .iter()
                .filter_map(|id| session.players.get(id).cloned())
                .collect(),
        }
    }
}
