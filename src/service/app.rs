//! Table matcher service: the single owner of session state
//!
//! Every operation takes the scheduler lock for its whole duration, roster
//! read and write included, so a result and the refill that follows it are
//! applied as one step.

use crate::config::{AppConfig, SessionConfig};
use crate::error::{Result, TableMatcherError};
use crate::metrics::{MetricsCollector, ResultOutcome};
use crate::rating::{EloRatingEngine, RatingEngine};
use crate::roster::{find_player_mut, next_player_id, CsvRosterStore, RosterStore};
use crate::session::SessionScheduler;
use crate::types::{MatchResult, Player, SessionSnapshot};
use anyhow::Context;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

/// Scheduler, roster and rating engine wired together
pub struct TableMatcherService {
    name: String,
    session_config: SessionConfig,
    roster: Arc<dyn RosterStore>,
    rating_engine: Arc<dyn RatingEngine>,
    scheduler: Mutex<SessionScheduler>,
    metrics: Arc<MetricsCollector>,
}

impl TableMatcherService {
    pub fn new(
        name: impl Into<String>,
        session_config: SessionConfig,
        roster: Arc<dyn RosterStore>,
        rating_engine: Arc<dyn RatingEngine>,
        metrics: Arc<MetricsCollector>,
    ) -> Self {
        Self {
            name: name.into(),
            session_config,
            roster,
            scheduler: Mutex::new(SessionScheduler::new(rating_engine.clone())),
            rating_engine,
            metrics,
        }
    }

    /// Build the production service: CSV roster, Elo engine, fresh metrics
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let roster = CsvRosterStore::new(&config.roster.csv_path);
        roster.ensure_exists()?;
        info!("Roster file: {}", roster.path().display());

        Ok(Self::new(
            config.service.name.clone(),
            config.session.clone(),
            Arc::new(roster),
            Arc::new(EloRatingEngine::new(config.rating.clone())),
            Arc::new(MetricsCollector::new()?),
        ))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metrics(&self) -> Arc<MetricsCollector> {
        self.metrics.clone()
    }

    /// Roster file I/O runs on the blocking pool so the runtime keeps serving
    async fn load_roster(&self) -> Result<Vec<Player>> {
        let roster = self.roster.clone();
        tokio::task::spawn_blocking(move || roster.list_all())
            .await
            .context("Roster read task failed")
            .and_then(|loaded| loaded)
            .inspect_err(|e| {
                self.metrics.record_storage_error();
                error!("Roster read failed: {}", e);
            })
    }

    async fn persist_roster(&self, players: &[Player]) -> Result<()> {
        let roster = self.roster.clone();
        let players = players.to_vec();
        tokio::task::spawn_blocking(move || roster.upsert_all(&players))
            .await
            .context("Roster write task failed")
            .and_then(|written| written)
            .inspect_err(|e| {
                self.metrics.record_storage_error();
                error!("Roster write failed: {}", e);
            })
    }

    fn refresh_gauges(&self, scheduler: &SessionScheduler) {
        self.metrics.update_session_gauges(
            scheduler.waiting_ids().len(),
            scheduler.active_matches().len(),
        );
    }

    /// Current session snapshot
    pub async fn session_state(&self) -> SessionSnapshot {
        self.scheduler.lock().await.snapshot()
    }

    /// Start (or restart) a session with every active roster player
    pub async fn start_session(&self, table_count: Option<usize>) -> Result<SessionSnapshot> {
        let tables = table_count.unwrap_or(self.session_config.default_table_count);
        let mut scheduler = self.scheduler.lock().await;

        let players = self.load_roster().await?;
        let formed = scheduler.start_session(tables, players).inspect_err(|e| {
            warn!("Session start rejected: {}", e);
        })?;

        self.metrics.record_session_started(formed.len());
        self.refresh_gauges(&scheduler);
        Ok(scheduler.snapshot())
    }

    /// End the session. Safe to call when none is running.
    pub async fn end_session(&self) {
        let mut scheduler = self.scheduler.lock().await;
        scheduler.end_session();
        self.refresh_gauges(&scheduler);
    }

    /// Apply a result to the roster and the session, then refill tables.
    ///
    /// When a session is running but the pair had no table, ratings are still
    /// updated and persisted before `MatchNotFound` is returned. A failed
    /// roster write leaves the in-memory session updated; the write can be
    /// retried through the roster.
    pub async fn record_result(&self, result: MatchResult) -> Result<SessionSnapshot> {
        let mut scheduler = self.scheduler.lock().await;

        let mut players = self.load_roster().await?;
        let outcome = scheduler.record_result(&mut players, &result)?;

        self.metrics.record_matches_formed(outcome.new_matches.len());
        self.refresh_gauges(&scheduler);
        self.persist_roster(&players).await?;

        let kind = if outcome.match_missing() {
            ResultOutcome::Unmatched
        } else if outcome.session_active {
            ResultOutcome::Completed
        } else {
            ResultOutcome::Offline
        };
        self.metrics.record_result(kind, outcome.update.delta);

        if outcome.match_missing() {
            warn!(
                "No active match between {} and {}; ratings updated only",
                result.winner_id, result.loser_id
            );
            return Err(TableMatcherError::MatchNotFound {
                winner_id: result.winner_id,
                loser_id: result.loser_id,
            }
            .into());
        }

        Ok(scheduler.snapshot())
    }

    /// Every valid roster record
    pub async fn list_players(&self) -> Result<Vec<Player>> {
        let _scheduler = self.scheduler.lock().await;
        self.load_roster().await
    }

    /// Add a new player to the roster; joins the queue if a session is live
    pub async fn add_player(&self, name: &str) -> Result<Player> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TableMatcherError::InvalidRequest {
                reason: "Player name is required".to_string(),
            }
            .into());
        }

        let mut scheduler = self.scheduler.lock().await;
        let mut players = self.load_roster().await?;

        let player = Player::new(
            next_player_id(&players),
            name,
            self.rating_engine.initial_rating(),
        );
        players.push(player.clone());
        self.persist_roster(&players).await?;
        info!("Added player {} ({})", player.id, player.name);

        if scheduler.is_active() {
            scheduler.reconcile(&players);
            let formed = scheduler.admit_player(player.clone())?;
            self.metrics.record_matches_formed(formed.len());
            self.refresh_gauges(&scheduler);
        }

        Ok(player)
    }

    /// Remove a player from the roster and from a live session.
    ///
    /// A player seated in an active match cannot be deleted.
    pub async fn delete_player(&self, player_id: &str) -> Result<()> {
        let mut scheduler = self.scheduler.lock().await;
        let mut players = self.load_roster().await?;

        let Some(index) = players.iter().position(|p| p.id == player_id) else {
            return Err(TableMatcherError::PlayerNotFound {
                player_id: player_id.to_string(),
            }
            .into());
        };
        if scheduler.is_seated(player_id) {
            return Err(TableMatcherError::PlayerInMatch {
                player_id: player_id.to_string(),
            }
            .into());
        }

        let removed = players.remove(index);
        self.persist_roster(&players).await?;
        info!("Deleted player {} ({})", removed.id, removed.name);

        if scheduler.is_active() {
            scheduler.remove_player(player_id)?;
            self.refresh_gauges(&scheduler);
        }
        Ok(())
    }

    /// Flip a player's active flag.
    ///
    /// In a live session a deactivated player leaves the queue and an
    /// activated one joins it. Deactivating a seated player is refused.
    pub async fn toggle_player(&self, player_id: &str) -> Result<Player> {
        let mut scheduler = self.scheduler.lock().await;
        let mut players = self.load_roster().await?;

        let Some(player) = find_player_mut(&mut players, player_id) else {
            return Err(TableMatcherError::PlayerNotFound {
                player_id: player_id.to_string(),
            }
            .into());
        };
        if player.active && scheduler.is_seated(player_id) {
            return Err(TableMatcherError::PlayerInMatch {
                player_id: player_id.to_string(),
            }
            .into());
        }

        player.active = !player.active;
        let toggled = player.clone();
        self.persist_roster(&players).await?;
        info!(
            "Player {} is now {}",
            toggled.id,
            if toggled.active { "active" } else { "inactive" }
        );

        if scheduler.is_active() {
            if toggled.active {
                scheduler.reconcile(&players);
                let formed = scheduler.admit_player(toggled.clone())?;
                self.metrics.record_matches_formed(formed.len());
            } else {
                scheduler.remove_player(player_id)?;
            }
            self.refresh_gauges(&scheduler);
        }

        Ok(toggled)
    }

    /// Roster size, for health reporting
    pub async fn roster_size(&self) -> Result<usize> {
        Ok(self.list_players().await?.len())
    }
}
