//! Metrics collection using Prometheus
//!
//! Session, table and result counters for the table-matcher service.

use anyhow::Result;
use prometheus::{
    Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
};
use std::sync::Arc;

/// How a recorded result related to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultOutcome {
    /// The pair was seated and their table was freed
    Completed,
    /// A session was running but the pair had no table
    Unmatched,
    /// No session was running; only the roster changed
    Offline,
}

impl ResultOutcome {
    fn as_label(self) -> &'static str {
        match self {
            ResultOutcome::Completed => "completed",
            ResultOutcome::Unmatched => "unmatched",
            ResultOutcome::Offline => "offline",
        }
    }
}

/// Session lifecycle metrics
#[derive(Clone)]
pub struct SessionMetrics {
    /// Total sessions started (restarts included)
    pub sessions_started_total: IntCounter,

    /// Total matches seated by the table fill
    pub matches_formed_total: IntCounter,

    /// Players currently waiting for a table
    pub players_waiting: IntGauge,

    /// Matches currently being played
    pub active_matches: IntGauge,
}

/// Result and rating metrics
#[derive(Clone)]
pub struct ResultMetrics {
    /// Results recorded, by outcome
    pub results_recorded_total: IntCounterVec,

    /// Unrounded rating points moved per result
    pub rating_delta: Histogram,
}

/// Roster persistence metrics
#[derive(Clone)]
pub struct StorageMetrics {
    /// Failed roster reads or writes
    pub storage_errors_total: IntCounter,
}

/// Main metrics collector for the service
#[derive(Clone)]
pub struct MetricsCollector {
    registry: Arc<Registry>,
    session_metrics: SessionMetrics,
    result_metrics: ResultMetrics,
    storage_metrics: StorageMetrics,
}

impl MetricsCollector {
    /// Create a new metrics collector with its own registry
    pub fn new() -> Result<Self> {
        Self::with_registry(Arc::new(Registry::new()))
    }

    /// Create a new metrics collector with custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let session_metrics = SessionMetrics::new(&registry)?;
        let result_metrics = ResultMetrics::new(&registry)?;
        let storage_metrics = StorageMetrics::new(&registry)?;

        Ok(Self {
            registry,
            session_metrics,
            result_metrics,
            storage_metrics,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    pub fn session(&self) -> &SessionMetrics {
        &self.session_metrics
    }

    pub fn results(&self) -> &ResultMetrics {
        &self.result_metrics
    }

    pub fn storage(&self) -> &StorageMetrics {
        &self.storage_metrics
    }

    /// Record a session start and the matches it seated
    pub fn record_session_started(&self, matches_formed: usize) {
        self.session_metrics.sessions_started_total.inc();
        self.record_matches_formed(matches_formed);
    }

    /// Record matches seated by a table fill
    pub fn record_matches_formed(&self, count: usize) {
        self.session_metrics
            .matches_formed_total
            .inc_by(count as u64);
    }

    /// Record a processed result
    pub fn record_result(&self, outcome: ResultOutcome, delta: f64) {
        self.result_metrics
            .results_recorded_total
            .with_label_values(&[outcome.as_label()])
            .inc();
        self.result_metrics.rating_delta.observe(delta);
    }

    pub fn record_storage_error(&self) {
        self.storage_metrics.storage_errors_total.inc();
    }

    /// Set the current queue and table gauges
    pub fn update_session_gauges(&self, players_waiting: usize, active_matches: usize) {
        self.session_metrics
            .players_waiting
            .set(players_waiting as i64);
        self.session_metrics
            .active_matches
            .set(active_matches as i64);
    }
}

impl SessionMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let sessions_started_total = IntCounter::new(
            "table_matcher_sessions_started_total",
            "Total sessions started",
        )?;
        registry.register(Box::new(sessions_started_total.clone()))?;

        let matches_formed_total = IntCounter::new(
            "table_matcher_matches_formed_total",
            "Total matches seated at a table",
        )?;
        registry.register(Box::new(matches_formed_total.clone()))?;

        let players_waiting = IntGauge::new(
            "table_matcher_players_waiting",
            "Players currently waiting for a table",
        )?;
        registry.register(Box::new(players_waiting.clone()))?;

        let active_matches = IntGauge::new(
            "table_matcher_active_matches",
            "Matches currently being played",
        )?;
        registry.register(Box::new(active_matches.clone()))?;

        Ok(Self {
            sessions_started_total,
            matches_formed_total,
            players_waiting,
            active_matches,
        })
    }
}

impl ResultMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let results_recorded_total = IntCounterVec::new(
            Opts::new(
                "table_matcher_results_recorded_total",
                "Total match results recorded",
            ),
            &["outcome"],
        )?;
        registry.register(Box::new(results_recorded_total.clone()))?;

        let rating_delta = Histogram::with_opts(
            HistogramOpts::new(
                "table_matcher_rating_delta",
                "Rating points moved per recorded result",
            )
            .buckets(vec![2.0, 4.0, 8.0, 12.0, 16.0, 20.0, 24.0, 32.0, 48.0]),
        )?;
        registry.register(Box::new(rating_delta.clone()))?;

        Ok(Self {
            results_recorded_total,
            rating_delta,
        })
    }
}

impl StorageMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let storage_errors_total = IntCounter::new(
            "table_matcher_storage_errors_total",
            "Total failed roster reads or writes",
        )?;
        registry.register(Box::new(storage_errors_total.clone()))?;

        Ok(Self {
            storage_errors_total,
        })
    }
}
