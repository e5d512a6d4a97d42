//! Metrics and monitoring for the table-matcher service
//!
//! Prometheus counters and gauges for sessions, tables, results and roster
//! storage. The registry is exported over HTTP by the API's `/metrics` route.

pub mod collector;

pub use collector::{MetricsCollector, ResultMetrics, ResultOutcome, SessionMetrics, StorageMetrics};
