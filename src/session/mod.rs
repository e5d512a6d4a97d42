//! Session scheduling for the club's tables
//!
//! This module holds the waiting queue and the scheduler state machine that
//! seats players, processes results and refills tables.

pub mod queue;
pub mod scheduler;

// Re-export commonly used types
pub use queue::WaitingQueue;
pub use scheduler::{RecordOutcome, SessionScheduler, MIN_SESSION_PLAYERS};
