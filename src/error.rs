//! Error types for the table matcher
//!
//! Every failure the service can report is a variant of [`TableMatcherError`].
//! Functions return the crate-wide [`Result`] alias (anyhow) and raise these
//! variants with `.into()`, so callers that care about the kind can recover it
//! with `downcast_ref`.

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific scheduling scenarios
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableMatcherError {
    #[error("Need at least 2 active players, found {found}")]
    InsufficientPlayers { found: usize },

    #[error("Player not found: {player_id}")]
    PlayerNotFound { player_id: String },

    #[error("No active match between {winner_id} and {loser_id}")]
    MatchNotFound { winner_id: String, loser_id: String },

    #[error("Player {player_id} is seated in an active match")]
    PlayerInMatch { player_id: String },

    #[error("No session is active")]
    SessionInactive,

    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },

    #[error("Roster storage failed: {message}")]
    StorageError { message: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },
}

impl TableMatcherError {
    /// Recover the domain error from an anyhow chain, if there is one
    pub fn find(error: &anyhow::Error) -> Option<&TableMatcherError> {
        error.chain().find_map(|cause| cause.downcast_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_find_direct_error() {
        let err: anyhow::Error = TableMatcherError::SessionInactive.into();
        assert_eq!(
            TableMatcherError::find(&err),
            Some(&TableMatcherError::SessionInactive)
        );
    }

    #[test]
    fn test_find_through_context() {
        let err = Err::<(), _>(TableMatcherError::StorageError {
            message: "disk full".to_string(),
        })
        .context("writing roster")
        .unwrap_err();

        assert!(matches!(
            TableMatcherError::find(&err),
            Some(TableMatcherError::StorageError { .. })
        ));
    }

    #[test]
    fn test_find_foreign_error() {
        let err = anyhow::anyhow!("something else");
        assert!(TableMatcherError::find(&err).is_none());
    }
}
