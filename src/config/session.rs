//! Session configuration

use serde::{Deserialize, Serialize};

/// Defaults applied when a session is started without explicit parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Tables used when a start request does not name a count
    pub default_table_count: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_table_count: 1,
        }
    }
}
