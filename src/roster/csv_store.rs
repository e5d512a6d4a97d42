//! CSV-backed roster storage
//!
//! File layout: a header row `id,name,elo,wins,losses,is_playing` followed by
//! one row per player. Reading is tolerant: rows whose numeric fields are
//! missing or malformed are skipped with a warning. Writing always rewrites
//! the whole file.

use crate::error::TableMatcherError;
use crate::roster::store::RosterStore;
use crate::types::Player;
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Column order of the persisted roster
pub const CSV_HEADERS: [&str; 6] = ["id", "name", "elo", "wins", "losses", "is_playing"];

const UTF8_BOM: &str = "\u{feff}";
const UTF8_BOM_BYTES: &[u8] = b"\xEF\xBB\xBF";

/// One row as read from disk, before validation
#[derive(Debug, Deserialize)]
struct RawPlayerRecord {
    id: Option<String>,
    name: Option<String>,
    elo: Option<String>,
    wins: Option<String>,
    losses: Option<String>,
    is_playing: Option<String>,
}

fn required<'a>(field: &'a Option<String>, column: &str) -> Result<&'a str, String> {
    match field.as_deref().map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(format!("missing {}", column)),
    }
}

impl RawPlayerRecord {
    fn into_player(self) -> Result<Player, String> {
        let id = required(&self.id, "id")?.to_string();

        let elo = required(&self.elo, "elo")?;
        let rating = elo
            .parse::<f64>()
            .ok()
            .filter(|r| r.is_finite())
            .ok_or_else(|| format!("invalid elo {:?}", elo))?;

        let wins = required(&self.wins, "wins")?;
        let wins = wins
            .parse::<u32>()
            .map_err(|_| format!("invalid wins {:?}", wins))?;

        let losses = required(&self.losses, "losses")?;
        let losses = losses
            .parse::<u32>()
            .map_err(|_| format!("invalid losses {:?}", losses))?;

        let active = self
            .is_playing
            .as_deref()
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Ok(Player {
            id,
            name: self.name.unwrap_or_default().trim().to_string(),
            // Fractional ratings are truncated toward zero
            rating: rating.trunc() as i64,
            wins,
            losses,
            active,
        })
    }
}

/// Roster stored in a CSV file
#[derive(Debug, Clone)]
pub struct CsvRosterStore {
    path: PathBuf,
}

impl CsvRosterStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the file with just a header row if it does not exist yet
    pub fn ensure_exists(&self) -> crate::error::Result<()> {
        if self.path.exists() {
            return Ok(());
        }
        debug!("Creating empty roster at {}", self.path.display());
        self.upsert_all(&[])
    }

    fn storage_error(&self, action: &str, cause: impl std::fmt::Display) -> anyhow::Error {
        TableMatcherError::StorageError {
            message: format!("{} {}: {}", action, self.path.display(), cause),
        }
        .into()
    }

    /// Parse roster contents, skipping malformed rows.
    ///
    /// Works on raw bytes so a row that is not valid UTF-8 is dropped on its
    /// own instead of failing the whole file.
    pub fn parse(contents: impl AsRef<[u8]>) -> Vec<Player> {
        let contents = contents.as_ref();
        let contents = contents.strip_prefix(UTF8_BOM_BYTES).unwrap_or(contents);
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(contents);

        let mut players = Vec::new();
        for (index, row) in reader.deserialize::<RawPlayerRecord>().enumerate() {
            // Header is line 1
            let line = index + 2;
            match row.map_err(|e| e.to_string()).and_then(RawPlayerRecord::into_player) {
                Ok(player) => players.push(player),
                Err(reason) => warn!("Skipping malformed roster row at line {}: {}", line, reason),
            }
        }
        players
    }

    /// Render a full roster, header included
    pub fn render(players: &[Player]) -> crate::error::Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(CSV_HEADERS)?;

        for player in players {
            let rating = player.rating.to_string();
            let wins = player.wins.to_string();
            let losses = player.losses.to_string();
            writer.write_record([
                player.id.as_str(),
                player.name.as_str(),
                rating.as_str(),
                wins.as_str(),
                losses.as_str(),
                if player.active { "True" } else { "False" },
            ])?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Failed to flush roster: {}", e.error()))?;
        Ok(format!("{}{}", UTF8_BOM, String::from_utf8(bytes)?))
    }
}

impl RosterStore for CsvRosterStore {
    fn list_all(&self) -> crate::error::Result<Vec<Player>> {
        let contents = match fs::read(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.storage_error("Failed to read", e)),
        };

        Ok(Self::parse(&contents))
    }

    fn upsert_all(&self, players: &[Player]) -> crate::error::Result<()> {
        let rendered =
            Self::render(players).map_err(|e| self.storage_error("Failed to encode", e))?;

        // Write beside the target, then rename over it
        let tmp_path = self.path.with_extension("csv.tmp");
        fs::write(&tmp_path, rendered).map_err(|e| self.storage_error("Failed to write", e))?;
        fs::rename(&tmp_path, &self.path).map_err(|e| self.storage_error("Failed to replace", e))?;

        debug!("Wrote {} players to {}", players.len(), self.path.display());
        Ok(())
    }
}
