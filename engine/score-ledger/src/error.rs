//! Error types for the score ledger

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors that can occur while loading or assembling ledger data
#[derive(Error, Debug)]
pub enum LedgerError {
    /// I/O errors while reading or writing snapshot files
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON in a snapshot or schedule file
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A requested week file does not exist
    #[error("No ledger data for season {season_year} week {week} at {path:?}")]
    MissingWeek { season_year: i32, week: u32, path: PathBuf },

    /// A week file's header does not match the season segment and week it was loaded for
    #[error("Ledger file {path:?} holds {found}, expected {expected}")]
    HeaderMismatch { path: PathBuf, expected: String, found: String },

    /// A stat line references a game that is not in the schedule
    #[error("Game {gsis_id} not found in schedule")]
    UnknownGame { gsis_id: String },

    /// A stat line's team did not play in the game it references
    #[error("Team {team} did not play in game {gsis_id}")]
    UnknownTeam { team: String, gsis_id: String },
}

impl LedgerError {
    /// Create a new unknown team error
    pub fn unknown_team(team: impl Into<String>, gsis_id: impl Into<String>) -> Self {
        Self::UnknownTeam { team: team.into(), gsis_id: gsis_id.into() }
    }
}
