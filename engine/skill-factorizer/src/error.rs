//! Error types for skill factorization

use thiserror::Error;

/// Result type alias for factorization operations
pub type Result<T> = std::result::Result<T, SkillError>;

/// Errors that can occur while fitting, predicting or validating
#[derive(Error, Debug)]
pub enum SkillError {
    /// No records for a queried position within the requested window
    #[error("No records for position {position}")]
    EmptyPositionGroup { position: String },

    /// Actual and predicted player IDs did not overlap
    #[error("Validation join produced zero rows")]
    EmptyValidationSet,

    /// The training window selected no ledger rows
    #[error("No ledger rows for season {season_year} weeks 1..={cutoff_week}")]
    EmptyTrainingWindow { season_year: i32, cutoff_week: u32 },

    /// Training window parameters are unusable
    #[error("Invalid training window: {0}")]
    InvalidWindow(String),

    /// Factorizer input contained a negative cell
    #[error("Matrix entry ({row}, {col}) is negative: {value}")]
    NegativeEntry { row: usize, col: usize, value: f64 },

    /// A matrix cell was addressed outside the matrix shape
    #[error("Matrix entry ({row}, {col}) is outside shape {rows}x{cols}")]
    IndexOutOfBounds { row: usize, col: usize, rows: usize, cols: usize },

    /// A player's records carried more than one position label
    #[error("Player {player_id} appears under both {first} and {second}")]
    PlayerInMultiplePositions { player_id: String, first: String, second: String },

    /// The same defense/position pair was supplied twice
    #[error("Defense {opponent} against {position} appears more than once")]
    DuplicateDefense { opponent: String, position: String },

    /// Invalid configuration values
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors while reading configuration
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed TOML configuration
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

impl SkillError {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new empty position group error
    pub fn empty_position(position: impl Into<String>) -> Self {
        Self::EmptyPositionGroup { position: position.into() }
    }

    /// Create a new invalid window error
    pub fn invalid_window(msg: impl Into<String>) -> Self {
        Self::InvalidWindow(msg.into())
    }
}
