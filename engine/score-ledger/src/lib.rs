//! Score Ledger - enriched weekly scoring rows for the skill factorizer
//!
//! This crate holds the boundary types the factorization core consumes:
//! per-player weekly rows that already carry a computed points value, and
//! the game schedule used to pair teams with their opponents. It loads
//! snapshots from JSON week files and never computes points itself.

pub mod error;
pub mod loader;
pub mod schedule;
pub mod types;

pub use error::{LedgerError, Result};
pub use loader::{LedgerLoader, LedgerSnapshot};
pub use schedule::{Game, GameStatLine, ScheduleData, TeamOpponent};
pub use types::{LedgerRow, SeasonType, WeeklyLedgerData};
