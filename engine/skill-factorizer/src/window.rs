//! Training window selection over ledger rows

use crate::error::{Result, SkillError};
use crate::models::ScoreRecord;
use score_ledger::{LedgerRow, SeasonType};
use serde::Serialize;
use std::ops::RangeInclusive;

/// Highest cutoff week a window accepts, one past the longest season segment
pub const MAX_CUTOFF_WEEK: u32 = 25;

/// Weeks `1..=cutoff_week` of one season segment
///
/// `cutoff_week` is always in `1..=MAX_CUTOFF_WEEK`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrainingWindow {
    season_year: i32,
    cutoff_week: u32,
    season_type: SeasonType,
}

impl TrainingWindow {
    pub fn new(season_year: i32, cutoff_week: u32, season_type: SeasonType) -> Result<Self> {
        if cutoff_week == 0 {
            return Err(SkillError::invalid_window(format!(
                "cutoff week must be at least 1 for season {season_year}"
            )));
        }
        if cutoff_week > MAX_CUTOFF_WEEK {
            return Err(SkillError::invalid_window(format!(
                "cutoff week {cutoff_week} exceeds {MAX_CUTOFF_WEEK} for season {season_year}"
            )));
        }
        Ok(Self { season_year, cutoff_week, season_type })
    }

    /// Regular-season window
    pub fn regular(season_year: i32, cutoff_week: u32) -> Result<Self> {
        Self::new(season_year, cutoff_week, SeasonType::Regular)
    }

    pub fn season_year(&self) -> i32 {
        self.season_year
    }

    pub fn cutoff_week(&self) -> u32 {
        self.cutoff_week
    }

    pub fn season_type(&self) -> SeasonType {
        self.season_type
    }

    /// First week after the window, the one predictions are made for
    pub fn target_week(&self) -> u32 {
        self.cutoff_week.saturating_add(1)
    }

    /// Training weeks as an inclusive range
    pub fn weeks(&self) -> RangeInclusive<u32> {
        1..=self.cutoff_week
    }

    pub fn contains(&self, row: &LedgerRow) -> bool {
        row.in_season(self.season_year, self.season_type) && self.weeks().contains(&row.week)
    }

    /// Score records inside the window, in ledger order
    pub fn select(&self, rows: &[LedgerRow]) -> Result<Vec<ScoreRecord>> {
        let records: Vec<ScoreRecord> =
            rows.iter().filter(|row| self.contains(row)).map(ScoreRecord::from).collect();

        if records.is_empty() {
            return Err(SkillError::EmptyTrainingWindow {
                season_year: self.season_year,
                cutoff_week: self.cutoff_week,
            });
        }

        Ok(records)
    }

    /// Score records for the target week of the same season segment
    pub fn target_rows(&self, rows: &[LedgerRow]) -> Vec<ScoreRecord> {
        let week = self.target_week();
        rows.iter()
            .filter(|row| row.in_season(self.season_year, self.season_type) && row.week == week)
            .map(ScoreRecord::from)
            .collect()
    }
}
