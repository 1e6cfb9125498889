//! Fit, predict and validate one target week

use crate::aggregator::{SkillAggregator, SkillTables};
use crate::config::ModelConfig;
use crate::error::{Result, SkillError};
use crate::factorizer::FactorizationDiagnostics;
use crate::matchups::MatchupBuilder;
use crate::models::{PredictionBatch, ScoreRecord, ValidationResult};
use crate::predictor::Predictor;
use crate::validator::Validator;
use crate::window::TrainingWindow;
use chrono::{DateTime, Utc};
use score_ledger::{LedgerRow, TeamOpponent};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Outcome of one fit/predict/validate run
#[derive(Debug, Clone, Serialize)]
pub struct WeekReport {
    pub window: TrainingWindow,
    pub target_week: u32,
    pub training_records: usize,
    pub offense_rows: usize,
    pub defense_rows: usize,
    pub diagnostics: BTreeMap<String, FactorizationDiagnostics>,
    pub batch: PredictionBatch,
    pub validation: ValidationResult,
    /// Per-position results, positions with no joined rows are absent
    pub by_position: BTreeMap<String, ValidationResult>,
    pub generated_at: DateTime<Utc>,
}

/// Training records and the tables fitted on them
#[derive(Debug, Clone)]
pub struct FittedWindow {
    pub window: TrainingWindow,
    pub records: Vec<ScoreRecord>,
    pub tables: SkillTables,
}

pub struct SkillPipeline {
    aggregator: SkillAggregator,
}

impl SkillPipeline {
    pub fn new(aggregator: SkillAggregator) -> Self {
        Self { aggregator }
    }

    pub fn from_config(config: &ModelConfig) -> Self {
        Self::new(SkillAggregator::from_config(config))
    }

    pub fn aggregator(&self) -> &SkillAggregator {
        &self.aggregator
    }

    /// Select the window's rows and fit every configured position
    pub fn fit(&self, rows: &[LedgerRow], window: TrainingWindow) -> Result<FittedWindow> {
        let records = window.select(rows)?;
        info!(
            season_year = window.season_year(),
            cutoff_week = window.cutoff_week(),
            records = records.len(),
            "Selected training window"
        );

        let tables = self.aggregator.fit(&records)?;
        info!(
            offense = tables.offense().len(),
            defense = tables.defense().len(),
            "Fitted skill tables"
        );

        Ok(FittedWindow { window, records, tables })
    }

    /// Fit on the window, predict its target week and score the predictions
    ///
    /// `pairs` are the target week's team/opponent pairs.
    pub fn run_week(
        &self,
        rows: &[LedgerRow],
        pairs: &[TeamOpponent],
        window: TrainingWindow,
    ) -> Result<WeekReport> {
        let fitted = self.fit(rows, window)?;
        self.evaluate(&fitted, rows, pairs)
    }

    /// Predict and score the target week of an already fitted window
    pub fn evaluate(
        &self,
        fitted: &FittedWindow,
        rows: &[LedgerRow],
        pairs: &[TeamOpponent],
    ) -> Result<WeekReport> {
        let window = fitted.window;
        let target_week = window.target_week();

        let matchups = MatchupBuilder::build(&fitted.records, pairs);
        info!(target_week, matchups = matchups.len(), "Built target week matchups");

        let batch = Predictor::new(&fitted.tables).predict(&matchups);

        let actuals = window.target_rows(rows);
        info!(target_week, actual_rows = actuals.len(), "Loaded target week actuals");
        let validation = Validator::new().validate(&actuals, &batch.predictions)?;

        let mut by_position = BTreeMap::new();
        for position in self.aggregator.positions() {
            let validator = Validator::for_position(position.as_str());
            match validator.validate(&actuals, &batch.predictions) {
                Ok(result) => {
                    by_position.insert(position.clone(), result);
                }
                Err(SkillError::EmptyValidationSet) => {
                    warn!(position = position.as_str(), "No joined rows for position");
                }
                Err(e) => return Err(e),
            }
        }

        Ok(WeekReport {
            window,
            target_week,
            training_records: fitted.records.len(),
            offense_rows: fitted.tables.offense().len(),
            defense_rows: fitted.tables.defense().len(),
            diagnostics: fitted.tables.diagnostics().clone(),
            batch,
            validation,
            by_position,
            generated_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factorizer::SkillFactorizer;
    use crate::matrix::MatrixBuilder;
    use score_ledger::SeasonType;
    use std::collections::BTreeMap as Map;

    const OFFENSES: [&str; 2] = ["GB", "PIT"];
    const DEFENSES: [&str; 2] = ["CHI", "NE"];

    fn row(
        player_id: &str,
        position: &str,
        team: &str,
        opponent: &str,
        week: u32,
        points: f64,
    ) -> LedgerRow {
        LedgerRow {
            player_id: player_id.to_string(),
            full_name: format!("Player {player_id}"),
            position: position.to_string(),
            team: team.to_string(),
            opponent: opponent.to_string(),
            week,
            season_year: 2015,
            season_type: SeasonType::Regular,
            stats: Map::new(),
            points,
        }
    }

    /// `(offense, defense)` index pairs; pairings alternate every week
    fn schedule(week: u32) -> [(usize, usize); 2] {
        if week % 2 == 1 {
            [(0, 0), (1, 1)]
        } else {
            [(0, 1), (1, 0)]
        }
    }

    fn pairs(week: u32) -> Vec<TeamOpponent> {
        let mut out = Vec::new();
        for (off, def) in schedule(week) {
            out.push(TeamOpponent { team: OFFENSES[off].into(), opponent: DEFENSES[def].into() });
            out.push(TeamOpponent { team: DEFENSES[def].into(), opponent: OFFENSES[off].into() });
        }
        out
    }

    /// Points follow skill × weakness exactly, one WR and one QB per offense
    fn season(weeks: u32) -> Vec<LedgerRow> {
        let wr_skill = [4.0, 2.0];
        let qb_skill = [6.0, 5.0];
        let wr_weak = [1.0, 2.5];
        let qb_weak = [2.0, 1.5];

        let mut rows = Vec::new();
        for week in 1..=weeks {
            for (off, def) in schedule(week) {
                let (team, opponent) = (OFFENSES[off], DEFENSES[def]);
                let wr_points = wr_skill[off] * wr_weak[def];
                let qb_points = qb_skill[off] * qb_weak[def];
                rows.push(row(&format!("wr-{team}"), "WR", team, opponent, week, wr_points));
                rows.push(row(&format!("qb-{team}"), "QB", team, opponent, week, qb_points));
            }
        }
        rows
    }

    fn pipeline() -> SkillPipeline {
        SkillPipeline::new(SkillAggregator::new(
            MatrixBuilder::default(),
            SkillFactorizer::default(),
            vec!["QB".to_string(), "WR".to_string()],
            false,
        ))
    }

    #[test]
    fn test_fit_window() {
        let rows = season(3);
        let window = TrainingWindow::regular(2015, 2).unwrap();
        let fitted = pipeline().fit(&rows, window).unwrap();

        assert_eq!(fitted.records.len(), 8);
        assert_eq!(fitted.tables.offense().len(), 4);
        assert_eq!(fitted.tables.defense().len(), 4);
        assert_eq!(fitted.tables.positions(), vec!["QB", "WR"]);
    }

    #[test]
    fn test_run_week_end_to_end() {
        let rows = season(3);
        let window = TrainingWindow::regular(2015, 2).unwrap();
        let report = pipeline().run_week(&rows, &pairs(3), window).unwrap();

        assert_eq!(report.target_week, 3);
        assert_eq!(report.training_records, 8);
        assert_eq!(report.batch.len(), 4);
        assert_eq!(report.batch.dropped, 0);
        assert_eq!(report.validation.n_joined, 4);
        assert_eq!(report.by_position.len(), 2);
        assert!(report.diagnostics.values().all(|d| d.converged));

        // Every training cell is observed and exactly rank-1
        assert!(report.validation.rmse < 1e-6);
        assert!(report.validation.beats_baseline());
    }

    #[test]
    fn test_run_week_without_actuals() {
        let rows = season(2);
        let window = TrainingWindow::regular(2015, 2).unwrap();
        let err = pipeline().run_week(&rows, &pairs(3), window).unwrap_err();
        assert!(matches!(err, SkillError::EmptyValidationSet));
    }

    #[test]
    fn test_report_serializes() {
        let rows = season(3);
        let window = TrainingWindow::regular(2015, 2).unwrap();
        let report = pipeline().run_week(&rows, &pairs(3), window).unwrap();

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["target_week"], 3);
        assert_eq!(json["validation"]["n_joined"], 4);
    }
}
