//! Per-position fitting and the combined skill tables

use crate::config::ModelConfig;
use crate::error::{Result, SkillError};
use crate::factorizer::{FactorizationDiagnostics, PositionFactors, SkillFactorizer};
use crate::matrix::MatrixBuilder;
use crate::models::{DefenseWeakness, OffenseSkill, ScoreRecord};
use crate::partition::PositionPartitioner;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::{info, warn};

/// Offense skills and defense weaknesses across every fitted position
///
/// Offense rows are keyed by player ID, defense rows by `(opponent, position)`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SkillTables {
    offense: Vec<OffenseSkill>,
    defense: Vec<DefenseWeakness>,
    diagnostics: BTreeMap<String, FactorizationDiagnostics>,
    #[serde(skip)]
    offense_by_player: HashMap<String, usize>,
    #[serde(skip)]
    defense_by_key: HashMap<(String, String), usize>,
}

impl SkillTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build tables from prepared rows
    pub fn from_rows(offense: Vec<OffenseSkill>, defense: Vec<DefenseWeakness>) -> Result<Self> {
        let mut tables = Self::new();
        for row in offense {
            tables.push_offense(row)?;
        }
        for row in defense {
            tables.push_defense(row)?;
        }
        Ok(tables)
    }

    /// Append one position's factors
    pub fn insert_position(&mut self, factors: &PositionFactors) -> Result<()> {
        let position = factors.position();
        for (player_id, skill) in factors.skill_pairs() {
            self.push_offense(OffenseSkill {
                player_id: player_id.to_string(),
                position: position.to_string(),
                skill,
            })?;
        }
        for (opponent, weakness) in factors.weakness_pairs() {
            self.push_defense(DefenseWeakness {
                opponent: opponent.to_string(),
                position: position.to_string(),
                weakness,
            })?;
        }
        self.diagnostics.insert(position.to_string(), *factors.diagnostics());
        Ok(())
    }

    fn push_offense(&mut self, row: OffenseSkill) -> Result<()> {
        if let Some(&existing) = self.offense_by_player.get(&row.player_id) {
            return Err(SkillError::PlayerInMultiplePositions {
                player_id: row.player_id,
                first: self.offense[existing].position.clone(),
                second: row.position,
            });
        }
        self.offense_by_player.insert(row.player_id.clone(), self.offense.len());
        self.offense.push(row);
        Ok(())
    }

    fn push_defense(&mut self, row: DefenseWeakness) -> Result<()> {
        let key = (row.opponent.clone(), row.position.clone());
        if self.defense_by_key.contains_key(&key) {
            return Err(SkillError::DuplicateDefense {
                opponent: row.opponent,
                position: row.position,
            });
        }
        self.defense_by_key.insert(key, self.defense.len());
        self.defense.push(row);
        Ok(())
    }

    pub fn offense(&self) -> &[OffenseSkill] {
        &self.offense
    }

    pub fn defense(&self) -> &[DefenseWeakness] {
        &self.defense
    }

    pub fn offense_skill(&self, player_id: &str) -> Option<&OffenseSkill> {
        self.offense_by_player.get(player_id).map(|&i| &self.offense[i])
    }

    pub fn defense_weakness(&self, opponent: &str, position: &str) -> Option<&DefenseWeakness> {
        self.defense_by_key
            .get(&(opponent.to_string(), position.to_string()))
            .map(|&i| &self.defense[i])
    }

    /// Factorization diagnostics keyed by position
    pub fn diagnostics(&self) -> &BTreeMap<String, FactorizationDiagnostics> {
        &self.diagnostics
    }

    /// Fitted positions in fit order
    pub fn positions(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for row in &self.offense {
            if !seen.contains(&row.position.as_str()) {
                seen.push(&row.position);
            }
        }
        seen
    }
}

/// Fits every configured position and merges the results
#[derive(Debug, Clone)]
pub struct SkillAggregator {
    builder: MatrixBuilder,
    factorizer: SkillFactorizer,
    positions: Vec<String>,
    skip_empty: bool,
}

impl SkillAggregator {
    pub fn new(
        builder: MatrixBuilder,
        factorizer: SkillFactorizer,
        positions: Vec<String>,
        skip_empty: bool,
    ) -> Self {
        Self { builder, factorizer, positions, skip_empty }
    }

    pub fn from_config(config: &ModelConfig) -> Self {
        Self::new(
            MatrixBuilder::new(config.clip_negative),
            SkillFactorizer::from_config(config),
            config.positions.clone(),
            config.skip_empty_positions,
        )
    }

    pub fn positions(&self) -> &[String] {
        &self.positions
    }

    /// Partition, build and factorize one position
    pub fn fit_position(&self, records: &[ScoreRecord], position: &str) -> Result<PositionFactors> {
        let group = PositionPartitioner::select(records, position)?;
        let matrix = self.builder.build(&group)?;
        self.factorizer.factorize_position(matrix)
    }

    /// Fit every configured position, in configured order
    pub fn fit(&self, records: &[ScoreRecord]) -> Result<SkillTables> {
        let mut tables = SkillTables::new();

        for position in &self.positions {
            let factors = match self.fit_position(records, position) {
                Ok(factors) => factors,
                Err(SkillError::EmptyPositionGroup { position }) if self.skip_empty => {
                    warn!(position = position.as_str(), "No training records, skipping position");
                    continue;
                }
                Err(e) => return Err(e),
            };

            let diagnostics = factors.diagnostics();
            info!(
                position = position.as_str(),
                players = factors.players().len(),
                opponents = factors.opponents().len(),
                iterations = diagnostics.iterations,
                converged = diagnostics.converged,
                error = diagnostics.frobenius_error,
                "Fitted position"
            );

            tables.insert_position(&factors)?;
        }

        Ok(tables)
    }
}
