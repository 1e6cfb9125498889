//! Game schedules and opponent resolution

use crate::error::{LedgerError, Result};
use crate::types::{LedgerRow, SeasonType, WeeklyLedgerData};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// A single scheduled game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    /// Game identifier (e.g., "2015091000")
    pub gsis_id: String,
    pub season_year: i32,
    #[serde(default)]
    pub season_type: SeasonType,
    pub week: u32,
    pub home_team: String,
    pub away_team: String,
}

impl Game {
    /// Opponent faced by `team` in this game, if `team` played in it
    pub fn opponent_of(&self, team: &str) -> Option<&str> {
        if team == self.home_team {
            Some(&self.away_team)
        } else if team == self.away_team {
            Some(&self.home_team)
        } else {
            None
        }
    }
}

/// A team paired with the opponent it faces in a given week
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TeamOpponent {
    pub team: String,
    pub opponent: String,
}

/// Full season schedule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleData {
    pub season_year: i32,
    pub games: Vec<Game>,
}

impl ScheduleData {
    /// Games played in one week of one season segment
    pub fn games_in_week(&self, season_type: SeasonType, week: u32) -> impl Iterator<Item = &Game> {
        self.games
            .iter()
            .filter(move |game| game.season_type == season_type && game.week == week)
    }

    /// Team/opponent pairs for a week, both orientations of every game
    pub fn team_opponents(&self, season_type: SeasonType, week: u32) -> Vec<TeamOpponent> {
        let games: Vec<&Game> = self.games_in_week(season_type, week).collect();
        let mut pairs = Vec::with_capacity(games.len() * 2);

        for game in &games {
            pairs.push(TeamOpponent {
                team: game.home_team.clone(),
                opponent: game.away_team.clone(),
            });
        }
        for game in &games {
            pairs.push(TeamOpponent {
                team: game.away_team.clone(),
                opponent: game.home_team.clone(),
            });
        }

        debug!(week, games = games.len(), "Resolved team/opponent pairs");
        pairs
    }
}

/// A player's summed statistics for one game, before the opponent is known
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameStatLine {
    pub gsis_id: String,
    pub player_id: String,
    pub full_name: String,
    pub position: String,
    pub team: String,
    #[serde(default)]
    pub stats: BTreeMap<String, f64>,
    pub points: f64,
}

impl WeeklyLedgerData {
    /// Assemble a week of ledger rows from per-game stat lines
    ///
    /// Each line's opponent is resolved from the game it references. Lines
    /// for games outside the requested week are skipped.
    pub fn from_game_lines(
        schedule: &ScheduleData,
        season_type: SeasonType,
        week: u32,
        lines: &[GameStatLine],
    ) -> Result<Self> {
        let games: HashMap<&str, &Game> = schedule
            .games
            .iter()
            .map(|game| (game.gsis_id.as_str(), game))
            .collect();

        let mut data = WeeklyLedgerData::new(schedule.season_year, season_type, week);

        for line in lines {
            let game = games
                .get(line.gsis_id.as_str())
                .ok_or_else(|| LedgerError::UnknownGame { gsis_id: line.gsis_id.clone() })?;

            if game.week != week || game.season_type != season_type {
                continue;
            }

            let opponent = game
                .opponent_of(&line.team)
                .ok_or_else(|| LedgerError::unknown_team(&line.team, &line.gsis_id))?;

            data.rows.push(LedgerRow {
                player_id: line.player_id.clone(),
                full_name: line.full_name.clone(),
                position: line.position.clone(),
                team: line.team.clone(),
                opponent: opponent.to_string(),
                week,
                season_year: schedule.season_year,
                season_type,
                stats: line.stats.clone(),
                points: line.points,
            });
        }

        Ok(data)
    }
}
