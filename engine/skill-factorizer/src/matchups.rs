// Upcoming matchups from training history and a week's schedule

use crate::models::{Matchup, ScoreRecord};
use score_ledger::TeamOpponent;
use std::collections::HashMap;
use tracing::debug;

pub struct MatchupBuilder;

impl MatchupBuilder {
    /// One matchup per player seen in training whose team plays this week
    ///
    /// A player's team is taken from their latest-week training record, so a
    /// mid-season trade follows the player. Teams absent from `pairs` are on
    /// a bye and their players are omitted. Output follows first appearance
    /// of each player in `training`.
    pub fn build(training: &[ScoreRecord], pairs: &[TeamOpponent]) -> Vec<Matchup> {
        let opponents: HashMap<&str, &str> =
            pairs.iter().map(|p| (p.team.as_str(), p.opponent.as_str())).collect();

        let mut order: Vec<&str> = Vec::new();
        let mut latest: HashMap<&str, &ScoreRecord> = HashMap::new();
        for record in training {
            match latest.get(record.player_id.as_str()) {
                Some(current) if current.week > record.week => {}
                Some(_) => {
                    latest.insert(&record.player_id, record);
                }
                None => {
                    order.push(&record.player_id);
                    latest.insert(&record.player_id, record);
                }
            }
        }

        let mut on_bye = 0usize;
        let matchups: Vec<Matchup> = order
            .into_iter()
            .filter_map(|player_id| {
                let record = latest.get(player_id)?;
                match opponents.get(record.team.as_str()) {
                    Some(opponent) => {
                        Some(Matchup::new(player_id, record.team.as_str(), *opponent))
                    }
                    None => {
                        on_bye += 1;
                        None
                    }
                }
            })
            .collect();

        debug!(matchups = matchups.len(), on_bye, "Built matchups");
        matchups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(team: &str, opponent: &str) -> TeamOpponent {
        TeamOpponent { team: team.to_string(), opponent: opponent.to_string() }
    }

    #[test]
    fn test_players_paired_with_week_opponent() {
        let training = vec![
            ScoreRecord::new("p1", "WR", "GB", "CHI", 1, 10.0),
            ScoreRecord::new("p2", "QB", "PIT", "NE", 1, 20.0),
            ScoreRecord::new("p1", "WR", "GB", "SEA", 2, 4.0),
        ];
        let pairs =
            vec![pair("GB", "DET"), pair("PIT", "CLE"), pair("DET", "GB"), pair("CLE", "PIT")];

        let matchups = MatchupBuilder::build(&training, &pairs);
        assert_eq!(
            matchups,
            vec![Matchup::new("p1", "GB", "DET"), Matchup::new("p2", "PIT", "CLE")]
        );
    }

    #[test]
    fn test_bye_team_omitted() {
        let training = vec![
            ScoreRecord::new("p1", "WR", "GB", "CHI", 1, 10.0),
            ScoreRecord::new("p2", "QB", "PIT", "NE", 1, 20.0),
        ];
        let pairs = vec![pair("GB", "DET"), pair("DET", "GB")];

        let matchups = MatchupBuilder::build(&training, &pairs);
        assert_eq!(matchups.len(), 1);
        assert_eq!(matchups[0].player_id, "p1");
    }

    #[test]
    fn test_traded_player_uses_latest_team() {
        let training = vec![
            ScoreRecord::new("p1", "RB", "NYJ", "MIA", 3, 7.0),
            ScoreRecord::new("p1", "RB", "BUF", "NE", 4, 9.0),
            ScoreRecord::new("p1", "RB", "NYJ", "BUF", 2, 3.0),
        ];
        let pairs = vec![pair("NYJ", "KC"), pair("BUF", "DEN")];

        let matchups = MatchupBuilder::build(&training, &pairs);
        assert_eq!(matchups, vec![Matchup::new("p1", "BUF", "DEN")]);
    }

    #[test]
    fn test_empty_schedule_yields_nothing() {
        let training = vec![ScoreRecord::new("p1", "WR", "GB", "CHI", 1, 10.0)];
        assert!(MatchupBuilder::build(&training, &[]).is_empty());
    }
}
