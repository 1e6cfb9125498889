use crate::aggregator::SkillTables;
use crate::models::{Matchup, Prediction, PredictionBatch};
use tracing::{debug, info};

/// Predicts matchup points as offense skill × defense weakness
pub struct Predictor<'a> {
    tables: &'a SkillTables,
}

impl<'a> Predictor<'a> {
    pub fn new(tables: &'a SkillTables) -> Self {
        Self { tables }
    }

    /// Prediction for one matchup, `None` without training history
    pub fn predict_one(&self, matchup: &Matchup) -> Option<Prediction> {
        let offense = self.tables.offense_skill(&matchup.player_id)?;
        let defense = self.tables.defense_weakness(&matchup.opponent, &offense.position)?;

        Some(Prediction {
            player_id: matchup.player_id.clone(),
            position: offense.position.clone(),
            team: matchup.team.clone(),
            opponent: matchup.opponent.clone(),
            predicted_points: offense.skill * defense.weakness,
        })
    }

    /// Predictions for every resolvable matchup
    pub fn predict(&self, matchups: &[Matchup]) -> PredictionBatch {
        let mut batch = PredictionBatch::default();

        for matchup in matchups {
            match self.predict_one(matchup) {
                Some(prediction) => batch.predictions.push(prediction),
                None => {
                    debug!(
                        player_id = matchup.player_id.as_str(),
                        opponent = matchup.opponent.as_str(),
                        "No training history for matchup, dropping"
                    );
                    batch.dropped += 1;
                }
            }
        }

        info!(
            matchups = matchups.len(),
            predicted = batch.len(),
            dropped = batch.dropped,
            "Predicted matchups"
        );
        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DefenseWeakness, OffenseSkill};

    fn tables() -> SkillTables {
        SkillTables::from_rows(
            vec![
                OffenseSkill { player_id: "p1".into(), position: "WR".into(), skill: 2.0 },
                OffenseSkill { player_id: "p2".into(), position: "QB".into(), skill: 4.0 },
            ],
            vec![
                DefenseWeakness { opponent: "CHI".into(), position: "WR".into(), weakness: 3.0 },
                DefenseWeakness { opponent: "CHI".into(), position: "QB".into(), weakness: 0.5 },
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_prediction_is_skill_times_weakness() {
        let tables = tables();
        let prediction =
            Predictor::new(&tables).predict_one(&Matchup::new("p1", "GB", "CHI")).unwrap();
        assert_eq!(prediction.predicted_points, 6.0);
        assert_eq!(prediction.position, "WR");
    }

    #[test]
    fn test_weakness_is_position_specific() {
        let tables = tables();
        let prediction =
            Predictor::new(&tables).predict_one(&Matchup::new("p2", "GB", "CHI")).unwrap();
        assert_eq!(prediction.predicted_points, 2.0);
    }

    #[test]
    fn test_unresolved_matchups_dropped() {
        let tables = tables();
        let batch = Predictor::new(&tables).predict(&[
            Matchup::new("p1", "GB", "CHI"),
            Matchup::new("p9", "GB", "CHI"),
            Matchup::new("p1", "GB", "MIA"),
        ]);

        assert_eq!(batch.len(), 1);
        assert_eq!(batch.dropped, 2);
        assert_eq!(batch.predictions[0].player_id, "p1");
    }
}
