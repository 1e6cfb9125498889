use score_ledger::LedgerRow;
use serde::{Deserialize, Serialize};

/// One player's point production against one opponent in one week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub player_id: String,
    pub position: String,
    pub team: String,
    pub opponent: String,
    pub week: u32,
    pub points: f64,
    /// Display name, carried for ranking views only
    #[serde(default)]
    pub full_name: Option<String>,
}

impl ScoreRecord {
    /// Create a new score record
    pub fn new(
        player_id: impl Into<String>,
        position: impl Into<String>,
        team: impl Into<String>,
        opponent: impl Into<String>,
        week: u32,
        points: f64,
    ) -> Self {
        Self {
            player_id: player_id.into(),
            position: position.into(),
            team: team.into(),
            opponent: opponent.into(),
            week,
            points,
            full_name: None,
        }
    }

    /// Attach a display name
    pub fn with_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = Some(full_name.into());
        self
    }

    /// Points with negative production raised to zero
    pub fn clipped_points(&self) -> f64 {
        self.points.max(0.0)
    }
}

impl From<&LedgerRow> for ScoreRecord {
    fn from(row: &LedgerRow) -> Self {
        Self {
            player_id: row.player_id.clone(),
            position: row.position.clone(),
            team: row.team.clone(),
            opponent: row.opponent.clone(),
            week: row.week,
            points: row.points,
            full_name: Some(row.full_name.clone()),
        }
    }
}

/// A future pairing awaiting a prediction
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Matchup {
    pub player_id: String,
    pub team: String,
    pub opponent: String,
}

impl Matchup {
    pub fn new(
        player_id: impl Into<String>,
        team: impl Into<String>,
        opponent: impl Into<String>,
    ) -> Self {
        Self { player_id: player_id.into(), team: team.into(), opponent: opponent.into() }
    }
}

/// Predicted point production for one matchup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub player_id: String,
    pub position: String,
    pub team: String,
    pub opponent: String,
    pub predicted_points: f64,
}

/// Predictions for a batch of matchups
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionBatch {
    pub predictions: Vec<Prediction>,
    /// Matchups whose player or opponent/position pair had no training history
    pub dropped: usize,
}

impl PredictionBatch {
    pub fn len(&self) -> usize {
        self.predictions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predictions.is_empty()
    }
}

/// Accuracy of a set of predictions against realized points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Root mean squared error over the joined rows
    pub rmse: f64,
    /// Number of player rows present on both sides of the join
    pub n_joined: usize,
    /// Standard deviation of actual points over the joined rows
    pub baseline_std: f64,
}

impl ValidationResult {
    /// Whether the model beats predicting the mean of actual points
    pub fn beats_baseline(&self) -> bool {
        self.rmse < self.baseline_std
    }
}

/// Learned offense rating for one player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OffenseSkill {
    pub player_id: String,
    pub position: String,
    pub skill: f64,
}

/// Learned weakness of one defense against one position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefenseWeakness {
    pub opponent: String,
    pub position: String,
    pub weakness: f64,
}
