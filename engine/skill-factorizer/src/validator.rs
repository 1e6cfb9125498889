//! Accuracy of predictions against realized points

use crate::error::{Result, SkillError};
use crate::models::{Prediction, ScoreRecord, ValidationResult};
use std::collections::HashMap;
use tracing::{debug, info};

/// Joins predictions to actual points and scores them
#[derive(Debug, Clone, Default)]
pub struct Validator {
    position: Option<String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only score actual rows for one position
    pub fn for_position(position: impl Into<String>) -> Self {
        Self { position: Some(position.into()) }
    }

    /// RMSE of predictions against actual points, with the std-dev baseline
    ///
    /// A player's actual rows are summed into one observation. When a player
    /// has several predictions the first one is used.
    pub fn validate(
        &self,
        actuals: &[ScoreRecord],
        predictions: &[Prediction],
    ) -> Result<ValidationResult> {
        let mut actual_order: Vec<&str> = Vec::new();
        let mut actual_points: HashMap<&str, f64> = HashMap::new();
        for record in actuals {
            if let Some(position) = &self.position {
                if &record.position != position {
                    continue;
                }
            }
            actual_points
                .entry(record.player_id.as_str())
                .and_modify(|points| *points += record.points)
                .or_insert_with(|| {
                    actual_order.push(&record.player_id);
                    record.points
                });
        }

        let mut predicted: HashMap<&str, f64> = HashMap::new();
        let mut duplicates = 0usize;
        for prediction in predictions {
            if predicted.contains_key(prediction.player_id.as_str()) {
                duplicates += 1;
                continue;
            }
            predicted.insert(&prediction.player_id, prediction.predicted_points);
        }
        if duplicates > 0 {
            debug!(duplicates, "Ignoring duplicate predictions");
        }

        let joined: Vec<(f64, f64)> = actual_order
            .iter()
            .filter_map(|id| Some((actual_points[id], *predicted.get(id)?)))
            .collect();

        if joined.is_empty() {
            return Err(SkillError::EmptyValidationSet);
        }

        let n = joined.len() as f64;
        let mse = joined.iter().map(|(a, p)| (a - p) * (a - p)).sum::<f64>() / n;
        let mean = joined.iter().map(|(a, _)| a).sum::<f64>() / n;
        let variance = joined.iter().map(|(a, _)| (a - mean) * (a - mean)).sum::<f64>() / n;

        let result = ValidationResult {
            rmse: mse.sqrt(),
            n_joined: joined.len(),
            baseline_std: variance.sqrt(),
        };

        info!(
            position = self.position.as_deref().unwrap_or("all"),
            n_joined = result.n_joined,
            rmse = result.rmse,
            baseline_std = result.baseline_std,
            beats_baseline = result.beats_baseline(),
            "Validated predictions"
        );
        Ok(result)
    }
}
