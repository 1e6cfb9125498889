// Sorted views over fitted skill tables

use crate::aggregator::SkillTables;
use crate::models::ScoreRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A player's offense skill with a display name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedOffense {
    pub rank: usize,
    pub player_id: String,
    pub full_name: Option<String>,
    pub skill: f64,
}

/// A defense's weakness against one position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedDefense {
    pub rank: usize,
    pub opponent: String,
    pub weakness: f64,
}

/// Display names by player ID, the last non-empty name seen wins
pub fn player_names(records: &[ScoreRecord]) -> HashMap<String, String> {
    let mut names = HashMap::new();
    for record in records {
        if let Some(name) = record.full_name.as_deref().filter(|n| !n.is_empty()) {
            names.insert(record.player_id.clone(), name.to_string());
        }
    }
    names
}

/// Players of one position, most skilled first
pub fn rank_offense(
    tables: &SkillTables,
    position: &str,
    names: &HashMap<String, String>,
) -> Vec<RankedOffense> {
    let mut rows: Vec<_> = tables.offense().iter().filter(|r| r.position == position).collect();
    rows.sort_by(|a, b| b.skill.total_cmp(&a.skill));

    rows.into_iter()
        .enumerate()
        .map(|(i, row)| RankedOffense {
            rank: i + 1,
            player_id: row.player_id.clone(),
            full_name: names.get(&row.player_id).cloned(),
            skill: row.skill,
        })
        .collect()
}

/// Defenses against one position, most exploitable first
pub fn rank_defense(tables: &SkillTables, position: &str) -> Vec<RankedDefense> {
    let mut rows: Vec<_> = tables.defense().iter().filter(|r| r.position == position).collect();
    rows.sort_by(|a, b| b.weakness.total_cmp(&a.weakness));

    rows.into_iter()
        .enumerate()
        .map(|(i, row)| RankedDefense {
            rank: i + 1,
            opponent: row.opponent.clone(),
            weakness: row.weakness,
        })
        .collect()
}
