// Position partitioning for score records

use crate::error::{Result, SkillError};
use crate::index::IdIndex;
use crate::models::ScoreRecord;
use std::collections::HashMap;

/// Records sharing one position label, with their player and opponent orderings
///
/// The two indices are built once, in record order, when the group is
/// created. Each record's `(player, opponent)` cell is resolved at the same
/// time so later stages never look IDs up again.
#[derive(Debug, Clone)]
pub struct PositionGroup {
    position: String,
    records: Vec<ScoreRecord>,
    players: IdIndex,
    opponents: IdIndex,
    cells: Vec<(usize, usize)>,
}

impl PositionGroup {
    /// Create a group from records that all carry `position`
    pub fn new(position: impl Into<String>, records: Vec<ScoreRecord>) -> Self {
        let mut players = IdIndex::new();
        let mut opponents = IdIndex::new();
        let cells = records
            .iter()
            .map(|r| (players.insert(&r.player_id), opponents.insert(&r.opponent)))
            .collect();

        Self { position: position.into(), records, players, opponents, cells }
    }

    pub fn position(&self) -> &str {
        &self.position
    }

    pub fn records(&self) -> &[ScoreRecord] {
        &self.records
    }

    /// Distinct player IDs in first-occurrence order
    pub fn players(&self) -> &IdIndex {
        &self.players
    }

    /// Distinct opponent IDs in first-occurrence order
    pub fn opponents(&self) -> &IdIndex {
        &self.opponents
    }

    /// Each record paired with its `(player_idx, opponent_idx)` cell
    pub fn cells(&self) -> impl Iterator<Item = ((usize, usize), &ScoreRecord)> {
        self.cells.iter().copied().zip(self.records.iter())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Splits score records into per-position groups
pub struct PositionPartitioner;

impl PositionPartitioner {
    /// Group records by position, in first-seen position order
    ///
    /// Record order inside each group matches the input order.
    pub fn partition(records: &[ScoreRecord]) -> Vec<PositionGroup> {
        let mut order: Vec<String> = Vec::new();
        let mut buckets: HashMap<&str, Vec<ScoreRecord>> = HashMap::new();

        for record in records {
            let bucket = buckets.entry(record.position.as_str()).or_insert_with(|| {
                order.push(record.position.clone());
                Vec::new()
            });
            bucket.push(record.clone());
        }

        order
            .into_iter()
            .map(|position| {
                let group_records = buckets.remove(position.as_str()).unwrap_or_default();
                PositionGroup::new(position, group_records)
            })
            .collect()
    }

    /// The group for a single position
    pub fn select(records: &[ScoreRecord], position: &str) -> Result<PositionGroup> {
        let group_records: Vec<ScoreRecord> =
            records.iter().filter(|r| r.position == position).cloned().collect();

        if group_records.is_empty() {
            return Err(SkillError::empty_position(position));
        }

        Ok(PositionGroup::new(position, group_records))
    }
}
