//! Sparse player-versus-opponent score matrices

use crate::error::{Result, SkillError};
use crate::index::IdIndex;
use crate::partition::PositionGroup;
use ndarray::{Array1, Array2};
use std::collections::BTreeMap;
use tracing::debug;

/// Players × opponents matrix of summed points, stored as sorted triplets
///
/// Cells that never co-occurred are implicit zeros. Triplets are unique and
/// sorted by `(row, col)`.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseScoreMatrix {
    rows: usize,
    cols: usize,
    entries: Vec<(usize, usize, f64)>,
}

impl SparseScoreMatrix {
    /// Build a matrix, summing triplets that address the same cell
    pub fn from_triplets<I>(rows: usize, cols: usize, triplets: I) -> Result<Self>
    where
        I: IntoIterator<Item = (usize, usize, f64)>,
    {
        let mut cells: BTreeMap<(usize, usize), f64> = BTreeMap::new();
        for (row, col, value) in triplets {
            if row >= rows || col >= cols {
                return Err(SkillError::IndexOutOfBounds { row, col, rows, cols });
            }
            *cells.entry((row, col)).or_insert(0.0) += value;
        }

        let entries = cells.into_iter().map(|((row, col), value)| (row, col, value)).collect();
        Ok(Self { rows, cols, entries })
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Number of stored cells
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    /// Stored `(row, col, value)` triplets in row-major order
    pub fn entries(&self) -> &[(usize, usize, f64)] {
        &self.entries
    }

    /// Value of a cell, zero when it was never populated
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.entries
            .binary_search_by(|&(r, c, _)| (r, c).cmp(&(row, col)))
            .map(|i| self.entries[i].2)
            .unwrap_or(0.0)
    }

    /// `M v`
    pub fn mul_vec(&self, v: &Array1<f64>) -> Array1<f64> {
        let mut out = Array1::zeros(self.rows);
        for &(row, col, value) in &self.entries {
            out[row] += value * v[col];
        }
        out
    }

    /// `Mᵀ u`
    pub fn transpose_mul_vec(&self, u: &Array1<f64>) -> Array1<f64> {
        let mut out = Array1::zeros(self.cols);
        for &(row, col, value) in &self.entries {
            out[col] += value * u[row];
        }
        out
    }

    pub fn row_sums(&self) -> Array1<f64> {
        self.mul_vec(&Array1::ones(self.cols))
    }

    pub fn col_sums(&self) -> Array1<f64> {
        self.transpose_mul_vec(&Array1::ones(self.rows))
    }

    /// Rows whose every cell is zero
    pub fn zero_rows(&self) -> Vec<usize> {
        let mut nonzero = vec![false; self.rows];
        for &(row, _, value) in &self.entries {
            if value != 0.0 {
                nonzero[row] = true;
            }
        }
        nonzero.iter().enumerate().filter(|&(_, &nz)| !nz).map(|(i, _)| i).collect()
    }

    /// Columns whose every cell is zero
    pub fn zero_cols(&self) -> Vec<usize> {
        let mut nonzero = vec![false; self.cols];
        for &(_, col, value) in &self.entries {
            if value != 0.0 {
                nonzero[col] = true;
            }
        }
        nonzero.iter().enumerate().filter(|&(_, &nz)| !nz).map(|(i, _)| i).collect()
    }

    /// First stored cell with a negative value
    pub fn first_negative(&self) -> Option<(usize, usize, f64)> {
        self.entries.iter().copied().find(|&(_, _, value)| value < 0.0)
    }

    /// `‖M‖²_F`
    pub fn frobenius_norm_sq(&self) -> f64 {
        self.entries.iter().map(|&(_, _, value)| value * value).sum()
    }

    /// Mean over every cell, implicit zeros included
    pub fn mean(&self) -> f64 {
        let cells = self.rows * self.cols;
        if cells == 0 {
            return 0.0;
        }
        self.entries.iter().map(|&(_, _, value)| value).sum::<f64>() / cells as f64
    }

    pub fn to_dense(&self) -> Array2<f64> {
        let mut dense = Array2::zeros((self.rows, self.cols));
        for &(row, col, value) in &self.entries {
            dense[[row, col]] = value;
        }
        dense
    }
}

/// A position's score matrix bundled with the orderings that index it
///
/// This is the only form in which a matrix leaves the builder; the player
/// and opponent indices are never rebuilt downstream.
#[derive(Debug, Clone)]
pub struct PositionMatrix {
    position: String,
    matrix: SparseScoreMatrix,
    players: IdIndex,
    opponents: IdIndex,
}

impl PositionMatrix {
    pub fn position(&self) -> &str {
        &self.position
    }

    pub fn matrix(&self) -> &SparseScoreMatrix {
        &self.matrix
    }

    pub fn players(&self) -> &IdIndex {
        &self.players
    }

    pub fn opponents(&self) -> &IdIndex {
        &self.opponents
    }

    /// Summed points for a player/opponent pair by ID
    pub fn points(&self, player_id: &str, opponent: &str) -> Option<f64> {
        let row = self.players.index_of(player_id)?;
        let col = self.opponents.index_of(opponent)?;
        Some(self.matrix.get(row, col))
    }

    /// Split into parts, keeping matrix and indices together in one move
    pub fn into_parts(self) -> (String, SparseScoreMatrix, IdIndex, IdIndex) {
        (self.position, self.matrix, self.players, self.opponents)
    }
}

/// Builds position score matrices from position groups
#[derive(Debug, Clone, Copy)]
pub struct MatrixBuilder {
    clip_negative: bool,
}

impl Default for MatrixBuilder {
    fn default() -> Self {
        Self { clip_negative: true }
    }
}

impl MatrixBuilder {
    pub fn new(clip_negative: bool) -> Self {
        Self { clip_negative }
    }

    pub fn clip_negative(&self) -> bool {
        self.clip_negative
    }

    /// Build the score matrix for one position group
    ///
    /// Each record is clipped (when enabled) before it is summed into its
    /// cell, so a 5 and a -3 against the same opponent yield 5.
    pub fn build(&self, group: &PositionGroup) -> Result<PositionMatrix> {
        if group.is_empty() {
            return Err(SkillError::empty_position(group.position()));
        }

        let players = group.players().clone();
        let opponents = group.opponents().clone();

        let clip = self.clip_negative;
        let triplets = group.cells().map(|((row, col), record)| {
            let points = if clip { record.clipped_points() } else { record.points };
            (row, col, points)
        });
        let matrix = SparseScoreMatrix::from_triplets(players.len(), opponents.len(), triplets)?;

        debug!(
            position = group.position(),
            players = players.len(),
            opponents = opponents.len(),
            cells = matrix.nnz(),
            records = group.len(),
            "Built position score matrix"
        );

        Ok(PositionMatrix { position: group.position().to_string(), matrix, players, opponents })
    }
}
