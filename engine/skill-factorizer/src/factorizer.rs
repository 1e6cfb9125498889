//! Rank-1 nonnegative matrix factorization of position score matrices
//!
//! A position matrix `M` (players × opponents) is approximated by `u·vᵗ`,
//! where `u` holds one offense skill per player and `v` one defense weakness
//! per opponent. With a single latent factor and `M ≥ 0`, the nonnegative
//! least-squares update for each side has a closed form:
//!
//! ```text
//! u = M v  / (vᵀv)
//! v = Mᵀ u / (uᵀu)
//! ```
//!
//! Both updates keep every entry nonnegative, and the squared reconstruction
//! error after each sweep is `‖M‖² − ‖u‖²‖v‖²`, so convergence is tracked
//! without materializing `u·vᵗ`.

use crate::config::ModelConfig;
use crate::config::{DEFAULT_MAX_ITER, DEFAULT_TOLERANCE};
use crate::error::{Result, SkillError};
use crate::index::IdIndex;
use crate::matrix::{PositionMatrix, SparseScoreMatrix};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Offense skill per player, aligned to a player index
#[derive(Debug, Clone, PartialEq)]
pub struct SkillVector(Array1<f64>);

impl SkillVector {
    pub fn as_array(&self) -> &Array1<f64> {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Defense weakness per opponent against one position, aligned to an opponent index
#[derive(Debug, Clone, PartialEq)]
pub struct WeaknessVector {
    position: String,
    values: Array1<f64>,
}

impl WeaknessVector {
    pub fn position(&self) -> &str {
        &self.position
    }

    pub fn as_array(&self) -> &Array1<f64> {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// How a factorization run went
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FactorizationDiagnostics {
    /// Alternating sweeps performed
    pub iterations: usize,
    /// Whether the improvement tolerance was reached before the cap
    pub converged: bool,
    /// Final `‖M − u·vᵗ‖_F`
    pub frobenius_error: f64,
    /// Players with no points against any opponent (skill resolved to 0)
    pub zero_rows: usize,
    /// Opponents that allowed no points to anyone (weakness resolved to 0)
    pub zero_cols: usize,
}

impl FactorizationDiagnostics {
    pub fn is_degenerate(&self) -> bool {
        self.zero_rows > 0 || self.zero_cols > 0
    }
}

/// Raw factors of a matrix
#[derive(Debug, Clone)]
pub struct Factorization {
    pub skills: Array1<f64>,
    pub weaknesses: Array1<f64>,
    pub diagnostics: FactorizationDiagnostics,
}

impl Factorization {
    /// Reconstructed value of one cell, `u[row] · v[col]`
    pub fn fitted(&self, row: usize, col: usize) -> f64 {
        self.skills[row] * self.weaknesses[col]
    }
}

/// Factors of one position, still bundled with the indices they align to
#[derive(Debug, Clone)]
pub struct PositionFactors {
    position: String,
    players: IdIndex,
    opponents: IdIndex,
    skills: SkillVector,
    weaknesses: WeaknessVector,
    diagnostics: FactorizationDiagnostics,
}

impl PositionFactors {
    pub fn position(&self) -> &str {
        &self.position
    }

    pub fn players(&self) -> &IdIndex {
        &self.players
    }

    pub fn opponents(&self) -> &IdIndex {
        &self.opponents
    }

    pub fn skills(&self) -> &SkillVector {
        &self.skills
    }

    pub fn weaknesses(&self) -> &WeaknessVector {
        &self.weaknesses
    }

    pub fn diagnostics(&self) -> &FactorizationDiagnostics {
        &self.diagnostics
    }

    /// Skill of a player by ID
    pub fn skill_of(&self, player_id: &str) -> Option<f64> {
        self.players.index_of(player_id).and_then(|i| self.skills.get(i))
    }

    /// Weakness of an opponent by ID
    pub fn weakness_of(&self, opponent: &str) -> Option<f64> {
        self.opponents.index_of(opponent).and_then(|i| self.weaknesses.get(i))
    }

    /// Fitted points for any player/opponent pair seen in training
    pub fn fitted_points(&self, player_id: &str, opponent: &str) -> Option<f64> {
        Some(self.skill_of(player_id)? * self.weakness_of(opponent)?)
    }

    /// `(player_id, skill)` pairs in index order
    pub fn skill_pairs(&self) -> impl Iterator<Item = (&str, f64)> {
        self.players.iter().map(|(i, id)| (id, self.skills.0[i]))
    }

    /// `(opponent, weakness)` pairs in index order
    pub fn weakness_pairs(&self) -> impl Iterator<Item = (&str, f64)> {
        self.opponents.iter().map(|(i, id)| (id, self.weaknesses.values[i]))
    }
}

/// Rank-1 nonnegative factorizer
#[derive(Debug, Clone, Copy)]
pub struct SkillFactorizer {
    max_iter: usize,
    tolerance: f64,
}

impl Default for SkillFactorizer {
    fn default() -> Self {
        Self { max_iter: DEFAULT_MAX_ITER, tolerance: DEFAULT_TOLERANCE }
    }
}

impl SkillFactorizer {
    pub fn new(max_iter: usize, tolerance: f64) -> Self {
        Self { max_iter, tolerance }
    }

    pub fn from_config(config: &ModelConfig) -> Self {
        Self::new(config.max_iter, config.tolerance)
    }

    pub fn max_iter(&self) -> usize {
        self.max_iter
    }

    /// Factorize one position matrix, carrying its indices through
    pub fn factorize_position(&self, position_matrix: PositionMatrix) -> Result<PositionFactors> {
        let (position, matrix, players, opponents) = position_matrix.into_parts();
        let factorization = self.factorize(&matrix)?;

        if factorization.diagnostics.is_degenerate() {
            debug!(
                position = position.as_str(),
                zero_rows = factorization.diagnostics.zero_rows,
                zero_cols = factorization.diagnostics.zero_cols,
                "Degenerate rows/columns resolved to zero"
            );
        }

        Ok(PositionFactors {
            weaknesses: WeaknessVector {
                position: position.clone(),
                values: factorization.weaknesses,
            },
            skills: SkillVector(factorization.skills),
            diagnostics: factorization.diagnostics,
            position,
            players,
            opponents,
        })
    }

    /// Factorize a nonnegative matrix into skill and weakness vectors
    pub fn factorize(&self, matrix: &SparseScoreMatrix) -> Result<Factorization> {
        if let Some((row, col, value)) = matrix.first_negative() {
            return Err(SkillError::NegativeEntry { row, col, value });
        }

        let (rows, cols) = matrix.shape();
        let mut diagnostics = FactorizationDiagnostics {
            zero_rows: matrix.zero_rows().len(),
            zero_cols: matrix.zero_cols().len(),
            ..Default::default()
        };

        let norm_sq = matrix.frobenius_norm_sq();
        if norm_sq == 0.0 {
            diagnostics.converged = true;
            return Ok(Factorization {
                skills: Array1::zeros(rows),
                weaknesses: Array1::zeros(cols),
                diagnostics,
            });
        }

        let mut u: Array1<f64> = Array1::zeros(rows);
        let mut v: Array1<f64> = Array1::ones(cols);
        let mut prev_error_sq = f64::INFINITY;
        let mut error_sq = norm_sq;

        for iteration in 1..=self.max_iter {
            let vv = v.dot(&v);
            if vv == 0.0 {
                break;
            }
            u = matrix.mul_vec(&v) / vv;

            let uu = u.dot(&u);
            if uu == 0.0 {
                break;
            }
            v = matrix.transpose_mul_vec(&u) / uu;

            error_sq = (norm_sq - uu * v.dot(&v)).max(0.0);
            diagnostics.iterations = iteration;

            if (prev_error_sq - error_sq).abs() <= self.tolerance * norm_sq {
                diagnostics.converged = true;
                break;
            }
            prev_error_sq = error_sq;
        }

        diagnostics.frobenius_error = error_sq.sqrt();

        // Balance so that ‖u‖ = ‖v‖; u·vᵗ is unchanged.
        let u_norm = u.dot(&u).sqrt();
        let v_norm = v.dot(&v).sqrt();
        if u_norm > 0.0 && v_norm > 0.0 {
            let scale = (v_norm / u_norm).sqrt();
            u *= scale;
            v /= scale;
        }

        debug!(
            rows,
            cols,
            iterations = diagnostics.iterations,
            converged = diagnostics.converged,
            error = diagnostics.frobenius_error,
            "Factorized score matrix"
        );

        Ok(Factorization { skills: u, weaknesses: v, diagnostics })
    }
}
