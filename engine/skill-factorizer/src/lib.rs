//! Skill Factorizer
//!
//! Learns one offense skill per player and one weakness per defense against
//! each position by rank-1 nonnegative factorization of weekly fantasy
//! points, then predicts upcoming matchups as skill × weakness and scores
//! those predictions against realized points.

pub mod aggregator;
pub mod config;
pub mod error;
pub mod factorizer;
pub mod index;
pub mod logging;
pub mod matchups;
pub mod matrix;
pub mod models;
pub mod partition;
pub mod pipeline;
pub mod predictor;
pub mod ranking;
pub mod validator;
pub mod window;

pub use aggregator::{SkillAggregator, SkillTables};
pub use config::FactorizerConfig;
pub use error::{Result, SkillError};
pub use factorizer::{
    Factorization, FactorizationDiagnostics, PositionFactors, SkillFactorizer, SkillVector,
    WeaknessVector,
};
pub use index::IdIndex;
pub use matchups::MatchupBuilder;
pub use matrix::{MatrixBuilder, PositionMatrix, SparseScoreMatrix};
pub use models::*;
pub use partition::{PositionGroup, PositionPartitioner};
pub use pipeline::{FittedWindow, SkillPipeline, WeekReport};
pub use predictor::Predictor;
pub use ranking::{player_names, rank_defense, rank_offense, RankedDefense, RankedOffense};
pub use validator::Validator;
pub use window::TrainingWindow;
