use crate::error::{Result, SkillError};
use crate::window::TrainingWindow;
use score_ledger::SeasonType;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

/// Positions fit when no explicit set is configured
pub const DEFAULT_POSITIONS: [&str; 5] = ["QB", "TE", "RB", "K", "WR"];

/// Default iteration cap for the factorizer
pub const DEFAULT_MAX_ITER: usize = 10_000;

/// Default relative improvement below which factorization stops early
pub const DEFAULT_TOLERANCE: f64 = 1e-10;

/// Configuration for the skill factorizer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FactorizerConfig {
    /// Model parameters
    #[serde(default)]
    pub model: ModelConfig,

    /// Ledger location and training window
    #[serde(default)]
    pub data: DataConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Ordered set of positions to fit, each fit independently
    pub positions: Vec<String>,

    /// Clip each record's points at zero before summing into the matrix
    pub clip_negative: bool,

    /// Iteration cap for the rank-1 factorization
    pub max_iter: usize,

    /// Relative reconstruction improvement that counts as converged
    pub tolerance: f64,

    /// Skip positions with no records instead of failing the whole fit
    pub skip_empty_positions: bool,

    /// Stat columns reported per position (e.g., "WR" -> ["receiving_yds", "receiving_tds"])
    pub position_stats: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory holding week ledger files and schedules
    pub data_dir: PathBuf,

    /// Season to fit (e.g., 2015)
    pub season_year: i32,

    /// Last week included in training
    pub cutoff_week: u32,

    /// Season segment to fit
    pub season_type: SeasonType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (json, pretty, compact)
    pub format: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            positions: DEFAULT_POSITIONS.iter().map(|p| p.to_string()).collect(),
            clip_negative: true,
            max_iter: DEFAULT_MAX_ITER,
            tolerance: DEFAULT_TOLERANCE,
            skip_empty_positions: false,
            position_stats: BTreeMap::new(),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data/ledger"),
            season_year: 2015,
            cutoff_week: 5,
            season_type: SeasonType::Regular,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "pretty".to_string() }
    }
}

impl ModelConfig {
    /// Stat columns configured for a position, empty when none are set
    pub fn stats_for_position(&self, position: &str) -> &[String] {
        self.position_stats.get(position).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Check model parameters
    pub fn validate(&self) -> Result<()> {
        if self.positions.is_empty() {
            return Err(SkillError::config("at least one position must be configured"));
        }

        let mut seen = HashSet::new();
        for position in &self.positions {
            if position.trim().is_empty() {
                return Err(SkillError::config("position labels must not be blank"));
            }
            if !seen.insert(position.as_str()) {
                return Err(SkillError::config(format!("duplicate position: {position}")));
            }
        }

        if self.max_iter == 0 {
            return Err(SkillError::config("max_iter must be at least 1"));
        }

        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(SkillError::config(format!(
                "tolerance must be a positive number, got {}",
                self.tolerance
            )));
        }

        Ok(())
    }
}

impl FactorizerConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: FactorizerConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SkillError::config(format!("failed to serialize config: {e}")))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Override fields from `SKILL_*` environment variables
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Override fields from a variable lookup
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("SKILL_DATA_DIR") {
            self.data.data_dir = PathBuf::from(dir);
        }

        if let Some(year) = lookup("SKILL_SEASON_YEAR") {
            self.data.season_year = parse_var("SKILL_SEASON_YEAR", &year)?;
        }

        if let Some(week) = lookup("SKILL_CUTOFF_WEEK") {
            self.data.cutoff_week = parse_var("SKILL_CUTOFF_WEEK", &week)?;
        }

        if let Some(season_type) = lookup("SKILL_SEASON_TYPE") {
            self.data.season_type = season_type
                .parse()
                .map_err(|e| SkillError::config(format!("SKILL_SEASON_TYPE: {e}")))?;
        }

        if let Some(positions) = lookup("SKILL_POSITIONS") {
            self.model.positions = positions
                .split(',')
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect();
        }

        if let Some(max_iter) = lookup("SKILL_MAX_ITER") {
            self.model.max_iter = parse_var("SKILL_MAX_ITER", &max_iter)?;
        }

        if let Some(tolerance) = lookup("SKILL_TOLERANCE") {
            self.model.tolerance = parse_var("SKILL_TOLERANCE", &tolerance)?;
        }

        if let Some(clip) = lookup("SKILL_CLIP_NEGATIVE") {
            self.model.clip_negative = parse_var("SKILL_CLIP_NEGATIVE", &clip)?;
        }

        if let Some(level) = lookup("SKILL_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Some(format) = lookup("SKILL_LOG_FORMAT") {
            self.logging.format = format;
        }

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.model.validate()?;

        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => return Err(SkillError::config(format!("invalid log level: {other}"))),
        }

        match self.logging.format.as_str() {
            "json" | "pretty" | "compact" => {}
            other => return Err(SkillError::config(format!("invalid log format: {other}"))),
        }

        self.window().map(|_| ())
    }

    /// Training window described by the data section
    pub fn window(&self) -> Result<TrainingWindow> {
        TrainingWindow::new(self.data.season_year, self.data.cutoff_week, self.data.season_type)
    }
}

fn parse_var<T>(key: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| SkillError::config(format!("invalid {key} '{value}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_config_default() {
        let config = FactorizerConfig::default();
        assert_eq!(config.model.positions, vec!["QB", "TE", "RB", "K", "WR"]);
        assert!(config.model.clip_negative);
        assert_eq!(config.model.max_iter, DEFAULT_MAX_ITER);
        assert_eq!(config.data.season_type, SeasonType::Regular);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = FactorizerConfig::default();
        config
            .apply_overrides(lookup(&[
                ("SKILL_POSITIONS", "WR, TE"),
                ("SKILL_SEASON_YEAR", "2014"),
                ("SKILL_CUTOFF_WEEK", "9"),
                ("SKILL_MAX_ITER", "500"),
                ("SKILL_CLIP_NEGATIVE", "false"),
                ("SKILL_SEASON_TYPE", "post"),
            ]))
            .unwrap();

        assert_eq!(config.model.positions, vec!["WR", "TE"]);
        assert_eq!(config.data.season_year, 2014);
        assert_eq!(config.data.cutoff_week, 9);
        assert_eq!(config.model.max_iter, 500);
        assert!(!config.model.clip_negative);
        assert_eq!(config.data.season_type, SeasonType::Postseason);
    }

    #[test]
    fn test_env_override_parse_failure() {
        let mut config = FactorizerConfig::default();
        let err = config.apply_overrides(lookup(&[("SKILL_MAX_ITER", "lots")])).unwrap_err();
        assert!(matches!(err, SkillError::Config(_)));
    }

    #[test]
    fn test_validate_rejects_bad_model() {
        let mut config = FactorizerConfig::default();
        config.model.positions = vec!["WR".to_string(), "WR".to_string()];
        assert!(config.validate().is_err());

        let mut config = FactorizerConfig::default();
        config.model.positions.clear();
        assert!(config.validate().is_err());

        let mut config = FactorizerConfig::default();
        config.model.max_iter = 0;
        assert!(config.validate().is_err());

        let mut config = FactorizerConfig::default();
        config.model.tolerance = -1.0;
        assert!(config.validate().is_err());

        let mut config = FactorizerConfig::default();
        config.data.cutoff_week = 0;
        assert!(config.validate().is_err());

        let mut config = FactorizerConfig::default();
        config.apply_overrides(lookup(&[("SKILL_CUTOFF_WEEK", "4294967295")])).unwrap();
        assert!(matches!(config.validate(), Err(SkillError::InvalidWindow(_))));

        let mut config = FactorizerConfig::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_position_stats_lookup() {
        let mut config = ModelConfig::default();
        config.position_stats.insert(
            "WR".to_string(),
            vec!["receiving_yds".to_string(), "receiving_tds".to_string()],
        );

        assert_eq!(config.stats_for_position("WR").len(), 2);
        assert!(config.stats_for_position("QB").is_empty());
    }

    #[test]
    fn test_file_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("skill.toml");

        let mut config = FactorizerConfig::default();
        config.model.positions = vec!["RB".to_string()];
        config.data.cutoff_week = 8;
        config.save_to_file(&path).unwrap();

        let loaded = FactorizerConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.model.positions, vec!["RB"]);
        assert_eq!(loaded.data.cutoff_week, 8);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("skill.toml");
        std::fs::write(&path, "[model]\npositions = [\"TE\"]\n").unwrap();

        let loaded = FactorizerConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.model.positions, vec!["TE"]);
        assert_eq!(loaded.model.max_iter, DEFAULT_MAX_ITER);
        assert_eq!(loaded.logging.level, "info");
    }
}
