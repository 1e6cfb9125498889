use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Segment of the season a game belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SeasonType {
    Preseason,
    #[default]
    Regular,
    Postseason,
}

impl fmt::Display for SeasonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeasonType::Preseason => write!(f, "Preseason"),
            SeasonType::Regular => write!(f, "Regular"),
            SeasonType::Postseason => write!(f, "Postseason"),
        }
    }
}

impl SeasonType {
    /// Short tag used in ledger file names
    pub fn file_tag(&self) -> &'static str {
        match self {
            SeasonType::Preseason => "pre",
            SeasonType::Regular => "reg",
            SeasonType::Postseason => "post",
        }
    }
}

impl std::str::FromStr for SeasonType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "preseason" | "pre" => Ok(SeasonType::Preseason),
            "regular" | "reg" => Ok(SeasonType::Regular),
            "postseason" | "post" => Ok(SeasonType::Postseason),
            other => Err(format!("unknown season type '{other}'")),
        }
    }
}

/// One player's aggregated statistics for a single week, with points attached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerRow {
    /// Ledger player ID (e.g., "00-0023459")
    pub player_id: String,
    /// Player name (e.g., "Aaron Rodgers")
    pub full_name: String,
    /// Position (QB, RB, WR, TE, K)
    pub position: String,
    /// Team abbreviation (e.g., "GB")
    pub team: String,
    /// Team faced in this week's game
    pub opponent: String,
    /// Week number
    pub week: u32,
    /// Season year (e.g., 2015)
    pub season_year: i32,
    /// Season segment
    #[serde(default)]
    pub season_type: SeasonType,
    /// Raw statistical counters keyed by stat name (e.g., "receiving_yds")
    #[serde(default)]
    pub stats: BTreeMap<String, f64>,
    /// Points produced by the external scoring formula
    pub points: f64,
}

impl LedgerRow {
    /// Value of a raw counter, zero when the counter was not recorded
    pub fn stat(&self, name: &str) -> f64 {
        self.stats.get(name).copied().unwrap_or(0.0)
    }

    /// Counters for a configured stat set, in the order given
    pub fn stat_line(&self, names: &[String]) -> Vec<(String, f64)> {
        names.iter().map(|name| (name.clone(), self.stat(name))).collect()
    }

    /// Whether this row belongs to the given season segment and year
    pub fn in_season(&self, season_year: i32, season_type: SeasonType) -> bool {
        self.season_year == season_year && self.season_type == season_type
    }
}

/// Container for one week of ledger rows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyLedgerData {
    /// Season year
    pub season_year: i32,
    /// Season segment
    #[serde(default)]
    pub season_type: SeasonType,
    /// Week number
    pub week: u32,
    /// When this data was last updated
    pub last_updated: DateTime<Utc>,
    /// Rows for every player who recorded a stat this week
    pub rows: Vec<LedgerRow>,
}

impl WeeklyLedgerData {
    /// Create new weekly ledger container
    pub fn new(season_year: i32, season_type: SeasonType, week: u32) -> Self {
        Self { season_year, season_type, week, last_updated: Utc::now(), rows: Vec::new() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(player_id: &str, position: &str, points: f64) -> LedgerRow {
        LedgerRow {
            player_id: player_id.to_string(),
            full_name: format!("Player {player_id}"),
            position: position.to_string(),
            team: "GB".to_string(),
            opponent: "CHI".to_string(),
            week: 1,
            season_year: 2015,
            season_type: SeasonType::Regular,
            stats: BTreeMap::from([("receiving_yds".to_string(), 87.0)]),
            points,
        }
    }

    #[test]
    fn test_stat_lookup_defaults_to_zero() {
        let row = row("p1", "WR", 12.7);
        assert_eq!(row.stat("receiving_yds"), 87.0);
        assert_eq!(row.stat("passing_tds"), 0.0);

        let line = row.stat_line(&["passing_tds".to_string(), "receiving_yds".to_string()]);
        assert_eq!(line[0], ("passing_tds".to_string(), 0.0));
        assert_eq!(line[1], ("receiving_yds".to_string(), 87.0));
    }

    #[test]
    fn test_season_type_parsing() {
        assert_eq!("Regular".parse::<SeasonType>().unwrap(), SeasonType::Regular);
        assert_eq!("post".parse::<SeasonType>().unwrap(), SeasonType::Postseason);
        assert!("offseason".parse::<SeasonType>().is_err());
        assert_eq!(SeasonType::default(), SeasonType::Regular);
        assert_eq!(SeasonType::Preseason.file_tag(), "pre");
        assert_eq!(SeasonType::Postseason.file_tag(), "post");
    }

    #[test]
    fn test_row_deserializes_without_optional_fields() {
        let json = r#"{
            "player_id": "00-0027793",
            "full_name": "Antonio Brown",
            "position": "WR",
            "team": "PIT",
            "opponent": "NE",
            "week": 1,
            "season_year": 2015,
            "points": 18.3
        }"#;
        let row: LedgerRow = serde_json::from_str(json).unwrap();
        assert_eq!(row.season_type, SeasonType::Regular);
        assert!(row.stats.is_empty());
        assert!(row.in_season(2015, SeasonType::Regular));
        assert!(!row.in_season(2014, SeasonType::Regular));
    }
}
