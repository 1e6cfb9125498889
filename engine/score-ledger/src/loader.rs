use crate::error::{LedgerError, Result};
use crate::schedule::ScheduleData;
use crate::types::{LedgerRow, SeasonType, WeeklyLedgerData};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Rows from several weeks of one season segment, concatenated in week order
#[derive(Debug, Clone, Default)]
pub struct LedgerSnapshot {
    pub season_year: i32,
    pub season_type: SeasonType,
    /// Weeks that had a data file, ascending
    pub weeks_loaded: Vec<u32>,
    pub rows: Vec<LedgerRow>,
}

impl LedgerSnapshot {
    /// Rows recorded in a single week
    pub fn rows_for_week(&self, week: u32) -> impl Iterator<Item = &LedgerRow> {
        self.rows.iter().filter(move |row| row.week == week)
    }
}

/// Loads weekly ledger files and schedules from a data directory
///
/// Files are laid out as `week_{N}_{pre|reg|post}_ledger_{YEAR}.json` and
/// `schedule_{YEAR}.json`.
pub struct LedgerLoader {
    data_dir: PathBuf,
}

impl LedgerLoader {
    /// Create a loader rooted at `data_dir`
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self { data_dir: data_dir.as_ref().to_path_buf() }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of the ledger file for one week of a season segment
    pub fn week_path(&self, season_year: i32, season_type: SeasonType, week: u32) -> PathBuf {
        let tag = season_type.file_tag();
        self.data_dir.join(format!("week_{week}_{tag}_ledger_{season_year}.json"))
    }

    /// Path of the schedule file for a season
    pub fn schedule_path(&self, season_year: i32) -> PathBuf {
        self.data_dir.join(format!("schedule_{season_year}.json"))
    }

    /// Load one week of ledger rows
    ///
    /// The file's header must name the requested season, segment and week.
    pub async fn load_week(
        &self,
        season_year: i32,
        season_type: SeasonType,
        week: u32,
    ) -> Result<WeeklyLedgerData> {
        let path = self.week_path(season_year, season_type, week);
        if !tokio::fs::try_exists(&path).await? {
            return Err(LedgerError::MissingWeek { season_year, week, path });
        }

        let content = tokio::fs::read_to_string(&path).await?;
        let data: WeeklyLedgerData = serde_json::from_str(&content)?;

        if data.season_year != season_year
            || data.season_type != season_type
            || data.week != week
        {
            return Err(LedgerError::HeaderMismatch {
                path,
                expected: format!("{season_year} {season_type} week {week}"),
                found: format!("{} {} week {}", data.season_year, data.season_type, data.week),
            });
        }

        Ok(data)
    }

    /// Load every available week in `weeks`, skipping weeks without a file
    pub async fn load_weeks(
        &self,
        season_year: i32,
        season_type: SeasonType,
        weeks: RangeInclusive<u32>,
    ) -> Result<LedgerSnapshot> {
        let mut snapshot = LedgerSnapshot { season_year, season_type, ..Default::default() };

        for week in weeks {
            match self.load_week(season_year, season_type, week).await {
                Ok(data) => {
                    snapshot.weeks_loaded.push(week);
                    snapshot.rows.extend(data.rows);
                }
                Err(LedgerError::MissingWeek { path, .. }) => {
                    warn!("No ledger file for week {} at {:?}, skipping", week, path);
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            "Loaded {} ledger rows across {} weeks of {} {}",
            snapshot.rows.len(),
            snapshot.weeks_loaded.len(),
            season_year,
            season_type
        );
        Ok(snapshot)
    }

    /// Load the season schedule
    pub async fn load_schedule(&self, season_year: i32) -> Result<ScheduleData> {
        let content = tokio::fs::read_to_string(self.schedule_path(season_year)).await?;
        let schedule: ScheduleData = serde_json::from_str(&content)?;
        info!("Loaded {} games for {}", schedule.games.len(), season_year);
        Ok(schedule)
    }

    /// Write one week of ledger rows
    pub async fn save_week(&self, data: &WeeklyLedgerData) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.data_dir).await?;
        let path = self.week_path(data.season_year, data.season_type, data.week);
        let json = serde_json::to_string_pretty(data)?;
        tokio::fs::write(&path, json).await?;
        Ok(path)
    }

    /// Write the season schedule
    pub async fn save_schedule(&self, schedule: &ScheduleData) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.data_dir).await?;
        let path = self.schedule_path(schedule.season_year);
        let json = serde_json::to_string_pretty(schedule)?;
        tokio::fs::write(&path, json).await?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::Game;
    use crate::types::SeasonType;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn week_data(week: u32, players: &[(&str, f64)]) -> WeeklyLedgerData {
        segment_data(SeasonType::Regular, week, players)
    }

    fn segment_data(
        season_type: SeasonType,
        week: u32,
        players: &[(&str, f64)],
    ) -> WeeklyLedgerData {
        let mut data = WeeklyLedgerData::new(2015, season_type, week);
        for (player_id, points) in players {
            data.rows.push(LedgerRow {
                player_id: player_id.to_string(),
                full_name: format!("Player {player_id}"),
                position: "WR".to_string(),
                team: "GB".to_string(),
                opponent: "CHI".to_string(),
                week,
                season_year: 2015,
                season_type,
                stats: BTreeMap::new(),
                points: *points,
            });
        }
        data
    }

    #[tokio::test]
    async fn test_week_round_trip_through_files() {
        let temp_dir = TempDir::new().unwrap();
        let loader = LedgerLoader::new(temp_dir.path());

        let path = loader.save_week(&week_data(3, &[("p1", 12.0)])).await.unwrap();
        assert_eq!(path, temp_dir.path().join("week_3_reg_ledger_2015.json"));

        let loaded = loader.load_week(2015, SeasonType::Regular, 3).await.unwrap();
        assert_eq!(loaded.week, 3);
        assert_eq!(loaded.rows.len(), 1);
        assert_eq!(loaded.rows[0].points, 12.0);
    }

    #[tokio::test]
    async fn test_missing_week_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let loader = LedgerLoader::new(temp_dir.path());

        let err = loader.load_week(2015, SeasonType::Regular, 7).await.unwrap_err();
        assert!(matches!(err, LedgerError::MissingWeek { week: 7, .. }));
    }

    #[tokio::test]
    async fn test_load_weeks_skips_gaps() {
        let temp_dir = TempDir::new().unwrap();
        let loader = LedgerLoader::new(temp_dir.path());

        loader.save_week(&week_data(1, &[("p1", 5.0), ("p2", 8.0)])).await.unwrap();
        loader.save_week(&week_data(3, &[("p1", 9.0)])).await.unwrap();

        let snapshot = loader.load_weeks(2015, SeasonType::Regular, 1..=4).await.unwrap();
        assert_eq!(snapshot.season_type, SeasonType::Regular);
        assert_eq!(snapshot.weeks_loaded, vec![1, 3]);
        assert_eq!(snapshot.rows.len(), 3);
        assert_eq!(snapshot.rows_for_week(1).count(), 2);
        assert_eq!(snapshot.rows_for_week(2).count(), 0);
    }

    #[tokio::test]
    async fn test_schedule_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let loader = LedgerLoader::new(temp_dir.path());

        let schedule = ScheduleData {
            season_year: 2015,
            games: vec![Game {
                gsis_id: "g1".to_string(),
                season_year: 2015,
                season_type: SeasonType::Regular,
                week: 1,
                home_team: "NE".to_string(),
                away_team: "PIT".to_string(),
            }],
        };
        loader.save_schedule(&schedule).await.unwrap();

        let loaded = loader.load_schedule(2015).await.unwrap();
        assert_eq!(loaded.games, schedule.games);
    }

    #[tokio::test]
    async fn test_malformed_week_file() {
        let temp_dir = TempDir::new().unwrap();
        let loader = LedgerLoader::new(temp_dir.path());
        tokio::fs::write(loader.week_path(2015, SeasonType::Regular, 2), "{ not json")
            .await
            .unwrap();

        let err = loader.load_week(2015, SeasonType::Regular, 2).await.unwrap_err();
        assert!(matches!(err, LedgerError::Json(_)));
    }

    #[tokio::test]
    async fn test_season_segments_kept_apart() {
        let temp_dir = TempDir::new().unwrap();
        let loader = LedgerLoader::new(temp_dir.path());

        let regular = loader.save_week(&week_data(1, &[("p1", 12.0)])).await.unwrap();
        let preseason = loader
            .save_week(&segment_data(SeasonType::Preseason, 1, &[("p9", 3.0)]))
            .await
            .unwrap();
        assert_ne!(regular, preseason);

        let loaded = loader.load_week(2015, SeasonType::Regular, 1).await.unwrap();
        assert_eq!(loaded.season_type, SeasonType::Regular);
        assert_eq!(loaded.rows[0].player_id, "p1");

        let loaded = loader.load_week(2015, SeasonType::Preseason, 1).await.unwrap();
        assert_eq!(loaded.season_type, SeasonType::Preseason);
        assert_eq!(loaded.rows[0].player_id, "p9");

        let err = loader.load_week(2015, SeasonType::Postseason, 1).await.unwrap_err();
        assert!(matches!(err, LedgerError::MissingWeek { .. }));
    }

    #[tokio::test]
    async fn test_mismatched_header_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let loader = LedgerLoader::new(temp_dir.path());

        // A week 4 document stored under the week 2 name
        let json = serde_json::to_string(&week_data(4, &[("p1", 1.0)])).unwrap();
        tokio::fs::write(loader.week_path(2015, SeasonType::Regular, 2), json).await.unwrap();

        let err = loader.load_week(2015, SeasonType::Regular, 2).await.unwrap_err();
        assert!(matches!(err, LedgerError::HeaderMismatch { .. }));

        let err = loader.load_weeks(2015, SeasonType::Regular, 1..=2).await.unwrap_err();
        assert!(matches!(err, LedgerError::HeaderMismatch { .. }));
    }
}
