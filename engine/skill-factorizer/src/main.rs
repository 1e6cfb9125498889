use anyhow::Context;
use score_ledger::{LedgerLoader, LedgerRow};
use skill_factorizer::logging::initialize_logging_with_config;
use skill_factorizer::{
    player_names, rank_defense, rank_offense, FactorizerConfig, SkillPipeline, TrainingWindow,
};
use std::collections::HashMap;
use tracing::{error, info};

const TOP_N: usize = 5;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // File first, then SKILL_* overrides on top
    let mut config = match std::env::var("SKILL_CONFIG") {
        Ok(path) => FactorizerConfig::load_from_file(&path)
            .with_context(|| format!("failed to load config from {path}"))?,
        Err(_) => FactorizerConfig::default(),
    };
    config.apply_env().context("invalid SKILL_* environment override")?;
    config.validate().context("invalid configuration")?;

    initialize_logging_with_config(&config.logging.level, &config.logging.format)?;
    info!(
        data_dir = %config.data.data_dir.display(),
        season_year = config.data.season_year,
        cutoff_week = config.data.cutoff_week,
        season_type = %config.data.season_type,
        positions = ?config.model.positions,
        "Starting skill factorizer"
    );

    let window = config.window()?;
    let loader = LedgerLoader::new(&config.data.data_dir);

    let snapshot = loader
        .load_weeks(window.season_year(), window.season_type(), 1..=window.target_week())
        .await
        .context("failed to load weekly ledgers")?;
    info!(
        weeks = ?snapshot.weeks_loaded,
        target_week = window.target_week(),
        target_rows = snapshot.rows_for_week(window.target_week()).count(),
        "Loaded ledger snapshot"
    );
    let schedule = loader
        .load_schedule(window.season_year())
        .await
        .context("failed to load season schedule")?;
    let pairs = schedule.team_opponents(window.season_type(), window.target_week());

    let pipeline = SkillPipeline::from_config(&config.model);
    let fitted = pipeline.fit(&snapshot.rows, window).context("failed to fit training window")?;
    let report = match pipeline.evaluate(&fitted, &snapshot.rows, &pairs) {
        Ok(report) => report,
        Err(e) => {
            error!("Failed to evaluate week {}: {}", window.target_week(), e);
            return Err(e.into());
        }
    };

    let names = player_names(&fitted.records);
    let latest_rows = latest_rows_by_player(&snapshot.rows, &window);

    for position in &config.model.positions {
        let stats = config.model.stats_for_position(position);

        for ranked in rank_offense(&fitted.tables, position, &names).into_iter().take(TOP_N) {
            let stat_line = latest_rows
                .get(ranked.player_id.as_str())
                .map(|row| row.stat_line(stats))
                .unwrap_or_default();
            info!(
                position = position.as_str(),
                rank = ranked.rank,
                player_id = ranked.player_id.as_str(),
                name = ranked.full_name.as_deref().unwrap_or("-"),
                skill = ranked.skill,
                stats = ?stat_line,
                "Offense skill"
            );
        }

        for ranked in rank_defense(&fitted.tables, position).into_iter().take(TOP_N) {
            info!(
                position = position.as_str(),
                rank = ranked.rank,
                opponent = ranked.opponent.as_str(),
                weakness = ranked.weakness,
                "Defense weakness"
            );
        }
    }

    for (position, result) in &report.by_position {
        info!(
            position = position.as_str(),
            n_joined = result.n_joined,
            rmse = result.rmse,
            baseline_std = result.baseline_std,
            "Position validation"
        );
    }

    info!(
        target_week = report.target_week,
        predictions = report.batch.len(),
        dropped = report.batch.dropped,
        rmse = report.validation.rmse,
        baseline_std = report.validation.baseline_std,
        beats_baseline = report.validation.beats_baseline(),
        "Week report complete"
    );

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Each player's most recent ledger row inside the training window
fn latest_rows_by_player<'a>(
    rows: &'a [LedgerRow],
    window: &TrainingWindow,
) -> HashMap<&'a str, &'a LedgerRow> {
    let mut latest: HashMap<&str, &LedgerRow> = HashMap::new();
    for row in rows.iter().filter(|r| window.contains(r)) {
        let entry = latest.entry(row.player_id.as_str()).or_insert(row);
        if row.week >= entry.week {
            *entry = row;
        }
    }
    latest
}
