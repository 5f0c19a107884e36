use std::path::Path;

use tracing::info;

use crate::config::EngineConfig;
use crate::loader::{load_season, read_season_file, RawMatch};
use crate::report::SeasonReport;
use crate::season::Season;
use crate::simulation::{simulate_season, SimulationSummary};
use crate::starting_ratings::StartingRatings;

/// Output of a full run: the final canonical season plus its projection.
#[derive(Clone, Debug)]
pub struct SeasonRun {
    pub season: Season,
    pub summary: SimulationSummary,
    pub report: SeasonReport,
}

/// Config starting ratings with `extra` layered on top.
pub fn starting_ratings(cfg: &EngineConfig, extra: Option<&StartingRatings>) -> StartingRatings {
    let mut starting = cfg.starting_ratings();
    if let Some(extra) = extra {
        starting.merge(extra);
    }
    starting
}

/// Load, rate, forecast and simulate a season.
///
/// `extra_ratings` are merged over the config's starting ratings. Any error
/// aborts the run before a report exists.
pub fn run(
    records: Vec<RawMatch>,
    cfg: &EngineConfig,
    extra_ratings: Option<&StartingRatings>,
) -> anyhow::Result<SeasonRun> {
    cfg.validate()?;

    let starting = starting_ratings(cfg, extra_ratings);
    let mut season = load_season(records, &starting)?;

    season.calculate_ratings(cfg.k_factor);
    season.set_match_probs();
    info!(unresolved = season.unresolved().count(), "forecasts set");

    let summary = simulate_season(&mut season, cfg);
    let report = SeasonReport::build(&season, &summary, cfg)?;
    info!(teams = report.teams.len(), trials = summary.trials, "season report built");

    Ok(SeasonRun {
        season,
        summary,
        report,
    })
}

pub fn run_file(
    path: impl AsRef<Path>,
    cfg: &EngineConfig,
    extra_ratings: Option<&StartingRatings>,
) -> anyhow::Result<SeasonRun> {
    let path = path.as_ref();
    let records = read_season_file(path)?;
    info!(path = %path.display(), records = records.len(), "schedule read");
    run(records, cfg, extra_ratings)
}
