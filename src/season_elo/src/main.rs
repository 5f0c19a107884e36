// season-elo entry point.
//
// 1. Initialize tracing (stderr)
// 2. Assemble config: TOML file, then CLI overrides
// 3. Read the schedule, optionally print the rating history
// 4. Rate, forecast and simulate
// 5. Print the text report, write HTML/JSON if asked

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing::info;

use season_elo::config::{load_config, EngineConfig};
use season_elo::loader::{load_season, parse_date, read_season_file};
use season_elo::pipeline;
use season_elo::report::DEFAULT_TEMPLATE;
use season_elo::season::Season;
use season_elo::simulation::RatingPolicy;
use season_elo::starting_ratings::StartingRatings;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyArg {
    /// Simulated matches use the post-history ratings throughout a trial
    Frozen,
    /// Simulated results update ratings within a trial
    Rolling,
}

impl From<PolicyArg> for RatingPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Frozen => RatingPolicy::Frozen,
            PolicyArg::Rolling => RatingPolicy::Rolling,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "season-elo")]
#[command(version)]
#[command(about = "Elo ratings and Monte Carlo playoff odds for a league season")]
struct Args {
    /// Season schedule CSV with a Home,Away,Map,Date,Score header
    season: PathBuf,

    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// CSV of `team,rating` starting ratings, layered over the config
    #[arg(long)]
    starting_ratings: Option<PathBuf>,

    /// Elo K-factor
    #[arg(short, long)]
    k_factor: Option<f64>,

    /// Number of simulated seasons
    #[arg(short = 'n', long)]
    simulations: Option<usize>,

    /// Teams that make the playoffs
    #[arg(long)]
    playoff_slots: Option<usize>,

    /// Rating behavior inside a simulated season
    #[arg(long, value_enum)]
    policy: Option<PolicyArg>,

    /// Master RNG seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Week number; writes the HTML report when given
    #[arg(short, long)]
    week: Option<String>,

    /// HTML template with WEEK_NUMBER, ELO_TABLE and MATCH_LISTING placeholders
    #[arg(long)]
    template: Option<PathBuf>,

    /// HTML output path
    #[arg(short, long, default_value = "out.html")]
    out: PathBuf,

    /// Also write the report as JSON
    #[arg(long)]
    json: Option<PathBuf>,

    /// Reference date for the upcoming-matches listing (defaults to now)
    #[arg(long)]
    as_of: Option<String>,

    /// Print every team's rating after each completed match
    #[arg(long, default_value = "false")]
    history: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing()?;

    let cfg = build_config(&args)?;
    info!(
        k = cfg.k_factor,
        simulations = cfg.simulations,
        playoff_slots = cfg.playoff_slots,
        policy = ?cfg.rating_policy,
        "config loaded"
    );

    let extra = match &args.starting_ratings {
        Some(path) => {
            let mut ratings = StartingRatings::new();
            ratings
                .read_from_file(path)
                .with_context(|| format!("failed to read starting ratings {}", path.display()))?;
            Some(ratings)
        }
        None => None,
    };

    let as_of = match &args.as_of {
        Some(raw) => parse_date(raw).with_context(|| format!("unrecognized --as-of date `{raw}`"))?,
        None => chrono::Local::now().naive_local(),
    };

    let records = read_season_file(&args.season)
        .with_context(|| format!("failed to read season {}", args.season.display()))?;

    if args.history {
        let starting = pipeline::starting_ratings(&cfg, extra.as_ref());
        let season = load_season(records.clone(), &starting)?;
        println!("{}", history_table(&season, cfg.k_factor));
    }

    let run = pipeline::run(records, &cfg, extra.as_ref())
        .with_context(|| format!("failed to process season {}", args.season.display()))?;

    if let Some(week) = &args.week {
        let template = match &args.template {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("failed to read template {}", path.display()))?,
            None => DEFAULT_TEMPLATE.to_string(),
        };
        let html = run.report.render_html(&template, week, as_of);
        std::fs::write(&args.out, html)
            .with_context(|| format!("failed to write {}", args.out.display()))?;
        info!(path = %args.out.display(), "HTML report written");
    }

    if let Some(path) = &args.json {
        let json = run.report.to_json().context("failed to serialize report")?;
        std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "JSON report written");
    }

    print!("{}", run.report.render_text());
    Ok(())
}

fn build_config(args: &Args) -> anyhow::Result<EngineConfig> {
    let mut cfg = match &args.config {
        Some(path) => load_config(path)?,
        None => EngineConfig::default(),
    };
    if let Some(k) = args.k_factor {
        cfg.k_factor = k;
    }
    if let Some(n) = args.simulations {
        cfg.simulations = n;
    }
    if let Some(slots) = args.playoff_slots {
        cfg.playoff_slots = slots;
    }
    if let Some(policy) = args.policy {
        cfg.rating_policy = policy.into();
    }
    if args.seed.is_some() {
        cfg.seed = args.seed;
    }
    cfg.validate().context("invalid configuration")?;
    Ok(cfg)
}

/// Tab-separated rating history: a header of team names, then one row per
/// completed match.
fn history_table(season: &Season, k: f64) -> String {
    let mut lines = vec![season.names_sorted().join("\t")];
    for row in season.rating_history(k) {
        let line: Vec<String> = row.iter().map(|r| r.to_string()).collect();
        lines.push(line.join("\t"));
    }
    lines.join("\n") + "\n"
}

fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("season_elo=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use season_elo::loader::RawMatch;
    use std::io::Write;

    fn parse_args(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("season-elo").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults_without_config() {
        let cfg = build_config(&parse_args(&["season.csv"])).unwrap();
        assert_eq!(cfg, EngineConfig::default());
    }

    #[test]
    fn test_cli_overrides_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "k_factor = 40.0\nsimulations = 500\nseed = 3\n[starting_ratings]\nfroyotech = 1600.0"
        )
        .unwrap();
        let config = file.path().to_str().unwrap();

        let cfg = build_config(&parse_args(&["season.csv", "-c", config])).unwrap();
        assert_eq!(cfg.k_factor, 40.0);
        assert_eq!(cfg.simulations, 500);
        assert_eq!(cfg.seed, Some(3));
        assert_eq!(cfg.rating_policy, RatingPolicy::Frozen);

        let cfg = build_config(&parse_args(&[
            "season.csv",
            "-c",
            config,
            "-k",
            "20",
            "-n",
            "50",
            "--playoff-slots",
            "2",
            "--policy",
            "rolling",
            "--seed",
            "9",
        ]))
        .unwrap();
        assert_eq!(cfg.k_factor, 20.0);
        assert_eq!(cfg.simulations, 50);
        assert_eq!(cfg.playoff_slots, 2);
        assert_eq!(cfg.rating_policy, RatingPolicy::Rolling);
        assert_eq!(cfg.seed, Some(9));
        assert_eq!(cfg.starting_ratings.get("froyotech"), Some(&1600.0));
    }

    #[test]
    fn test_invalid_override_rejected() {
        assert!(build_config(&parse_args(&["season.csv", "-n", "0"])).is_err());
        assert!(build_config(&parse_args(&["season.csv", "-k", "0"])).is_err());
    }

    #[test]
    fn test_history_table() {
        let records = vec![
            RawMatch::new("froyotech", "Ascent", "cp_process_final", "2017-01-01", "5-0"),
            RawMatch::new("Ascent", "froyotech", "cp_granary_pro", "2017-01-08", ""),
        ];
        let season = load_season(records, &StartingRatings::new()).unwrap();

        let table = history_table(&season, 40.0);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines, ["Ascent\tfroyotech", "1500\t1500", "1480\t1520"]);
    }
}
