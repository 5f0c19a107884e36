//! Monte Carlo completion of the remaining schedule.
//!
//! Every trial plays out all unresolved matches on its own copy of the
//! standings, ranks the teams and reports who made the playoffs. Trials run in
//! parallel; per-worker counts are merged at the end and then added to the
//! canonical teams.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::info;

use crate::config::EngineConfig;
use crate::elo::update_ratings;
use crate::error::{Result, SeasonError};
use crate::season::Season;
use crate::team::TeamId;
use crate::win_prob::expected_scores;

/// How ratings behave while a trial plays out the rest of the season.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RatingPolicy {
    /// Every simulated match uses the post-history ratings.
    #[default]
    Frozen,

    /// Simulated results feed back into the trial's ratings as they happen.
    Rolling,
}

/// Read-only starting point shared by all trials of a run.
#[derive(Clone, Debug)]
pub struct SeasonSnapshot {
    ratings: Vec<f64>,
    wins: Vec<u32>,
    losses: Vec<u32>,
    pending: Vec<(TeamId, TeamId)>,
}

impl SeasonSnapshot {
    pub fn new(season: &Season) -> Self {
        SeasonSnapshot {
            ratings: season.teams().iter().map(|t| t.rating).collect(),
            wins: season.teams().iter().map(|t| t.wins).collect(),
            losses: season.teams().iter().map(|t| t.losses).collect(),
            pending: season.unresolved().map(|m| (m.team1, m.team2)).collect(),
        }
    }

    pub fn team_count(&self) -> usize {
        self.ratings.len()
    }

    /// Unresolved matches in schedule order.
    pub fn pending(&self) -> &[(TeamId, TeamId)] {
        &self.pending
    }
}

/// The private working set of one trial.
#[derive(Clone, Debug, PartialEq)]
pub struct TrialState {
    pub ratings: Vec<f64>,

    /// Real-valued so the tie-break jitter can be added
    pub wins: Vec<f64>,

    pub losses: Vec<u32>,
}

impl TrialState {
    pub fn from_snapshot(snapshot: &SeasonSnapshot) -> Self {
        TrialState {
            ratings: snapshot.ratings.clone(),
            wins: snapshot.wins.iter().map(|&w| w as f64).collect(),
            losses: snapshot.losses.clone(),
        }
    }

    /// Play one match and return whether `team1` won.
    pub fn play<R: Rng>(
        &mut self,
        team1: TeamId,
        team2: TeamId,
        policy: RatingPolicy,
        k: f64,
        rng: &mut R,
    ) -> bool {
        let (i1, i2) = (team1.index(), team2.index());
        let (expected1, _) = expected_scores(self.ratings[i1], self.ratings[i2]);
        let team1_won = rng.gen::<f64>() < expected1;

        let (winner, loser) = if team1_won { (i1, i2) } else { (i2, i1) };
        self.wins[winner] += 1.0;
        self.losses[loser] += 1;

        if policy == RatingPolicy::Rolling {
            let (o1, o2) = if team1_won { (1.0, 0.0) } else { (0.0, 1.0) };
            let (r1, r2) = update_ratings(self.ratings[i1], self.ratings[i2], o1, o2, k);
            self.ratings[i1] = r1;
            self.ratings[i2] = r2;
        }

        team1_won
    }

    /// Add uniform noise in `[0, amount)` to every win count so that equal
    /// records are ordered at random.
    pub fn jitter<R: Rng>(&mut self, amount: f64, rng: &mut R) {
        if amount <= 0.0 {
            return;
        }
        for w in &mut self.wins {
            *w += rng.gen::<f64>() * amount;
        }
    }

    /// Teams ordered by wins, best first. Exact ties keep team order.
    pub fn standings(&self) -> Vec<TeamId> {
        let mut order: Vec<TeamId> = (0..self.wins.len()).map(TeamId).collect();
        order.sort_by(|a, b| self.wins[b.index()].total_cmp(&self.wins[a.index()]));
        order
    }
}

/// Play out one season and return the teams that finished in the playoff slots.
///
/// # Arguments
/// * `snapshot` - Post-history ratings, tallies and the unresolved schedule
/// * `cfg` - K-factor, rating policy, tie jitter and playoff slot count
/// * `rng` - This trial's private random stream
///
/// # Returns
/// Qualifying teams, best record first
pub fn run_trial<R: Rng>(
    snapshot: &SeasonSnapshot,
    cfg: &EngineConfig,
    rng: &mut R,
) -> Vec<TeamId> {
    let mut state = TrialState::from_snapshot(snapshot);
    for &(team1, team2) in snapshot.pending() {
        state.play(team1, team2, cfg.rating_policy, cfg.k_factor, rng);
    }
    state.jitter(cfg.tie_jitter, rng);

    let mut standings = state.standings();
    standings.truncate(cfg.playoff_slots);
    standings
}

/// Playoff tallies from a completed run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SimulationSummary {
    pub trials: usize,
    pub playoff_counts: Vec<u64>,
}

impl SimulationSummary {
    pub fn count(&self, id: TeamId) -> u64 {
        self.playoff_counts[id.index()]
    }

    /// Fraction of trials in which the team made the playoffs.
    pub fn probability(&self, id: TeamId) -> f64 {
        self.count(id) as f64 / self.trials as f64
    }

    /// Wilson score interval for the playoff probability at the given
    /// confidence level, e.g. 0.95.
    pub fn confidence_interval(&self, id: TeamId, level: f64) -> Result<(f64, f64)> {
        wilson_interval(self.count(id), self.trials as u64, level)
    }
}

pub fn wilson_interval(successes: u64, trials: u64, level: f64) -> Result<(f64, f64)> {
    if !(level > 0.0 && level < 1.0) {
        return Err(SeasonError::Stats(format!(
            "confidence level must be in (0, 1), got {level}"
        )));
    }
    if trials == 0 {
        return Err(SeasonError::Stats("no trials".to_string()));
    }
    let normal = Normal::new(0.0, 1.0).map_err(|e| SeasonError::Stats(e.to_string()))?;
    let z = normal.inverse_cdf(1.0 - (1.0 - level) / 2.0);

    let n = trials as f64;
    let p = successes as f64 / n;
    let z2 = z * z;
    let denom = 1.0 + z2 / n;
    let center = (p + z2 / (2.0 * n)) / denom;
    let half = z / denom * (p * (1.0 - p) / n + z2 / (4.0 * n * n)).sqrt();

    Ok(((center - half).max(0.0), (center + half).min(1.0)))
}

/// Run `cfg.simulations` trials and add the playoff counts to the season's
/// teams. Ratings of the season are never modified.
pub fn simulate_season(season: &mut Season, cfg: &EngineConfig) -> SimulationSummary {
    let snapshot = SeasonSnapshot::new(season);
    let summary = simulate_snapshot(&snapshot, cfg);

    for (i, &count) in summary.playoff_counts.iter().enumerate() {
        season.team_mut(TeamId(i)).playoff_count += count;
    }
    summary
}

/// Run all trials against a snapshot without touching any season.
///
/// Trial seeds are drawn up front from the master RNG, so a fixed
/// `cfg.seed` gives the same counts however the trials are scheduled.
pub fn simulate_snapshot(snapshot: &SeasonSnapshot, cfg: &EngineConfig) -> SimulationSummary {
    let mut master = match cfg.seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    };
    let seeds: Vec<u64> = (0..cfg.simulations).map(|_| master.gen::<u64>()).collect();
    let team_count = snapshot.team_count();

    info!(
        trials = cfg.simulations,
        pending = snapshot.pending().len(),
        policy = ?cfg.rating_policy,
        "simulating season"
    );

    let playoff_counts = seeds
        .par_iter()
        .fold(
            || vec![0u64; team_count],
            |mut counts, &seed| {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                for id in run_trial(snapshot, cfg, &mut rng) {
                    counts[id.index()] += 1;
                }
                counts
            },
        )
        .reduce(
            || vec![0u64; team_count],
            |mut a, b| {
                for (x, y) in a.iter_mut().zip(b) {
                    *x += y;
                }
                a
            },
        );

    SimulationSummary {
        trials: cfg.simulations,
        playoff_counts,
    }
}
