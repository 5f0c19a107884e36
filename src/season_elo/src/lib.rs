//! Season Elo - Elo ratings and playoff odds for a head-to-head league season.
//!
//! Completed matches are replayed in date order to rate every team, the
//! remaining schedule is forecast from those ratings, and a Monte Carlo
//! simulation of the rest of the season estimates each team's chance of
//! finishing in the playoff slots.

pub mod config;
pub mod constants;
pub mod elo;
pub mod error;
pub mod fixture;
pub mod loader;
pub mod pipeline;
pub mod report;
pub mod season;
pub mod simulation;
pub mod starting_ratings;
pub mod team;
pub mod win_prob;

pub use config::{load_config, ConfigError, EngineConfig};
pub use constants::{DEFAULT_K_FACTOR, DEFAULT_PLAYOFF_SLOTS, DEFAULT_RATING, DEFAULT_SIMULATIONS};
pub use elo::update_ratings;
pub use error::{Result, SeasonError};
pub use fixture::Match;
pub use loader::{load_season, read_season, RawMatch};
pub use pipeline::{run, run_file, SeasonRun};
pub use report::{format_playoff_pct, SeasonReport};
pub use season::Season;
pub use simulation::{simulate_season, RatingPolicy, SimulationSummary};
pub use starting_ratings::StartingRatings;
pub use team::{Team, TeamId};
pub use win_prob::{calculate_win_prob, expected_scores};
