/// Rating assigned to a team with no known starting rating
pub const DEFAULT_RATING: f64 = 1500.0;

/// Rating gap that corresponds to 10:1 odds on the logistic curve
pub const ELO_SCALE: f64 = 400.0;

/// Step size applied to the gap between realized and expected outcome
pub const DEFAULT_K_FACTOR: f64 = 35.0;

/// Number of Monte Carlo trials per run
pub const DEFAULT_SIMULATIONS: usize = 10_000;

/// Teams that qualify for the playoffs at the end of a season
pub const DEFAULT_PLAYOFF_SLOTS: usize = 4;

/// Upper bound of the uniform noise added to simulated win counts
pub const TIE_JITTER: f64 = 0.01;

/// Fraction of a team's distance from the mean kept into the next season
pub const SEASON_CARRYOVER: f64 = 0.66;

/// Unresolved matches within this many days are listed in the HTML report
pub const UPCOMING_WINDOW_DAYS: i64 = 7;
