use std::fmt;

use serde::Serialize;

use crate::constants::DEFAULT_RATING;

/// Index of a team inside a [`crate::season::Season`].
///
/// Assigned in order of first appearance when the season is loaded. All
/// internal processing addresses teams by this index; names are only used at
/// the load and report boundaries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TeamId(pub usize);

impl TeamId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Team with its current Elo rating and season tallies.
#[derive(Clone, Debug, PartialEq)]
pub struct Team {
    pub id: TeamId,
    pub name: String,

    /// Elo rating, mutated once per completed match by the historical pass
    pub rating: f64,

    /// Completed matches won
    pub wins: u32,

    /// Completed matches lost
    pub losses: u32,

    /// Trials in which this team finished inside the playoff slots
    pub playoff_count: u64,
}

impl Team {
    /// Create a team. A `None` starting rating falls back to [`DEFAULT_RATING`].
    pub fn new(id: TeamId, name: impl Into<String>, starting_rating: Option<f64>) -> Self {
        Team {
            id,
            name: name.into(),
            rating: starting_rating.unwrap_or(DEFAULT_RATING),
            wins: 0,
            losses: 0,
            playoff_count: 0,
        }
    }

    pub fn record_win(&mut self) {
        self.wins += 1;
    }

    pub fn record_loss(&mut self) {
        self.losses += 1;
    }

    /// Rating to start next season with, regressed toward the mean.
    ///
    /// `carryover` is the fraction of the distance from [`DEFAULT_RATING`]
    /// that survives the off-season.
    pub fn next_season_rating(&self, carryover: f64) -> f64 {
        (self.rating - DEFAULT_RATING) * carryover + DEFAULT_RATING
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:.0} ({}-{})", self.name, self.rating, self.wins, self.losses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rating() {
        let team = Team::new(TeamId(0), "froyotech", None);
        assert_eq!(team.rating, DEFAULT_RATING);
        assert_eq!(team.wins, 0);
        assert_eq!(team.losses, 0);
        assert_eq!(team.playoff_count, 0);
    }

    #[test]
    fn test_starting_rating_override() {
        let team = Team::new(TeamId(3), "Ascent", Some(1595.4));
        assert!((team.rating - 1595.4).abs() < 1e-12);
    }

    #[test]
    fn test_next_season_rating_regresses() {
        let mut team = Team::new(TeamId(0), "A", Some(1600.0));
        assert!((team.next_season_rating(0.66) - 1566.0).abs() < 1e-9);

        team.rating = 1400.0;
        assert!((team.next_season_rating(0.66) - 1434.0).abs() < 1e-9);

        team.rating = DEFAULT_RATING;
        assert_eq!(team.next_season_rating(0.66), DEFAULT_RATING);
    }

    #[test]
    fn test_display() {
        let mut team = Team::new(TeamId(0), "black swan", Some(1440.16));
        team.record_win();
        team.record_loss();
        team.record_loss();
        assert_eq!(team.to_string(), "black swan: 1440 (1-2)");
    }
}
