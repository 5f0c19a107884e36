use chrono::NaiveDateTime;

use crate::team::TeamId;

/// One head-to-head map played (or still to be played) between two teams.
///
/// `t1_prob`/`t2_prob` hold the realized outcome (1.0 / 0.0) for completed
/// matches and the forecast win probability for unresolved ones.
#[derive(Clone, Debug, PartialEq)]
pub struct Match {
    pub team1: TeamId,
    pub team2: TeamId,
    pub map: String,
    pub date: NaiveDateTime,

    /// Outcome known from the input data
    pub completed: bool,

    /// Final score as (team1, team2)
    pub score: Option<(u32, u32)>,

    pub winner: Option<TeamId>,
    pub t1_prob: f64,
    pub t2_prob: f64,
}

impl Match {
    /// Create an unresolved match with an even forecast.
    pub fn new(team1: TeamId, team2: TeamId, map: impl Into<String>, date: NaiveDateTime) -> Self {
        Match {
            team1,
            team2,
            map: map.into(),
            date,
            completed: false,
            score: None,
            winner: None,
            t1_prob: 0.5,
            t2_prob: 0.5,
        }
    }

    /// Record the final score.
    ///
    /// The winner is team1 exactly when `team1_score > team2_score`; callers
    /// reject equal scores before getting here.
    pub fn set_scores(&mut self, team1_score: u32, team2_score: u32) {
        let team1_won = team1_score > team2_score;
        self.completed = true;
        self.score = Some((team1_score, team2_score));
        self.winner = Some(if team1_won { self.team1 } else { self.team2 });
        self.t1_prob = if team1_won { 1.0 } else { 0.0 };
        self.t2_prob = 1.0 - self.t1_prob;
    }

    pub fn loser(&self) -> Option<TeamId> {
        self.winner
            .map(|w| if w == self.team1 { self.team2 } else { self.team1 })
    }

    /// Outcome probabilities for (team1, team2).
    pub fn outcomes(&self) -> (f64, f64) {
        (self.t1_prob, self.t2_prob)
    }

    pub fn involves(&self, team: TeamId) -> bool {
        self.team1 == team || self.team2 == team
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2017, 1, d)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .unwrap()
    }

    #[test]
    fn test_new_match_is_unresolved() {
        let m = Match::new(TeamId(0), TeamId(1), "cp_process_final", day(1));
        assert!(!m.completed);
        assert_eq!(m.winner, None);
        assert_eq!(m.loser(), None);
        assert_eq!(m.outcomes(), (0.5, 0.5));
    }

    #[test]
    fn test_set_scores_home_win() {
        let mut m = Match::new(TeamId(0), TeamId(1), "cp_gullywash_final1", day(1));
        m.set_scores(5, 0);
        assert!(m.completed);
        assert_eq!(m.score, Some((5, 0)));
        assert_eq!(m.winner, Some(TeamId(0)));
        assert_eq!(m.loser(), Some(TeamId(1)));
        assert_eq!(m.outcomes(), (1.0, 0.0));
    }

    #[test]
    fn test_set_scores_away_win() {
        let mut m = Match::new(TeamId(4), TeamId(2), "koth_product_rc8", day(2));
        m.set_scores(2, 3);
        assert_eq!(m.winner, Some(TeamId(2)));
        assert_eq!(m.loser(), Some(TeamId(4)));
        assert_eq!(m.outcomes(), (0.0, 1.0));
        assert!(m.involves(TeamId(4)));
        assert!(!m.involves(TeamId(0)));
    }
}
