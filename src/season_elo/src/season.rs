use std::collections::HashMap;

use tracing::{debug, info};

use crate::elo::update_ratings;
use crate::error::{Result, SeasonError};
use crate::fixture::Match;
use crate::team::{Team, TeamId};
use crate::win_prob::expected_scores;

/// Canonical season state: teams, their ratings, and the date-ordered schedule.
#[derive(Clone, Debug)]
pub struct Season {
    teams: Vec<Team>,
    matches: Vec<Match>,
    index: HashMap<String, TeamId>,
}

impl Season {
    /// Assemble a season, checking that ids line up with positions and that
    /// every match refers to a known team.
    pub fn from_parts(teams: Vec<Team>, matches: Vec<Match>) -> Result<Self> {
        let mut index = HashMap::with_capacity(teams.len());
        for (i, team) in teams.iter().enumerate() {
            if team.id != TeamId(i) || index.insert(team.name.clone(), team.id).is_some() {
                return Err(SeasonError::Lookup(format!("{} ({})", team.name, team.id)));
            }
        }
        for m in &matches {
            for id in [m.team1, m.team2] {
                if id.index() >= teams.len() {
                    return Err(SeasonError::Lookup(id.to_string()));
                }
            }
        }
        Ok(Season {
            teams,
            matches,
            index,
        })
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    pub fn team(&self, id: TeamId) -> &Team {
        &self.teams[id.index()]
    }

    pub(crate) fn team_mut(&mut self, id: TeamId) -> &mut Team {
        &mut self.teams[id.index()]
    }

    pub fn team_id(&self, name: &str) -> Result<TeamId> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| SeasonError::Lookup(name.to_string()))
    }

    pub fn team_by_name(&self, name: &str) -> Result<&Team> {
        Ok(self.team(self.team_id(name)?))
    }

    pub fn completed_count(&self) -> usize {
        self.matches.iter().filter(|m| m.completed).count()
    }

    /// Matches whose outcome was not part of the input.
    pub fn unresolved(&self) -> impl Iterator<Item = &Match> {
        self.matches.iter().filter(|m| !m.completed)
    }

    /// Replay every completed match in schedule order, updating ratings.
    ///
    /// Order matters: each update depends on all earlier ones.
    pub fn calculate_ratings(&mut self, k: f64) {
        for m in &self.matches {
            if !m.completed {
                continue;
            }
            let (i1, i2) = (m.team1.index(), m.team2.index());
            let (o1, o2) = m.outcomes();
            let (r1, r2) = update_ratings(self.teams[i1].rating, self.teams[i2].rating, o1, o2, k);
            debug!(
                date = %m.date,
                team1 = %self.teams[i1].name,
                team2 = %self.teams[i2].name,
                delta1 = r1 - self.teams[i1].rating,
                "rating update"
            );
            self.teams[i1].rating = r1;
            self.teams[i2].rating = r2;
        }
        info!(updates = self.completed_count(), k, "historical ratings computed");
    }

    /// Ratings of all teams, ordered by team name, before the historical pass
    /// and after each completed match. Leaves the season untouched.
    pub fn rating_history(&self, k: f64) -> Vec<Vec<f64>> {
        let mut order: Vec<usize> = (0..self.teams.len()).collect();
        order.sort_by(|&a, &b| self.teams[a].name.cmp(&self.teams[b].name));

        let mut ratings: Vec<f64> = self.teams.iter().map(|t| t.rating).collect();
        let snapshot = |ratings: &[f64]| order.iter().map(|&i| ratings[i]).collect::<Vec<_>>();

        let mut history = vec![snapshot(&ratings)];
        for m in self.matches.iter().filter(|m| m.completed) {
            let (i1, i2) = (m.team1.index(), m.team2.index());
            let (o1, o2) = m.outcomes();
            let (r1, r2) = update_ratings(ratings[i1], ratings[i2], o1, o2, k);
            ratings[i1] = r1;
            ratings[i2] = r2;
            history.push(snapshot(&ratings));
        }
        history
    }

    /// Store forecast win probabilities on every unresolved match, using
    /// current ratings. Completed matches and ratings are not touched.
    pub fn set_match_probs(&mut self) {
        for m in self.matches.iter_mut().filter(|m| !m.completed) {
            let (e1, e2) = expected_scores(
                self.teams[m.team1.index()].rating,
                self.teams[m.team2.index()].rating,
            );
            m.t1_prob = e1;
            m.t2_prob = e2;
        }
    }

    /// Team names sorted alphabetically, matching the columns of
    /// [`Season::rating_history`].
    pub fn names_sorted(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.teams.iter().map(|t| t.name.as_str()).collect();
        names.sort();
        names
    }
}
