//! Report projection: ratings, playoff odds and upcoming forecasts, rendered
//! as plain text, HTML or JSON.

use std::fmt::Write as _;

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

use crate::config::EngineConfig;
use crate::constants::UPCOMING_WINDOW_DAYS;
use crate::error::Result;
use crate::season::Season;
use crate::simulation::{RatingPolicy, SimulationSummary};

/// Confidence level of the playoff probability intervals.
pub const INTERVAL_LEVEL: f64 = 0.95;

/// Template used when no HTML template file is given.
pub const DEFAULT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Week WEEK_NUMBER</title></head>
<body>
<h1>Week WEEK_NUMBER</h1>
<table>
<tr><th>Team</th><th>Elo</th><th>Playoffs</th></tr>
ELO_TABLE
</table>
<div class="matches">
MATCH_LISTING
</div>
</body>
</html>
"#;

/// Rounded playoff percentage for display.
///
/// Values that would round to 100% or 0% without being certain are shown as
/// `>99%` and `<1%`.
pub fn format_playoff_pct(count: u64, trials: usize) -> String {
    let pct = count as f64 * 100.0 / trials as f64;
    if pct > 99.5 && count < trials as u64 {
        ">99%".to_string()
    } else if pct < 0.5 && count > 0 {
        "<1%".to_string()
    } else {
        format!("{pct:.0}%")
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TeamRow {
    pub name: String,
    pub rating: f64,
    pub wins: u32,
    pub losses: u32,
    pub playoff_count: u64,
    pub playoff_probability: f64,
    pub playoff_pct: String,
    pub playoff_interval: (f64, f64),
    pub next_season_rating: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MatchForecast {
    pub date: NaiveDateTime,
    pub map: String,
    pub team1: String,
    pub team2: String,
    pub t1_prob: f64,
    pub t2_prob: f64,
}

/// Everything produced by one run, ready for rendering.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SeasonReport {
    pub k_factor: f64,
    pub trials: usize,
    pub playoff_slots: usize,
    pub rating_policy: RatingPolicy,

    /// Sorted by rating, best first
    pub teams: Vec<TeamRow>,

    /// Unresolved matches in schedule order
    pub forecasts: Vec<MatchForecast>,
}

impl SeasonReport {
    pub fn build(season: &Season, summary: &SimulationSummary, cfg: &EngineConfig) -> Result<Self> {
        let mut teams = season
            .teams()
            .iter()
            .map(|team| -> Result<TeamRow> {
                let count = summary.count(team.id);
                Ok(TeamRow {
                    name: team.name.clone(),
                    rating: team.rating,
                    wins: team.wins,
                    losses: team.losses,
                    playoff_count: count,
                    playoff_probability: summary.probability(team.id),
                    playoff_pct: format_playoff_pct(count, summary.trials),
                    playoff_interval: summary.confidence_interval(team.id, INTERVAL_LEVEL)?,
                    next_season_rating: team.next_season_rating(cfg.carryover),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        teams.sort_by(|a, b| b.rating.total_cmp(&a.rating));

        let forecasts = season
            .unresolved()
            .map(|m| MatchForecast {
                date: m.date,
                map: m.map.clone(),
                team1: season.team(m.team1).name.clone(),
                team2: season.team(m.team2).name.clone(),
                t1_prob: m.t1_prob,
                t2_prob: m.t2_prob,
            })
            .collect();

        Ok(SeasonReport {
            k_factor: cfg.k_factor,
            trials: summary.trials,
            playoff_slots: cfg.playoff_slots,
            rating_policy: cfg.rating_policy,
            teams,
            forecasts,
        })
    }

    pub fn team(&self, name: &str) -> Option<&TeamRow> {
        self.teams.iter().find(|t| t.name == name)
    }

    /// Unresolved matches dated no later than a week after `as_of`.
    ///
    /// An `as_of` so late that the window end is unrepresentable lists every
    /// unresolved match.
    pub fn upcoming(&self, as_of: NaiveDateTime) -> impl Iterator<Item = &MatchForecast> {
        let end = as_of.checked_add_signed(Duration::days(UPCOMING_WINDOW_DAYS));
        self.forecasts
            .iter()
            .filter(move |f| end.map_or(true, |end| f.date <= end))
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let name_width = self.teams.iter().map(|t| t.name.len()).max().unwrap_or(4).max(4);

        let _ = writeln!(out, "======Current Elos======");
        for t in &self.teams {
            let _ = writeln!(
                out,
                "{:<name_width$}  {:>5.0}  {:>3}-{:<3}",
                t.name, t.rating, t.wins, t.losses
            );
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "===Playoff Percentage===");
        let mut by_playoffs: Vec<&TeamRow> = self.teams.iter().collect();
        by_playoffs.sort_by(|a, b| b.playoff_count.cmp(&a.playoff_count));
        for t in by_playoffs {
            let _ = writeln!(
                out,
                "{:<name_width$}  {:>5}  ({:.1}% - {:.1}%)",
                t.name,
                t.playoff_pct,
                t.playoff_interval.0 * 100.0,
                t.playoff_interval.1 * 100.0
            );
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "=====Next Season Elo=====");
        for t in &self.teams {
            let _ = writeln!(out, "{:<name_width$}  {:>5.0}", t.name, t.next_season_rating);
        }
        out
    }

    /// Fill the `WEEK_NUMBER`, `ELO_TABLE` and `MATCH_LISTING` placeholders
    /// of an HTML template.
    pub fn render_html(&self, template: &str, week: &str, as_of: NaiveDateTime) -> String {
        let mut elo_table = String::new();
        for t in &self.teams {
            let _ = write!(
                elo_table,
                "<tr><td>{}</td><td>{:.0}</td><td>{}</td></tr>",
                escape_html(&t.name),
                t.rating,
                escape_html(&t.playoff_pct)
            );
        }

        let mut listing = String::new();
        for f in self.upcoming(as_of) {
            let (p1, p2) = (f.t1_prob * 100.0, f.t2_prob * 100.0);
            let _ = write!(
                listing,
                concat!(
                    r#"<div class="match pure-u-1">"#,
                    r#"<div class="match-date pure-g"><div class="pure-u-1">{date}</div></div>"#,
                    r#"<div class="match-text pure-g">"#,
                    r#"<div class="team1 pure-u-1-4 pure-u-sm-1-12">{p1:.0}%</div>"#,
                    r#"<div class="team1 pure-u-3-4 pure-u-sm-1-3">{team1}</div>"#,
                    r#"<div class="pure-u-sm-1-6"></div>"#,
                    r#"<div class="team2 pure-u-3-4 pure-u-sm-1-3">{team2}</div>"#,
                    r#"<div class="team2 pure-u-1-4 pure-u-sm-1-12">{p2:.0}%</div>"#,
                    r#"</div>"#,
                    r#"<div class="prob pure-g">"#,
                    r#"<div class="team1-prob" style="width: {p1:.0}%"></div>"#,
                    r#"<div class="team2-prob" style="width: {p2:.0}%"></div>"#,
                    r#"</div></div>"#,
                ),
                date = f.date.format("%B %d"),
                p1 = p1,
                p2 = p2,
                team1 = escape_html(&f.team1),
                team2 = escape_html(&f.team2),
            );
        }

        template
            .replace("WEEK_NUMBER", &escape_html(week))
            .replace("ELO_TABLE", &elo_table)
            .replace("MATCH_LISTING", &listing)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
