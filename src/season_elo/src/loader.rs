//! Season schedule loading.
//!
//! Turns raw schedule rows into a [`Season`]: matches sorted by date, one
//! [`Team`] per distinct name, and win/loss tallies for completed matches.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{Result, SeasonError};
use crate::fixture::Match;
use crate::season::Season;
use crate::starting_ratings::StartingRatings;
use crate::team::{Team, TeamId};

/// One row of the season schedule, as found in the input file.
///
/// An empty `score` means the match has not been played yet.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct RawMatch {
    #[serde(rename = "Home")]
    pub home: String,
    #[serde(rename = "Away")]
    pub away: String,
    #[serde(rename = "Map", default)]
    pub map: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Score", default)]
    pub score: String,
}

impl RawMatch {
    pub fn new(home: &str, away: &str, map: &str, date: &str, score: &str) -> Self {
        RawMatch {
            home: home.to_string(),
            away: away.to_string(),
            map: map.to_string(),
            date: date.to_string(),
            score: score.to_string(),
        }
    }
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%B %d, %Y", "%b %d, %Y", "%B %d %Y"];

/// Parse a schedule date. Date-only values are taken as midnight.
pub fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Parse a `"<int>-<int>"` score. Empty means unplayed.
pub fn parse_score(raw: &str) -> std::result::Result<Option<(u32, u32)>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let parts: Vec<&str> = raw.split('-').collect();
    if parts.len() != 2 {
        return Err("expected `<home>-<away>`".to_string());
    }
    let home = parts[0].trim().parse::<u32>().map_err(|e| e.to_string())?;
    let away = parts[1].trim().parse::<u32>().map_err(|e| e.to_string())?;
    Ok(Some((home, away)))
}

struct ParsedRecord {
    record: usize,
    raw: RawMatch,
    date: NaiveDateTime,
    score: Option<(u32, u32)>,
}

fn parse_record(record: usize, raw: RawMatch) -> Result<ParsedRecord> {
    for (field, value) in [("home team", &raw.home), ("away team", &raw.away)] {
        if value.trim().is_empty() {
            return Err(SeasonError::Parse {
                record,
                field,
                value: value.clone(),
                message: "team name is empty".to_string(),
            });
        }
    }

    if raw.home.trim() == raw.away.trim() {
        return Err(SeasonError::Data {
            record,
            team1: raw.home.clone(),
            team2: raw.away.clone(),
            message: "a team cannot play itself".to_string(),
        });
    }

    let date = parse_date(&raw.date).ok_or_else(|| SeasonError::Parse {
        record,
        field: "date",
        value: raw.date.clone(),
        message: "unrecognized date format".to_string(),
    })?;

    let score = parse_score(&raw.score).map_err(|message| SeasonError::Parse {
        record,
        field: "score",
        value: raw.score.clone(),
        message,
    })?;

    if let Some((home, away)) = score {
        if home == away {
            return Err(SeasonError::Data {
                record,
                team1: raw.home.clone(),
                team2: raw.away.clone(),
                message: format!("equal scores {home}-{away}, ties are not supported"),
            });
        }
    }

    Ok(ParsedRecord {
        record,
        raw,
        date,
        score,
    })
}

/// Build a season from raw records in input order.
///
/// Any malformed record aborts the whole load.
pub fn load_season(records: Vec<RawMatch>, starting: &StartingRatings) -> Result<Season> {
    let mut parsed = records
        .into_iter()
        .enumerate()
        .map(|(i, raw)| parse_record(i + 1, raw))
        .collect::<Result<Vec<_>>>()?;

    // Stable: same-date matches keep their input order.
    parsed.sort_by(|a, b| a.date.cmp(&b.date));

    let mut teams: Vec<Team> = Vec::new();
    let mut index: HashMap<String, TeamId> = HashMap::new();
    let mut register = |name: &str| -> TeamId {
        if let Some(&id) = index.get(name) {
            return id;
        }
        let id = TeamId(teams.len());
        teams.push(Team::new(id, name, starting.get(name)));
        index.insert(name.to_string(), id);
        id
    };

    let mut matches = Vec::with_capacity(parsed.len());
    for rec in parsed {
        let team1 = register(rec.raw.home.trim());
        let team2 = register(rec.raw.away.trim());
        let mut m = Match::new(team1, team2, rec.raw.map.trim(), rec.date);
        if let Some((s1, s2)) = rec.score {
            m.set_scores(s1, s2);
        }
        debug!(
            record = rec.record,
            home = %rec.raw.home,
            away = %rec.raw.away,
            completed = m.completed,
            "loaded match"
        );
        matches.push(m);
    }

    for m in &matches {
        if let (Some(winner), Some(loser)) = (m.winner, m.loser()) {
            teams[winner.index()].record_win();
            teams[loser.index()].record_loss();
        }
    }

    let season = Season::from_parts(teams, matches)?;
    info!(
        teams = season.teams().len(),
        matches = season.matches().len(),
        completed = season.completed_count(),
        "season loaded"
    );
    Ok(season)
}

/// Deserialize schedule rows from any reader. `source` names the input in errors.
pub fn read_records<R: Read>(reader: R, source: &Path) -> Result<Vec<RawMatch>> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
        .deserialize::<RawMatch>()
        .map(|row| {
            row.map_err(|e| SeasonError::Csv {
                path: source.to_path_buf(),
                source: e,
            })
        })
        .collect()
}

/// Read a schedule file with a `Home,Away,Map,Date,Score` header.
pub fn read_season_file(path: impl AsRef<Path>) -> Result<Vec<RawMatch>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|source| SeasonError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_records(file, path)
}

pub fn read_season(path: impl AsRef<Path>, starting: &StartingRatings) -> Result<Season> {
    load_season(read_season_file(path)?, starting)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2017, 2, 12)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap();
        for raw in [
            "2017-02-12",
            "02/12/2017",
            "February 12, 2017",
            "Feb 12, 2017",
            " 2017-02-12 ",
        ] {
            assert_eq!(parse_date(raw), Some(expected), "{raw}");
        }

        let evening = NaiveDate::from_ymd_opt(2017, 2, 12)
            .and_then(|d| d.and_hms_opt(21, 30, 0))
            .unwrap();
        for raw in [
            "2017-02-12 21:30",
            "2017-02-12T21:30:00",
            "02/12/2017 21:30",
            "2017-02-12T21:30:00Z",
        ] {
            assert_eq!(parse_date(raw), Some(evening), "{raw}");
        }

        assert_eq!(parse_date("next tuesday"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_parse_score() {
        assert_eq!(parse_score(""), Ok(None));
        assert_eq!(parse_score("5-0"), Ok(Some((5, 0))));
        assert_eq!(parse_score(" 2 - 3 "), Ok(Some((2, 3))));
        assert!(parse_score("5").is_err());
        assert!(parse_score("5-0-1").is_err());
        assert!(parse_score("a-b").is_err());
        assert!(parse_score("-1-2").is_err());
    }

    #[test]
    fn test_sorted_stably_by_date() {
        let records = vec![
            RawMatch::new("C", "D", "m3", "2017-01-08", ""),
            RawMatch::new("A", "B", "m1", "2017-01-01", "5-0"),
            RawMatch::new("B", "C", "m2", "2017-01-01", "1-3"),
            RawMatch::new("D", "A", "m4", "2017-01-08", ""),
        ];
        let season = load_season(records, &StartingRatings::new()).unwrap();
        let maps: Vec<&str> = season.matches().iter().map(|m| m.map.as_str()).collect();
        assert_eq!(maps, ["m1", "m2", "m3", "m4"]);
    }

    #[test]
    fn test_registers_both_teams_and_tallies() {
        let records = vec![
            RawMatch::new("A", "B", "m1", "2017-01-01", "5-0"),
            RawMatch::new("C", "A", "m2", "2017-01-02", "3-2"),
            RawMatch::new("B", "D", "m3", "2017-01-09", ""),
        ];
        let mut starting = StartingRatings::new();
        starting.insert("C", 1600.0);
        let season = load_season(records, &starting).unwrap();

        assert_eq!(season.teams().len(), 4);
        let a = season.team_by_name("A").unwrap();
        let b = season.team_by_name("B").unwrap();
        let c = season.team_by_name("C").unwrap();
        let d = season.team_by_name("D").unwrap();
        assert_eq!((a.wins, a.losses), (1, 1));
        assert_eq!((b.wins, b.losses), (0, 1));
        assert_eq!((c.wins, c.losses), (1, 0));
        assert_eq!((d.wins, d.losses), (0, 0));
        assert_eq!(c.rating, 1600.0);
        assert_eq!(d.rating, 1500.0);
        assert_eq!(season.completed_count(), 2);
    }

    #[test]
    fn test_malformed_score_aborts() {
        let records = vec![
            RawMatch::new("A", "B", "m1", "2017-01-01", "5-0"),
            RawMatch::new("A", "B", "m2", "2017-01-02", "5:0"),
        ];
        match load_season(records, &StartingRatings::new()).unwrap_err() {
            SeasonError::Parse { record, field, .. } => {
                assert_eq!(record, 2);
                assert_eq!(field, "score");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_malformed_date_aborts() {
        let records = vec![RawMatch::new("A", "B", "m1", "someday", "")];
        match load_season(records, &StartingRatings::new()).unwrap_err() {
            SeasonError::Parse { field, value, .. } => {
                assert_eq!(field, "date");
                assert_eq!(value, "someday");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_tied_score_is_data_error() {
        let records = vec![RawMatch::new("froyotech", "Ascent", "m1", "2017-01-01", "2-2")];
        match load_season(records, &StartingRatings::new()).unwrap_err() {
            SeasonError::Data { record, team1, team2, message } => {
                assert_eq!(record, 1);
                assert_eq!(team1, "froyotech");
                assert_eq!(team2, "Ascent");
                assert!(message.contains("2-2"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_team_playing_itself_is_data_error() {
        let records = vec![
            RawMatch::new("froyotech", "Ascent", "m1", "2017-01-01", "5-0"),
            RawMatch::new("Ascent", " Ascent ", "m2", "2017-01-08", "5-0"),
        ];
        match load_season(records, &StartingRatings::new()).unwrap_err() {
            SeasonError::Data { record, team1, .. } => {
                assert_eq!(record, 2);
                assert_eq!(team1, "Ascent");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_read_records_csv() {
        let text = "Home,Away,Map,Date,Score\n\
                    froyotech,Ascent,cp_process_final,2017-01-01,5-0\n\
                    Ascent,froyotech,cp_snakewater_final1,2017-01-08,\n";
        let records = read_records(text.as_bytes(), Path::new("season.csv")).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].score, "5-0");
        assert_eq!(records[1].score, "");
        assert_eq!(records[1].home, "Ascent");
    }

    #[test]
    fn test_read_records_missing_column() {
        let text = "Home,Away,Map,Score\nA,B,m1,5-0\n";
        let err = read_records(text.as_bytes(), Path::new("season.csv")).unwrap_err();
        assert!(matches!(err, SeasonError::Csv { .. }));
    }
}
