use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::constants::DEFAULT_RATING;
use crate::error::{Result, SeasonError};

/// Known ratings to seed teams with at the start of a season.
///
/// Teams missing from the table start at [`DEFAULT_RATING`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StartingRatings {
    ratings: HashMap<String, f64>,
}

impl StartingRatings {
    pub fn new() -> Self {
        StartingRatings {
            ratings: HashMap::new(),
        }
    }

    /// Read ratings from a CSV file.
    /// Format: team,rating
    ///
    /// A first line whose rating column is not a number is taken as a header
    /// and skipped. Ratings must be finite.
    pub fn read_from_file(&mut self, filepath: impl AsRef<Path>) -> Result<()> {
        let path = filepath.as_ref();
        let file = File::open(path).map_err(|source| SeasonError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.read_from(BufReader::new(file), path)
    }

    fn read_from<R: BufRead>(&mut self, reader: R, path: &Path) -> Result<()> {
        let mut seen_row = false;
        for (i, line) in reader.lines().enumerate() {
            let line = line.map_err(|source| SeasonError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            // Team names may contain commas; the rating is always the last field.
            let Some((name, rating)) = line.rsplit_once(',') else {
                return Err(SeasonError::Parse {
                    record: i + 1,
                    field: "starting rating",
                    value: line.to_string(),
                    message: "expected `team,rating`".to_string(),
                });
            };
            let first_row = !seen_row;
            seen_row = true;

            let value = rating.trim();
            let rating: f64 = match value.parse() {
                Ok(rating) => rating,
                Err(_) if first_row => continue,
                Err(e) => {
                    return Err(SeasonError::Parse {
                        record: i + 1,
                        field: "starting rating",
                        value: value.to_string(),
                        message: format!("{e}"),
                    })
                }
            };
            if !rating.is_finite() {
                return Err(SeasonError::Parse {
                    record: i + 1,
                    field: "starting rating",
                    value: value.to_string(),
                    message: "rating must be finite".to_string(),
                });
            }

            self.insert(name.trim(), rating);
        }

        Ok(())
    }

    /// Add or replace the starting rating for a team.
    pub fn insert(&mut self, name: &str, rating: f64) {
        self.ratings.insert(name.to_string(), rating);
    }

    /// Copy every entry of `other` into this table, replacing duplicates.
    pub fn merge(&mut self, other: &StartingRatings) {
        self.ratings
            .extend(other.ratings.iter().map(|(name, &rating)| (name.clone(), rating)));
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.ratings.get(name).copied()
    }

    /// Starting rating for a team, falling back to the default.
    pub fn rating_for(&self, name: &str) -> f64 {
        self.get(name).unwrap_or(DEFAULT_RATING)
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }
}

impl From<HashMap<String, f64>> for StartingRatings {
    fn from(ratings: HashMap<String, f64>) -> Self {
        StartingRatings { ratings }
    }
}
