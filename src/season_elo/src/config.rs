// Engine configuration, loaded from an optional TOML file and CLI overrides.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::constants::{
    DEFAULT_K_FACTOR, DEFAULT_PLAYOFF_SLOTS, DEFAULT_SIMULATIONS, SEASON_CARRYOVER, TIE_JITTER,
};
use crate::simulation::RatingPolicy;
use crate::starting_ratings::StartingRatings;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },
}

/// Everything a single run needs besides the season itself.
///
/// Every field has a default, so an empty TOML file is a valid config.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub k_factor: f64,
    pub simulations: usize,
    pub playoff_slots: usize,
    pub rating_policy: RatingPolicy,

    /// Master seed for the trial RNGs. `None` draws one from the OS.
    pub seed: Option<u64>,

    pub tie_jitter: f64,
    pub carryover: f64,
    pub starting_ratings: HashMap<String, f64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            k_factor: DEFAULT_K_FACTOR,
            simulations: DEFAULT_SIMULATIONS,
            playoff_slots: DEFAULT_PLAYOFF_SLOTS,
            rating_policy: RatingPolicy::default(),
            seed: None,
            tie_jitter: TIE_JITTER,
            carryover: SEASON_CARRYOVER,
            starting_ratings: HashMap::new(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.k_factor.is_finite() || self.k_factor <= 0.0 {
            return Err(invalid(
                "k_factor",
                format!("must be a positive number, got {}", self.k_factor),
            ));
        }
        if self.simulations == 0 {
            return Err(invalid("simulations", "must be at least 1"));
        }
        if self.playoff_slots == 0 {
            return Err(invalid("playoff_slots", "must be at least 1"));
        }
        if !self.tie_jitter.is_finite() || self.tie_jitter < 0.0 {
            return Err(invalid(
                "tie_jitter",
                format!("must be >= 0, got {}", self.tie_jitter),
            ));
        }
        if !(0.0..=1.0).contains(&self.carryover) {
            return Err(invalid(
                "carryover",
                format!("must be within [0, 1], got {}", self.carryover),
            ));
        }
        if let Some((name, rating)) = self.starting_ratings.iter().find(|(_, r)| !r.is_finite()) {
            return Err(invalid(
                "starting_ratings",
                format!("rating for `{name}` is not finite: {rating}"),
            ));
        }
        Ok(())
    }

    pub fn starting_ratings(&self) -> StartingRatings {
        StartingRatings::from(self.starting_ratings.clone())
    }
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_string(),
        message: message.into(),
    }
}

/// Parse and validate a config from TOML text.
pub fn parse_config(text: &str, path: &Path) -> Result<EngineConfig, ConfigError> {
    let config: EngineConfig = toml::from_str(text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;
    config.validate()?;
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<EngineConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })?;
    parse_config(&text, path)
}
