//! IPL score prediction
//!
//! Encodes in-progress first-innings match state into the fixed feature
//! vector a pre-trained regression model expects, and turns the model's
//! estimate into a predicted score range.

pub mod features;
pub mod model;
pub mod predict;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// An IPL franchise known to the score model.
///
/// Variant order is the one-hot order the model was trained on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Team {
    ChennaiSuperKings,
    DelhiDaredevils,
    KingsXiPunjab,
    KolkataKnightRiders,
    MumbaiIndians,
    RajasthanRoyals,
    RoyalChallengersBangalore,
    SunrisersHyderabad,
}

impl Team {
    /// Number of teams in the enumeration
    pub const COUNT: usize = 8;

    /// All teams in model order
    pub const ALL: [Team; Team::COUNT] = [
        Team::ChennaiSuperKings,
        Team::DelhiDaredevils,
        Team::KingsXiPunjab,
        Team::KolkataKnightRiders,
        Team::MumbaiIndians,
        Team::RajasthanRoyals,
        Team::RoyalChallengersBangalore,
        Team::SunrisersHyderabad,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Team::ChennaiSuperKings => "Chennai Super Kings",
            Team::DelhiDaredevils => "Delhi Daredevils",
            Team::KingsXiPunjab => "Kings XI Punjab",
            Team::KolkataKnightRiders => "Kolkata Knight Riders",
            Team::MumbaiIndians => "Mumbai Indians",
            Team::RajasthanRoyals => "Rajasthan Royals",
            Team::RoyalChallengersBangalore => "Royal Challengers Bangalore",
            Team::SunrisersHyderabad => "Sunrisers Hyderabad",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Team::ChennaiSuperKings => "CSK",
            Team::DelhiDaredevils => "DD",
            Team::KingsXiPunjab => "KXIP",
            Team::KolkataKnightRiders => "KKR",
            Team::MumbaiIndians => "MI",
            Team::RajasthanRoyals => "RR",
            Team::RoyalChallengersBangalore => "RCB",
            Team::SunrisersHyderabad => "SRH",
        }
    }

    /// Look up a team by full name or short code (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        let needle = name.trim().to_lowercase();
        Team::ALL.into_iter().find(|t| {
            t.name().to_lowercase() == needle || t.code().to_lowercase() == needle
        })
    }

    /// Teams that may bowl against `batting`
    pub fn bowling_options(batting: Team) -> Vec<Team> {
        Team::ALL.into_iter().filter(|t| *t != batting).collect()
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Team {
    type Err = IplError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Team::from_name(s).ok_or_else(|| IplError::UnknownTeam(s.to_string()))
    }
}

/// Application-wide errors
#[derive(Debug, Error)]
pub enum IplError {
    #[error("Invalid selection: {0} cannot bat and bowl in the same innings")]
    InvalidSelection(Team),

    #[error("Invalid overs {overs}: an over has only 6 balls (.0 to .5)")]
    InvalidOversFormat { overs: f64 },

    #[error("Feature vector has {actual} values, model expects {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Failed to load score model: {0}")]
    ModelLoad(String),

    #[error("Score model returned a non-finite estimate: {0}")]
    NonFiniteEstimate(f32),

    #[error("Unknown team: {0}")]
    UnknownTeam(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, IplError>;

/// Application configuration loaded from config.toml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub model: ModelConfig,
    pub prediction: PredictionConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Artifact path without extension (`.mpk` record + `.json` metadata)
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionConfig {
    /// Half-width of the displayed score range
    pub range_margin: i32,
    /// Reject overs like 10.7 instead of only warning
    pub strict_overs: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            model: ModelConfig {
                path: "model/ipl_score_model".to_string(),
            },
            prediction: PredictionConfig {
                range_margin: 5,
                strict_overs: false,
            },
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            IplError::Config(format!("Failed to read config file {}: {}", path, e))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| IplError::Config(format!("Failed to parse config: {}", e)))?;

        if config.prediction.range_margin < 0 {
            return Err(IplError::Config(format!(
                "range_margin must not be negative, got {}",
                config.prediction.range_margin
            )));
        }
        Ok(config)
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| IplError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
