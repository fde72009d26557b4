use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SelectorError;

/// Whether lower or higher scores are better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Minimize,
    Maximize,
}

impl Direction {
    /// Strict improvement of `candidate` over `incumbent`.
    pub fn is_better(self, candidate: f64, incumbent: f64) -> bool {
        match self {
            Direction::Minimize => candidate < incumbent,
            Direction::Maximize => candidate > incumbent,
        }
    }

    /// `candidate` is at least as good as `incumbent`.
    pub fn is_at_least_as_good(self, candidate: f64, incumbent: f64) -> bool {
        match self {
            Direction::Minimize => candidate <= incumbent,
            Direction::Maximize => candidate >= incumbent,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Minimize => write!(f, "minimize"),
            Direction::Maximize => write!(f, "maximize"),
        }
    }
}

impl FromStr for Direction {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "minimize" => Ok(Direction::Minimize),
            "maximize" => Ok(Direction::Maximize),
            other => Err(SelectorError::config(format!(
                "invalid direction '{}', expected 'minimize' or 'maximize'",
                other
            ))),
        }
    }
}

/// Whether the feature search grows or shrinks the feature list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Start empty, add from the front of the list.
    #[default]
    Adding,
    /// Start full, remove from the back of the list.
    Removing,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Adding => write!(f, "adding"),
            Strategy::Removing => write!(f, "removing"),
        }
    }
}

impl FromStr for Strategy {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "adding" => Ok(Strategy::Adding),
            "removing" => Ok(Strategy::Removing),
            other => Err(SelectorError::config(format!(
                "invalid strategy '{}', expected 'adding' or 'removing'",
                other
            ))),
        }
    }
}
