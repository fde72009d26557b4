use std::collections::HashSet;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SelectorError};
use crate::models::{Hypers, ParamValue};
use crate::optimizer::Trial;

/// How a single parameter is sampled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Distribution {
    Uniform { low: f64, high: f64 },
    LogUniform { low: f64, high: f64 },
    IntRange { low: i64, high: i64 },
    Categorical { choices: Vec<String> },
}

impl Distribution {
    pub fn validate(&self, name: &str) -> Result<()> {
        let problem = match self {
            Distribution::Uniform { low, high } if !(low <= high) => {
                Some(format!("low {} exceeds high {}", low, high))
            }
            Distribution::LogUniform { low, high } if !(*low > 0.0 && low <= high) => {
                Some(format!("needs 0 < low <= high, got [{}, {}]", low, high))
            }
            Distribution::IntRange { low, high } if low > high => {
                Some(format!("low {} exceeds high {}", low, high))
            }
            Distribution::Categorical { choices } if choices.is_empty() => {
                Some("no choices".to_string())
            }
            _ => None,
        };

        match problem {
            Some(msg) => Err(SelectorError::config(format!(
                "invalid distribution for '{}': {}",
                name, msg
            ))),
            None => Ok(()),
        }
    }

    /// Draw one value. Bounds are inclusive; call `validate` first.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> ParamValue {
        match self {
            Distribution::Uniform { low, high } => ParamValue::Float(rng.gen_range(*low..=*high)),
            Distribution::LogUniform { low, high } => {
                let log = rng.gen_range(low.ln()..=high.ln());
                ParamValue::Float(log.exp().clamp(*low, *high))
            }
            Distribution::IntRange { low, high } => ParamValue::Int(rng.gen_range(*low..=*high)),
            Distribution::Categorical { choices } => {
                ParamValue::Text(choices[rng.gen_range(0..choices.len())].clone())
            }
        }
    }
}

/// One named entry of a search space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    #[serde(flatten)]
    pub distribution: Distribution,
}

/// Declarative hyperparameter space.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamSpace {
    pub specs: Vec<ParamSpec>,
}

impl ParamSpace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, name: impl Into<String>, distribution: Distribution) -> Self {
        self.specs.push(ParamSpec {
            name: name.into(),
            distribution,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Reject empty spaces, duplicate names and malformed bounds.
    pub fn validate(&self) -> Result<()> {
        if self.specs.is_empty() {
            return Err(SelectorError::config("hyperparameter space is empty"));
        }

        let mut seen = HashSet::new();
        for spec in &self.specs {
            if !seen.insert(spec.name.as_str()) {
                return Err(SelectorError::config(format!(
                    "hyperparameter '{}' is declared twice",
                    spec.name
                )));
            }
            spec.distribution.validate(&spec.name)?;
        }
        Ok(())
    }

    /// Sample every entry through the trial so the optimizer records it.
    pub fn suggest(&self, trial: &mut Trial<'_>) -> Result<Hypers> {
        let mut hypers = Hypers::new();
        for spec in &self.specs {
            let value = trial.suggest(&spec.name, &spec.distribution)?;
            hypers.insert(spec.name.clone(), value);
        }
        Ok(hypers)
    }
}
