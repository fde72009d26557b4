//! Trial-based black-box optimization used by the train-start and
//! hyperparameter selectors.

pub mod random;
pub mod space;

pub use random::RandomSearch;
pub use space::{Distribution, ParamSpace, ParamSpec};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SelectorError};
use crate::models::{Hypers, ParamValue};
use crate::selection::Direction;

/// Seed used when none is configured.
pub const DEFAULT_SEED: u64 = 123;

/// Source of sampled values for a trial.
pub trait Sampler {
    fn sample(&mut self, distribution: &Distribution) -> ParamValue;
}

/// Handle passed to the objective for one trial. Records every suggested
/// parameter; asking for the same name twice returns the first value.
pub struct Trial<'a> {
    number: usize,
    sampler: &'a mut dyn Sampler,
    params: Hypers,
}

impl<'a> Trial<'a> {
    pub fn new(number: usize, sampler: &'a mut dyn Sampler) -> Self {
        Self {
            number,
            sampler,
            params: Hypers::new(),
        }
    }

    pub fn number(&self) -> usize {
        self.number
    }

    pub fn params(&self) -> &Hypers {
        &self.params
    }

    pub fn into_params(self) -> Hypers {
        self.params
    }

    pub fn suggest(&mut self, name: &str, distribution: &Distribution) -> Result<ParamValue> {
        if let Some(value) = self.params.get(name) {
            return Ok(value.clone());
        }
        distribution.validate(name)?;
        let value = self.sampler.sample(distribution);
        self.params.insert(name.to_string(), value.clone());
        Ok(value)
    }

    /// Integer in `[low, high]` inclusive.
    pub fn suggest_int(&mut self, name: &str, low: i64, high: i64) -> Result<i64> {
        self.suggest(name, &Distribution::IntRange { low, high })?
            .as_i64()
            .ok_or_else(|| SelectorError::config(format!("'{}' was already suggested as a non-integer", name)))
    }

    pub fn suggest_float(&mut self, name: &str, low: f64, high: f64) -> Result<f64> {
        self.suggest(name, &Distribution::Uniform { low, high })?
            .as_f64()
            .ok_or_else(|| SelectorError::config(format!("'{}' was already suggested as text", name)))
    }

    pub fn suggest_categorical(&mut self, name: &str, choices: &[&str]) -> Result<String> {
        let distribution = Distribution::Categorical {
            choices: choices.iter().map(|c| c.to_string()).collect(),
        };
        match self.suggest(name, &distribution)? {
            ParamValue::Text(choice) => Ok(choice),
            other => Err(SelectorError::config(format!(
                "'{}' was already suggested as {}",
                name, other
            ))),
        }
    }
}

/// One completed trial.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialRecord {
    pub number: usize,
    pub score: f64,
    pub params: Hypers,
}

/// Outcome of an optimization run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudyResult {
    pub direction: Direction,
    pub best_score: f64,
    pub best_params: Hypers,
    pub trials: Vec<TrialRecord>,
}

/// Black-box sequential optimizer. Implementations may parallelize
/// internally; callers only see the final result.
pub trait TrialOptimizer {
    fn optimize(
        &mut self,
        direction: Direction,
        n_trials: usize,
        objective: &mut dyn FnMut(&mut Trial<'_>) -> Result<f64>,
    ) -> Result<StudyResult>;
}

/// Optimizer backends selectable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SamplerKind {
    #[default]
    Random,
    /// Tree-structured Parzen estimator. Not available yet.
    Tpe,
}

impl SamplerKind {
    pub fn build(self, seed: u64) -> Result<Box<dyn TrialOptimizer>> {
        match self {
            SamplerKind::Random => Ok(Box::new(RandomSearch::new(seed))),
            SamplerKind::Tpe => Err(SelectorError::NotImplemented(
                "the TPE sampler is not available, use 'random'".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_trial_caches_suggestions() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut trial = Trial::new(0, &mut rng);

        let first = trial.suggest_int("offset", 0, 1000).unwrap();
        let second = trial.suggest_int("offset", 0, 1000).unwrap();
        assert_eq!(first, second);
        assert_eq!(trial.params().len(), 1);

        let choice = trial.suggest_categorical("loss", &["l1", "l2"]).unwrap();
        assert!(choice == "l1" || choice == "l2");
        assert!(trial.suggest_int("loss", 0, 1).is_err());
    }

    #[test]
    fn test_tpe_is_not_implemented() {
        assert!(SamplerKind::Random.build(1).is_ok());
        assert!(matches!(
            SamplerKind::Tpe.build(1),
            Err(SelectorError::NotImplemented(_))
        ));
    }
}
