use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::error::{checked_score, Result, SelectorError};
use crate::models::{display_hypers, ParamValue};
use crate::optimizer::{Distribution, Sampler, StudyResult, Trial, TrialOptimizer, TrialRecord};
use crate::selection::Direction;

impl Sampler for StdRng {
    fn sample(&mut self, distribution: &Distribution) -> ParamValue {
        distribution.sample(self)
    }
}

/// Seeded random search: every trial samples independently.
pub struct RandomSearch {
    rng: StdRng,
}

impl RandomSearch {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl TrialOptimizer for RandomSearch {
    fn optimize(
        &mut self,
        direction: Direction,
        n_trials: usize,
        objective: &mut dyn FnMut(&mut Trial<'_>) -> Result<f64>,
    ) -> Result<StudyResult> {
        if n_trials == 0 {
            return Err(SelectorError::config("n_trials must be at least 1"));
        }

        let mut trials: Vec<TrialRecord> = Vec::with_capacity(n_trials);
        let mut best_idx = 0;

        for number in 0..n_trials {
            let mut trial = Trial::new(number, &mut self.rng);
            let score = checked_score(objective(&mut trial)?)?;
            let params = trial.into_params();

            debug!(trial = number, score, params = %display_hypers(&params), "Finished trial");

            if number == 0 || direction.is_better(score, trials[best_idx].score) {
                best_idx = number;
                if number > 0 {
                    info!(
                        "[{}/{}] New best: score={:.5} {}",
                        number + 1,
                        n_trials,
                        score,
                        display_hypers(&params)
                    );
                }
            }

            trials.push(TrialRecord {
                number,
                score,
                params,
            });
        }

        let best = &trials[best_idx];
        Ok(StudyResult {
            direction,
            best_score: best.score,
            best_params: best.params.clone(),
            trials,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finds_minimum_of_quadratic() {
        let mut search = RandomSearch::new(42);
        let study = search
            .optimize(Direction::Minimize, 500, &mut |trial: &mut Trial<'_>| -> Result<f64> {
                let x = trial.suggest_float("x", -5.0, 5.0)?;
                Ok((x - 1.0).powi(2))
            })
            .unwrap();

        assert_eq!(study.trials.len(), 500);
        let x = study.best_params["x"].as_f64().unwrap();
        assert!((x - 1.0).abs() < 0.2, "best x = {}", x);
        assert!(study.trials.iter().all(|t| t.score >= study.best_score));
    }

    #[test]
    fn test_maximize_keeps_first_of_ties() {
        let mut search = RandomSearch::new(1);
        let study = search
            .optimize(Direction::Maximize, 5, &mut |trial: &mut Trial<'_>| -> Result<f64> {
                trial.suggest_int("k", 0, 3)?;
                Ok(1.0)
            })
            .unwrap();
        assert_eq!(study.best_params, study.trials[0].params);
    }

    #[test]
    fn test_same_seed_is_reproducible() {
        let run = |seed| {
            let mut search = RandomSearch::new(seed);
            search
                .optimize(Direction::Minimize, 10, &mut |trial: &mut Trial<'_>| -> Result<f64> {
                    Ok(trial.suggest_int("k", 0, 100)? as f64)
                })
                .unwrap()
        };
        assert_eq!(run(9), run(9));
    }

    #[test]
    fn test_errors_propagate() {
        let mut search = RandomSearch::new(1);
        let zero = search.optimize(Direction::Minimize, 0, &mut |_: &mut Trial<'_>| -> Result<f64> {
            Ok(0.0)
        });
        assert!(matches!(zero, Err(SelectorError::Configuration(_))));

        let nan = search.optimize(Direction::Minimize, 3, &mut |_: &mut Trial<'_>| -> Result<f64> {
            Ok(f64::NAN)
        });
        assert!(matches!(nan, Err(SelectorError::Evaluation(_))));
    }
}
