use tracing::info;

use crate::error::{Result, SelectorError};
use crate::evaluation::{evaluate_checked, Evaluator};
use crate::models::{display_hypers, EvaluationContext, Hypers};
use crate::optimizer::{ParamSpace, RandomSearch, StudyResult, Trial, TrialOptimizer, DEFAULT_SEED};
use crate::selection::direction::Direction;
use crate::selection::selector::{Assumption, ContextUpdate, Selector};

/// Builds a hyperparameter assignment from a trial at run time.
pub type DefineByRun = Box<dyn FnMut(&mut Trial<'_>) -> Result<Hypers>>;

/// Where the tuner's hyperparameter assignments come from.
pub enum TunerSpace {
    /// Fixed list of named distributions.
    Declarative(ParamSpace),
    /// Assignment constructed by a closure for each trial.
    DefineByRun(DefineByRun),
}

impl From<ParamSpace> for TunerSpace {
    fn from(space: ParamSpace) -> Self {
        TunerSpace::Declarative(space)
    }
}

/// Hyperparameter search that never returns a tuned set worse than the
/// model's defaults.
pub struct Tuner {
    pub space: TunerSpace,
    pub direction: Direction,
    pub n_trials: usize,
    optimizer: Box<dyn TrialOptimizer>,
    baseline_score: Option<f64>,
    study: Option<StudyResult>,
}

impl Tuner {
    pub fn new(space: impl Into<TunerSpace>) -> Self {
        Self {
            space: space.into(),
            direction: Direction::Minimize,
            n_trials: 30,
            optimizer: Box::new(RandomSearch::new(DEFAULT_SEED)),
            baseline_score: None,
            study: None,
        }
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_n_trials(mut self, n_trials: usize) -> Self {
        self.n_trials = n_trials;
        self
    }

    pub fn with_optimizer(mut self, optimizer: Box<dyn TrialOptimizer>) -> Self {
        self.optimizer = optimizer;
        self
    }

    /// Score with default hyperparameters from the last run.
    pub fn baseline_score(&self) -> Option<f64> {
        self.baseline_score
    }

    pub fn study(&self) -> Option<&StudyResult> {
        self.study.as_ref()
    }

    /// Return the best hyperparameters, or an empty set when the defaults
    /// score at least as well. The context's `hypers` is left as it was.
    pub fn run(
        &mut self,
        eval_func: &mut dyn Evaluator,
        ctx: &mut EvaluationContext,
    ) -> Result<Hypers> {
        if let TunerSpace::Declarative(space) = &self.space {
            space.validate()?;
        }
        if self.n_trials == 0 {
            return Err(SelectorError::config("n_trials must be at least 1"));
        }

        let original = std::mem::take(&mut ctx.hypers);
        let outcome = self.search(eval_func, ctx);
        ctx.hypers = original;
        outcome
    }

    fn search(
        &mut self,
        eval_func: &mut dyn Evaluator,
        ctx: &mut EvaluationContext,
    ) -> Result<Hypers> {
        let baseline = evaluate_checked(eval_func, ctx)?;
        info!(score = baseline, "Tuner baseline with default hyperparameters");

        let space = &mut self.space;
        let study = self.optimizer.optimize(
            self.direction,
            self.n_trials,
            &mut |trial: &mut Trial<'_>| -> Result<f64> {
                ctx.hypers = match &mut *space {
                    TunerSpace::Declarative(space) => space.suggest(trial)?,
                    TunerSpace::DefineByRun(build) => build(trial)?,
                };
                evaluate_checked(&mut *eval_func, ctx)
            },
        )?;

        let chosen = if self.direction.is_at_least_as_good(baseline, study.best_score) {
            info!(
                baseline,
                best_trial = study.best_score,
                "Defaults are at least as good as any trial, keeping defaults"
            );
            Hypers::new()
        } else {
            info!(
                baseline,
                best_trial = study.best_score,
                "Tuned hyperparameters: {}",
                display_hypers(&study.best_params)
            );
            study.best_params.clone()
        };

        self.baseline_score = Some(baseline);
        self.study = Some(study);
        Ok(chosen)
    }
}

impl Selector for Tuner {
    fn name(&self) -> &str {
        "Tuner"
    }

    fn context_update(&self) -> ContextUpdate {
        ContextUpdate::Hyperparameters
    }

    fn run(
        &mut self,
        eval_func: &mut dyn Evaluator,
        ctx: &mut EvaluationContext,
    ) -> Result<Assumption> {
        Tuner::run(self, eval_func, ctx).map(Assumption::Hypers)
    }

    fn study(&self) -> Option<&StudyResult> {
        self.study.as_ref()
    }
}
