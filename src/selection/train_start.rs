//! Search for where useful signal starts in a time-ordered table.
//!
//! Old data may no longer be representative, so the start of the training
//! window is searched over. The table must be sorted oldest first.

use chrono::NaiveDateTime;
use tracing::info;

use crate::error::{Result, SelectorError};
use crate::evaluation::{evaluate_checked, Evaluator};
use crate::models::EvaluationContext;
use crate::optimizer::{RandomSearch, StudyResult, Trial, TrialOptimizer, DEFAULT_SEED};
use crate::selection::direction::Direction;
use crate::selection::selector::{Assumption, ContextUpdate, Selector};

/// Name of the sampled row offset.
pub const OFFSET_PARAM: &str = "iloc_start";

pub struct TrainStartSelector {
    /// Rows at the tail reserved for evaluation.
    pub eval_window_rows: usize,
    /// Minimum rows between the chosen start and the evaluation window.
    pub min_train_rows: usize,
    pub direction: Direction,
    pub n_trials: usize,
    optimizer: Box<dyn TrialOptimizer>,
    study: Option<StudyResult>,
}

impl TrainStartSelector {
    pub fn new(eval_window_rows: usize) -> Self {
        Self {
            eval_window_rows,
            min_train_rows: 1000,
            direction: Direction::Minimize,
            n_trials: 30,
            optimizer: Box::new(RandomSearch::new(DEFAULT_SEED)),
            study: None,
        }
    }

    pub fn with_min_train_rows(mut self, min_train_rows: usize) -> Self {
        self.min_train_rows = min_train_rows;
        self
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

    /// Trials of the last completed run.
    pub fn study(&self) -> Option<&StudyResult> {
        self.study.as_ref()
    }

    /// Inclusive upper bound of the start offset for a table of `rows` rows.
    /// Every offset in range leaves at least one row.
    pub fn max_offset(&self, rows: usize) -> Result<usize> {
        rows.checked_sub(self.eval_window_rows)
            .and_then(|r| r.checked_sub(self.min_train_rows))
            .filter(|&upper| upper < rows)
            .ok_or_else(|| {
                SelectorError::config(format!(
                    "no feasible train start: {} rows cannot hold an evaluation window of {} and {} training rows",
                    rows, self.eval_window_rows, self.min_train_rows
                ))
            })
    }

    /// Return the index timestamp of the best training-window start. The
    /// context's `df` is left as it was passed in.
    pub fn run(
        &mut self,
        eval_func: &mut dyn Evaluator,
        ctx: &mut EvaluationContext,
    ) -> Result<NaiveDateTime> {
        if !ctx.df.is_time_ordered() {
            return Err(SelectorError::config(
                "df must be sorted oldest first to search a train start",
            ));
        }
        let max_offset = self.max_offset(ctx.df.len())?;
        let upper = i64::try_from(max_offset)
            .map_err(|_| SelectorError::config("train start range does not fit in i64"))?;

        let original = ctx.df.clone();
        let study = self.optimizer.optimize(
            self.direction,
            self.n_trials,
            &mut |trial: &mut Trial<'_>| -> Result<f64> {
                let offset = trial.suggest_int(OFFSET_PARAM, 0, upper)?;
                let offset = usize::try_from(offset)
                    .ok()
                    .filter(|&o| o <= max_offset)
                    .ok_or_else(|| {
                        SelectorError::evaluation(format!(
                            "sampled train start offset {} outside 0..={}",
                            offset, max_offset
                        ))
                    })?;
                ctx.df = original.slice_from(offset);
                evaluate_checked(&mut *eval_func, ctx)
            },
        );
        ctx.df = original;
        let study = study?;

        let raw = study
            .best_params
            .get(OFFSET_PARAM)
            .and_then(|v| v.as_i64())
            .ok_or_else(|| SelectorError::evaluation("optimizer returned no train start offset"))?;
        let offset = usize::try_from(raw)
            .ok()
            .filter(|&o| o <= max_offset)
            .ok_or_else(|| {
                SelectorError::evaluation(format!(
                    "optimizer returned train start offset {} outside 0..={}",
                    raw, max_offset
                ))
            })?;
        let start = ctx.df.index().get(offset).copied().ok_or_else(|| {
            SelectorError::evaluation(format!("train start offset {} past the end of df", offset))
        })?;

        info!(
            offset,
            start = %start,
            score = study.best_score,
            "Selected train start"
        );
        self.study = Some(study);
        Ok(start)
    }
}

impl Selector for TrainStartSelector {
    fn name(&self) -> &str {
        "TrainStartSelector"
    }

    fn context_update(&self) -> ContextUpdate {
        ContextUpdate::TrainingWindow
    }

    fn run(
        &mut self,
        eval_func: &mut dyn Evaluator,
        ctx: &mut EvaluationContext,
    ) -> Result<Assumption> {
        TrainStartSelector::run(self, eval_func, ctx).map(Assumption::TrainStart)
    }

    fn study(&self) -> Option<&StudyResult> {
        self.study.as_ref()
    }
}
