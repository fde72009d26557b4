use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::error::Result;
use crate::evaluation::Evaluator;
use crate::models::{EvaluationContext, Hypers, ParamValue};
use crate::optimizer::StudyResult;

/// Candidate-set size → best score observed at that size.
pub type ResultTrace = BTreeMap<usize, f64>;

/// Which field of the evaluation context a selector's result rebinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextUpdate {
    TrainingWindow,
    FeatureList,
    Hyperparameters,
    None,
}

/// The winning choice of one selector.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Assumption {
    TrainStart(NaiveDateTime),
    FeatureList(Vec<String>),
    Hypers(Hypers),
    Custom(BTreeMap<String, ParamValue>),
}

/// A component searching one category of modeling assumption.
pub trait Selector {
    /// Key under which the pipeline records this selector's result.
    fn name(&self) -> &str;

    fn context_update(&self) -> ContextUpdate;

    /// Search using `ctx` as the starting point. Fields may be changed while
    /// searching but must be restored before returning.
    fn run(
        &mut self,
        eval_func: &mut dyn Evaluator,
        ctx: &mut EvaluationContext,
    ) -> Result<Assumption>;

    /// Per-size scores of the last run, for selectors that keep one.
    fn trace(&self) -> Option<&ResultTrace> {
        None
    }

    /// Optimizer trials of the last run, for trial-based selectors.
    fn study(&self) -> Option<&StudyResult> {
        None
    }
}
