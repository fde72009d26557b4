pub mod cv;
pub mod regressor;

pub use cv::CrossValidation;
pub use regressor::{MeanRegressor, ModelKind, Regressor, RidgeRegression};

use crate::error::{checked_score, Result};
use crate::models::EvaluationContext;

/// Scores one evaluation context. Lower or higher is better depending on the
/// selector's direction.
pub trait Evaluator {
    fn evaluate(&mut self, ctx: &EvaluationContext) -> Result<f64>;
}

impl<F> Evaluator for F
where
    F: FnMut(&EvaluationContext) -> Result<f64>,
{
    fn evaluate(&mut self, ctx: &EvaluationContext) -> Result<f64> {
        self(ctx)
    }
}

/// Evaluate and reject non-finite scores.
pub fn evaluate_checked(eval_func: &mut dyn Evaluator, ctx: &EvaluationContext) -> Result<f64> {
    checked_score(eval_func.evaluate(ctx)?)
}
