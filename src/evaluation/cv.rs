//! Expanding-window cross-validation for time-ordered tables.

use chrono::{Duration, NaiveDate};
use tracing::debug;

use crate::error::{Result, SelectorError};
use crate::evaluation::Evaluator;
use crate::models::EvaluationContext;

/// Default spacing between consecutive splits.
pub const DEFAULT_STEP_DAYS: i64 = 10;

/// Mean absolute error of expanding-window forecasts.
///
/// Starting at `cv_start` and moving forward `step_days` at a time, the model
/// is refit on every row dated on or before the split and predicts every later
/// row. Later splits overwrite earlier predictions, so each row ends up
/// predicted by the most recent model trained strictly before it.
///
/// Splits are whole days: on intraday data the training set includes every
/// row of the split date, not just rows up to its midnight.
#[derive(Debug, Clone)]
pub struct CrossValidation {
    pub label: String,
    pub cv_start: NaiveDate,
    pub step_days: i64,
}

impl CrossValidation {
    pub fn new(label: impl Into<String>, cv_start: NaiveDate) -> Self {
        Self {
            label: label.into(),
            cv_start,
            step_days: DEFAULT_STEP_DAYS,
        }
    }

    /// Out-of-sample predictions per row, `None` where no model reached.
    pub fn predictions(&self, ctx: &EvaluationContext) -> Result<Vec<Option<f64>>> {
        if self.step_days <= 0 {
            return Err(SelectorError::config(format!(
                "step_days must be positive, got {}",
                self.step_days
            )));
        }

        let df = &ctx.df;
        let label = ctx
            .extra("label")
            .and_then(|v| v.as_str())
            .unwrap_or(&self.label);
        let y = df.column(label)?;
        let index = df.index();
        let last_date = match index.iter().max() {
            Some(ts) => ts.date(),
            None => return Err(SelectorError::evaluation("cannot cross-validate an empty table")),
        };

        let mut preds = vec![None; df.len()];
        let mut split = self.cv_start;

        while split < last_date {
            let train_rows: Vec<usize> = (0..df.len())
                .filter(|&i| index[i].date() <= split)
                .collect();
            let Some(train_end) = train_rows.iter().map(|&i| index[i]).max() else {
                return Err(SelectorError::evaluation(format!(
                    "no training rows on or before split {}",
                    split
                )));
            };
            let test_rows: Vec<usize> = (0..df.len()).filter(|&i| index[i] > train_end).collect();

            let x_train = df.feature_rows(&ctx.feature_list, &train_rows)?;
            let y_train: Vec<f64> = train_rows.iter().map(|&i| y[i]).collect();
            let mut model = ctx.model.build(&ctx.hypers)?;
            model.fit(&x_train, &y_train)?;

            let x_test = df.feature_rows(&ctx.feature_list, &test_rows)?;
            for (&row, pred) in test_rows.iter().zip(model.predict(&x_test)) {
                preds[row] = Some(pred);
            }

            debug!(
                split = %split,
                train = train_rows.len(),
                test = test_rows.len(),
                "Fitted cross-validation split"
            );
            split += Duration::days(self.step_days);
        }

        Ok(preds)
    }
}

impl Evaluator for CrossValidation {
    fn evaluate(&mut self, ctx: &EvaluationContext) -> Result<f64> {
        let preds = self.predictions(ctx)?;
        let label = ctx
            .extra("label")
            .and_then(|v| v.as_str())
            .unwrap_or(&self.label);
        let y = ctx.df.column(label)?;

        let errors: Vec<f64> = preds
            .iter()
            .zip(y)
            .filter_map(|(pred, actual)| pred.map(|p| (actual - p).abs()))
            .collect();

        if errors.is_empty() {
            return Err(SelectorError::evaluation(format!(
                "no rows after cv_start {} to score",
                self.cv_start
            )));
        }
        Ok(errors.iter().sum::<f64>() / errors.len() as f64)
    }
}
