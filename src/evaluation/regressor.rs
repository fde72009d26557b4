use serde::{Deserialize, Serialize};

use crate::error::{Result, SelectorError};
use crate::models::{Hypers, ParamValue};

/// Pivot magnitude below which the normal equations are treated as singular.
const SINGULAR_EPSILON: f64 = 1e-12;

/// A model that can be refit on every evaluation.
pub trait Regressor {
    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<()>;
    fn predict(&self, x: &[Vec<f64>]) -> Vec<f64>;
}

/// Reference to an estimator family. A fresh model is built from the current
/// hyperparameters for every fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    #[default]
    Ridge,
    Mean,
}

impl ModelKind {
    /// Build a model; an empty `hypers` gives out-of-box defaults.
    pub fn build(&self, hypers: &Hypers) -> Result<Box<dyn Regressor>> {
        match self {
            ModelKind::Ridge => {
                let mut model = RidgeRegression::default();
                for (name, value) in hypers {
                    match name.as_str() {
                        "alpha" => model.alpha = non_negative(name, value)?,
                        "fit_intercept" => {
                            model.fit_intercept = value.as_i64().map(|v| v != 0).ok_or_else(
                                || {
                                    SelectorError::config(format!(
                                        "hyperparameter 'fit_intercept' must be an integer flag, got {}",
                                        value
                                    ))
                                },
                            )?
                        }
                        other => return Err(unknown_hyper("ridge", other)),
                    }
                }
                Ok(Box::new(model))
            }
            ModelKind::Mean => match hypers.keys().next() {
                Some(name) => Err(unknown_hyper("mean", name)),
                None => Ok(Box::new(MeanRegressor::default())),
            },
        }
    }
}

fn non_negative(name: &str, value: &ParamValue) -> Result<f64> {
    value.as_f64().filter(|v| *v >= 0.0).ok_or_else(|| {
        SelectorError::config(format!(
            "hyperparameter '{}' must be a non-negative number, got {}",
            name, value
        ))
    })
}

fn unknown_hyper(model: &str, name: &str) -> SelectorError {
    SelectorError::config(format!(
        "unknown hyperparameter '{}' for {} model",
        name, model
    ))
}

/// Predicts the training mean.
#[derive(Debug, Clone, Default)]
pub struct MeanRegressor {
    mean: f64,
}

impl Regressor for MeanRegressor {
    fn fit(&mut self, _x: &[Vec<f64>], y: &[f64]) -> Result<()> {
        if y.is_empty() {
            return Err(SelectorError::evaluation("cannot fit on zero rows"));
        }
        self.mean = y.iter().sum::<f64>() / y.len() as f64;
        Ok(())
    }

    fn predict(&self, x: &[Vec<f64>]) -> Vec<f64> {
        vec![self.mean; x.len()]
    }
}

/// L2-penalized least squares solved through the normal equations.
#[derive(Debug, Clone)]
pub struct RidgeRegression {
    pub alpha: f64,
    pub fit_intercept: bool,
    coefficients: Vec<f64>,
    intercept: f64,
}

impl Default for RidgeRegression {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            fit_intercept: true,
            coefficients: Vec::new(),
            intercept: 0.0,
        }
    }
}

impl RidgeRegression {
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }
}

impl Regressor for RidgeRegression {
    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<()> {
        let n = y.len();
        if n == 0 || x.len() != n {
            return Err(SelectorError::evaluation(format!(
                "cannot fit on {} feature rows and {} labels",
                x.len(),
                n
            )));
        }
        let p = x[0].len();

        let (x_mean, y_mean) = if self.fit_intercept {
            let mut x_mean = vec![0.0; p];
            for row in x {
                for (m, v) in x_mean.iter_mut().zip(row) {
                    *m += v / n as f64;
                }
            }
            (x_mean, y.iter().sum::<f64>() / n as f64)
        } else {
            (vec![0.0; p], 0.0)
        };

        // Normal equations on centered data: (XᵀX + αI) β = Xᵀy
        let mut a = vec![vec![0.0; p]; p];
        let mut b = vec![0.0; p];
        for (row, &target) in x.iter().zip(y) {
            let yc = target - y_mean;
            for i in 0..p {
                let xi = row[i] - x_mean[i];
                b[i] += xi * yc;
                for j in i..p {
                    a[i][j] += xi * (row[j] - x_mean[j]);
                }
            }
        }
        for i in 0..p {
            for j in 0..i {
                a[i][j] = a[j][i];
            }
            a[i][i] += self.alpha;
        }

        self.coefficients = solve_linear_system(a, b)?;
        self.intercept = y_mean
            - self
                .coefficients
                .iter()
                .zip(&x_mean)
                .map(|(c, m)| c * m)
                .sum::<f64>();
        Ok(())
    }

    fn predict(&self, x: &[Vec<f64>]) -> Vec<f64> {
        x.iter()
            .map(|row| {
                self.intercept
                    + row
                        .iter()
                        .zip(&self.coefficients)
                        .map(|(v, c)| v * c)
                        .sum::<f64>()
            })
            .collect()
    }
}

/// Gaussian elimination with partial pivoting.
#[allow(clippy::needless_range_loop)]
fn solve_linear_system(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>> {
    let n = b.len();

    for i in 0..n {
        let mut max_row = i;
        for k in (i + 1)..n {
            if a[k][i].abs() > a[max_row][i].abs() {
                max_row = k;
            }
        }
        a.swap(i, max_row);
        b.swap(i, max_row);

        if a[i][i].abs() < SINGULAR_EPSILON {
            return Err(SelectorError::evaluation(
                "singular design matrix, try a positive ridge alpha",
            ));
        }

        for k in (i + 1)..n {
            let factor = a[k][i] / a[i][i];
            for j in i..n {
                a[k][j] -= factor * a[i][j];
            }
            b[k] -= factor * b[i];
        }
    }

    let mut solution = vec![0.0; n];
    for i in (0..n).rev() {
        let tail: f64 = ((i + 1)..n).map(|j| a[i][j] * solution[j]).sum();
        solution[i] = (b[i] - tail) / a[i][i];
    }
    Ok(solution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_float_eq::assert_float_absolute_eq;

    #[test]
    fn test_ridge_recovers_linear_relation() {
        let x: Vec<Vec<f64>> = (0..20).map(|i| vec![i as f64, (i % 3) as f64]).collect();
        let y: Vec<f64> = x.iter().map(|r| 2.0 * r[0] - 3.0 * r[1] + 5.0).collect();

        let mut model = RidgeRegression {
            alpha: 0.0,
            ..RidgeRegression::default()
        };
        model.fit(&x, &y).unwrap();

        assert_float_absolute_eq!(model.coefficients()[0], 2.0, 1e-6);
        assert_float_absolute_eq!(model.coefficients()[1], -3.0, 1e-6);
        assert_float_absolute_eq!(model.intercept(), 5.0, 1e-6);
        assert_float_absolute_eq!(model.predict(&[vec![30.0, 1.0]])[0], 62.0, 1e-6);
    }

    #[test]
    fn test_ridge_without_features_predicts_mean() {
        let x = vec![Vec::new(); 4];
        let y = vec![1.0, 2.0, 3.0, 6.0];
        let mut model = RidgeRegression::default();
        model.fit(&x, &y).unwrap();
        assert_float_absolute_eq!(model.predict(&[Vec::new()])[0], 3.0, 1e-12);
    }

    #[test]
    fn test_singular_system_is_an_evaluation_error() {
        let x: Vec<Vec<f64>> = (0..5).map(|i| vec![i as f64, 2.0 * i as f64]).collect();
        let y: Vec<f64> = (0..5).map(|i| i as f64).collect();
        let mut model = RidgeRegression {
            alpha: 0.0,
            ..RidgeRegression::default()
        };
        assert!(matches!(
            model.fit(&x, &y),
            Err(SelectorError::Evaluation(_))
        ));
    }

    #[test]
    fn test_build_reads_hypers() {
        let mut hypers = Hypers::new();
        hypers.insert("alpha".to_string(), ParamValue::Float(0.5));
        hypers.insert("fit_intercept".to_string(), ParamValue::Int(0));
        assert!(ModelKind::Ridge.build(&hypers).is_ok());

        hypers.insert("depth".to_string(), ParamValue::Int(3));
        let err = ModelKind::Ridge.build(&hypers).err().unwrap();
        assert!(err.to_string().contains("unknown hyperparameter 'depth'"));

        let mut negative = Hypers::new();
        negative.insert("alpha".to_string(), ParamValue::Float(-1.0));
        assert!(ModelKind::Ridge.build(&negative).is_err());
        assert!(ModelKind::Mean.build(&Hypers::new()).is_ok());
    }
}
