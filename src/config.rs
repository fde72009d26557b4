//! JSON configuration of a selection pipeline.

use std::fs;
use std::path::Path;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, SelectorError};
use crate::evaluation::{CrossValidation, ModelKind};
use crate::models::{DataTable, EvaluationContext};
use crate::optimizer::{Distribution, ParamSpace, SamplerKind, DEFAULT_SEED};
use crate::selection::{
    AssumptionSelector, Direction, FeatureSelector, Selector, Strategy, TrainStartSelector, Tuner,
};

fn default_n_trials() -> usize {
    30
}

fn default_min_train_rows() -> usize {
    1000
}

fn default_search_depth() -> usize {
    4
}

fn default_patience() -> usize {
    2
}

fn default_threshold() -> f64 {
    0.0001
}

/// One pipeline stage, in the order it runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SelectorConfig {
    TrainStart {
        /// Derived from `cv_start` when omitted.
        #[serde(default)]
        eval_window_rows: Option<usize>,
        #[serde(default = "default_min_train_rows")]
        min_train_rows: usize,
        #[serde(default)]
        direction: Direction,
        #[serde(default = "default_n_trials")]
        n_trials: usize,
    },
    Features {
        #[serde(default)]
        direction: Direction,
        #[serde(default)]
        strategy: Strategy,
        #[serde(default = "default_search_depth")]
        search_depth: usize,
        #[serde(default = "default_patience")]
        patience: usize,
        #[serde(default = "default_threshold")]
        add_feature_threshold: f64,
    },
    Tuner {
        #[serde(default)]
        direction: Direction,
        #[serde(default = "default_n_trials")]
        n_trials: usize,
        space: ParamSpace,
    },
}

/// Ridge space used when no config file is given.
pub fn default_ridge_space() -> ParamSpace {
    ParamSpace::new()
        .add("alpha", Distribution::LogUniform { low: 1e-3, high: 100.0 })
        .add("fit_intercept", Distribution::IntRange { low: 0, high: 1 })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub label: String,
    /// First cross-validation split. When absent, the last date before the
    /// final fifth of the table, so that fifth is what gets predicted.
    pub cv_start: Option<NaiveDate>,
    pub step_days: i64,
    pub model: ModelKind,
    pub seed: u64,
    pub sampler: SamplerKind,
    /// Initial ranked feature list; every non-label column when absent.
    pub features: Option<Vec<String>>,
    pub selectors: Vec<SelectorConfig>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            label: "label".to_string(),
            cv_start: None,
            step_days: crate::evaluation::cv::DEFAULT_STEP_DAYS,
            model: ModelKind::Ridge,
            seed: DEFAULT_SEED,
            sampler: SamplerKind::Random,
            features: None,
            selectors: vec![
                SelectorConfig::TrainStart {
                    eval_window_rows: None,
                    min_train_rows: default_min_train_rows(),
                    direction: Direction::Minimize,
                    n_trials: default_n_trials(),
                },
                SelectorConfig::Features {
                    direction: Direction::Minimize,
                    strategy: Strategy::Adding,
                    search_depth: default_search_depth(),
                    patience: default_patience(),
                    add_feature_threshold: default_threshold(),
                },
                SelectorConfig::Tuner {
                    direction: Direction::Minimize,
                    n_trials: default_n_trials(),
                    space: default_ridge_space(),
                },
            ],
        }
    }
}

impl PipelineConfig {
    /// `cv_start`, or the date of the last row before the final fifth of `table`.
    pub fn resolve_cv_start(&self, table: &DataTable) -> Result<NaiveDate> {
        if let Some(date) = self.cv_start {
            return Ok(date);
        }
        let index = table.index();
        if index.is_empty() {
            return Err(SelectorError::config(
                "cannot derive cv_start from an empty table",
            ));
        }
        Ok(index[index.len() - index.len() / 5 - 1].date())
    }

    pub fn evaluator(&self, table: &DataTable) -> Result<CrossValidation> {
        let mut cv = CrossValidation::new(self.label.clone(), self.resolve_cv_start(table)?);
        cv.step_days = self.step_days;
        Ok(cv)
    }

    pub fn context(&self, table: DataTable) -> Result<EvaluationContext> {
        table.column(&self.label)?;
        Ok(match &self.features {
            Some(features) => EvaluationContext::new(table, self.model, features.clone()),
            None => EvaluationContext::with_all_features(table, self.model, &self.label),
        })
    }

    /// Build the selectors in configured order. Each stage gets its own
    /// optimizer seeded from `seed` and its position.
    pub fn pipeline(&self, table: &DataTable) -> Result<AssumptionSelector> {
        let mut selectors: Vec<Box<dyn Selector>> = Vec::with_capacity(self.selectors.len());

        for (position, stage) in self.selectors.iter().enumerate() {
            let seed = self.seed.wrapping_add(position as u64);
            let selector: Box<dyn Selector> = match stage {
                SelectorConfig::TrainStart {
                    eval_window_rows,
                    min_train_rows,
                    direction,
                    n_trials,
                } => {
                    let eval_rows = match eval_window_rows {
                        Some(rows) => *rows,
                        None => {
                            let cv_start = self.resolve_cv_start(table)?;
                            table.count_from(cv_start.and_time(NaiveTime::default()))
                        }
                    };
                    info!(eval_window_rows = eval_rows, "Configured train start search");
                    Box::new(
                        TrainStartSelector::new(eval_rows)
                            .with_min_train_rows(*min_train_rows)
                            .with_direction(*direction)
                            .with_n_trials(*n_trials)
                            .with_optimizer(self.sampler.build(seed)?),
                    )
                }
                SelectorConfig::Features {
                    direction,
                    strategy,
                    search_depth,
                    patience,
                    add_feature_threshold,
                } => {
                    let mut fs = FeatureSelector::default();
                    fs.direction = *direction;
                    fs.strategy = *strategy;
                    fs.search_depth = *search_depth;
                    fs.patience = *patience;
                    fs.add_feature_threshold = *add_feature_threshold;
                    Box::new(fs)
                }
                SelectorConfig::Tuner {
                    direction,
                    n_trials,
                    space,
                } => {
                    space.validate()?;
                    Box::new(
                        Tuner::new(space.clone())
                            .with_direction(*direction)
                            .with_n_trials(*n_trials)
                            .with_optimizer(self.sampler.build(seed)?),
                    )
                }
            };
            selectors.push(selector);
        }

        Ok(AssumptionSelector::new(selectors))
    }
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<PipelineConfig> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

pub fn save_config<P: AsRef<Path>>(path: P, config: &PipelineConfig) -> Result<()> {
    fs::write(path, serde_json::to_string_pretty(config)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn table(days: i64) -> DataTable {
        let start = NaiveDate::from_ymd_opt(2021, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let index = (0..days).map(|i| start + Duration::days(i)).collect();
        DataTable::new(index)
            .with_column("label", vec![1.0; days as usize])
            .unwrap()
            .with_column("x", vec![2.0; days as usize])
            .unwrap()
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let json = r#"{
            "cv_start": "2021-03-01",
            "selectors": [
                {"kind": "train_start", "min_train_rows": 28, "n_trials": 20},
                {"kind": "features", "strategy": "removing"},
                {"kind": "tuner", "space": [{"name": "alpha", "kind": "uniform", "low": 0.1, "high": 2.0}]}
            ]
        }"#;
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.label, "label");
        assert_eq!(config.model, ModelKind::Ridge);
        assert_eq!(
            config.selectors[0],
            SelectorConfig::TrainStart {
                eval_window_rows: None,
                min_train_rows: 28,
                direction: Direction::Minimize,
                n_trials: 20,
            }
        );
        assert!(matches!(
            config.selectors[1],
            SelectorConfig::Features {
                strategy: Strategy::Removing,
                search_depth: 4,
                patience: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_pipeline_order_and_names() {
        let config = PipelineConfig::default();
        let pipeline = config.pipeline(&table(100)).unwrap();
        let names: Vec<&str> = pipeline.selectors().iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["TrainStartSelector", "FeatureSelector", "Tuner"]);
    }

    #[test]
    fn test_cv_start_derived_from_last_fifth() {
        let config = PipelineConfig::default();
        // 100 rows: rows 80.. are predicted, so training ends at row 79
        assert_eq!(
            config.resolve_cv_start(&table(100)).unwrap(),
            NaiveDate::from_ymd_opt(2021, 3, 21).unwrap()
        );
    }

    #[test]
    fn test_tpe_sampler_fails_fast() {
        let config = PipelineConfig {
            sampler: SamplerKind::Tpe,
            ..PipelineConfig::default()
        };
        assert!(matches!(
            config.pipeline(&table(50)),
            Err(SelectorError::NotImplemented(_))
        ));
    }

    #[test]
    fn test_context_requires_label() {
        let config = PipelineConfig {
            label: "target".to_string(),
            ..PipelineConfig::default()
        };
        assert!(matches!(
            config.context(table(5)),
            Err(SelectorError::Configuration(_))
        ));

        let ctx = PipelineConfig::default().context(table(5)).unwrap();
        assert_eq!(ctx.feature_list, vec!["x".to_string()]);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let file = NamedTempFile::new().unwrap();
        let config = PipelineConfig::default();
        save_config(file.path(), &config).unwrap();
        assert_eq!(load_config(file.path()).unwrap(), config);
    }
}
