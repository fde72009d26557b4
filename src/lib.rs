pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod evaluation;
pub mod interface;
pub mod logging;
pub mod models;
pub mod optimizer;
pub mod selection;

pub use error::{Result, SelectorError};
pub use evaluation::{CrossValidation, Evaluator, ModelKind};
pub use models::{DataTable, EvaluationContext, Hypers, ParamValue};
pub use selection::{
    Assumption, AssumptionSelector, BestAssumptions, ContextUpdate, Direction, FeatureSelector,
    Selector, Strategy, TrainStartSelector, Tuner,
};
