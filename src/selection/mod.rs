pub mod direction;
pub mod feature;
pub mod pipeline;
pub mod selector;
pub mod train_start;
pub mod tuner;

pub use direction::{Direction, Strategy};
pub use feature::FeatureSelector;
pub use pipeline::{apply_update, AssumptionSelector, BestAssumptions};
pub use selector::{Assumption, ContextUpdate, ResultTrace, Selector};
pub use train_start::TrainStartSelector;
pub use tuner::{Tuner, TunerSpace};
