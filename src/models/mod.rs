pub mod context;
pub mod params;
pub mod table;

pub use context::EvaluationContext;
pub use params::{display_hypers, Hypers, ParamValue};
pub use table::{Column, DataTable};
