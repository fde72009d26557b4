pub mod output;
pub mod render;

pub use output::{write_assumptions_json, write_trace_csv, write_trials_csv};
pub use render::{print_assumptions, print_table_summary, print_top_trials, print_trace};
