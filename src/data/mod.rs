pub mod constants;
pub mod persistence;
pub mod synthetic;

pub use persistence::{load_table, parse_timestamp, save_table};
pub use synthetic::{
    add_calendar_features, add_noisy_signal, generate_synthetic_data, standard_normal_noise,
    Frequency, SyntheticConfig,
};
