//! Synthetic time series with known structure.
//!
//! Useful for checking that a selector recovers what was planted: a linear
//! trend scaled by optional yearly, weekday and hour-of-day multipliers.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data::constants::{
    DOW_COLUMN, DOY_COLUMN, HOUR_OFFSETS, WEEKDAY_OFFSETS, YEARLY_AMPLITUDE, YEARLY_PERIOD_DAYS,
};
use crate::error::{Result, SelectorError};
use crate::models::DataTable;

/// Spacing of the generated index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    Hourly,
    Daily,
}

impl Frequency {
    fn step(self) -> Duration {
        match self {
            Frequency::Hourly => Duration::hours(1),
            Frequency::Daily => Duration::days(1),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frequency::Hourly => write!(f, "hourly"),
            Frequency::Daily => write!(f, "daily"),
        }
    }
}

impl FromStr for Frequency {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "h" | "hourly" => Ok(Frequency::Hourly),
            "d" | "daily" => Ok(Frequency::Daily),
            other => Err(SelectorError::config(format!(
                "unknown frequency '{}', expected hourly or daily",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticConfig {
    pub hour_offset: bool,
    pub weekday_offset: bool,
    pub yearly_offset: bool,
    pub frequency: Frequency,
    pub start: NaiveDateTime,
    /// Inclusive; timestamps past the last whole step are not generated.
    pub stop: NaiveDateTime,
    pub start_value: f64,
    /// End of the linear trend. `None` keeps the series flat at `start_value`.
    pub trend_stop_value: Option<f64>,
    pub label: String,
}

fn at_hour(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, 0, 0))
        .unwrap_or_default()
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            hour_offset: false,
            weekday_offset: false,
            yearly_offset: false,
            frequency: Frequency::Hourly,
            start: at_hour(2019, 8, 1, 0),
            stop: at_hour(2022, 1, 7, 23),
            start_value: 100.0,
            trend_stop_value: Some(400.0),
            label: "label".to_string(),
        }
    }
}

/// `sin(2π·doy/366)·0.2 + 1` for the timestamp's day of year.
pub fn yearly_factor(ts: NaiveDateTime) -> f64 {
    (2.0 * PI * ts.ordinal() as f64 / YEARLY_PERIOD_DAYS).sin() * YEARLY_AMPLITUDE + 1.0
}

/// `n` evenly spaced values from `start` to `stop`, both included.
fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}

pub fn generate_synthetic_data(config: &SyntheticConfig) -> Result<DataTable> {
    if config.stop < config.start {
        return Err(SelectorError::config(format!(
            "stop {} is before start {}",
            config.stop, config.start
        )));
    }
    if config.hour_offset && config.frequency != Frequency::Hourly {
        return Err(SelectorError::config(
            "hour offsets need hourly frequency",
        ));
    }

    let step = config.frequency.step();
    let mut index = Vec::new();
    let mut ts = config.start;
    while ts <= config.stop {
        index.push(ts);
        ts += step;
    }

    let mut values = match config.trend_stop_value {
        Some(stop_value) => linspace(config.start_value, stop_value, index.len()),
        None => vec![config.start_value; index.len()],
    };

    for (value, ts) in values.iter_mut().zip(&index) {
        if config.yearly_offset {
            *value *= yearly_factor(*ts);
        }
        if config.hour_offset {
            *value *= HOUR_OFFSETS[ts.hour() as usize];
        }
        if config.weekday_offset {
            *value *= WEEKDAY_OFFSETS[ts.weekday().num_days_from_monday() as usize];
        }
    }

    debug!(
        rows = index.len(),
        frequency = %config.frequency,
        "Generated synthetic series"
    );
    DataTable::new(index).with_column(config.label.clone(), values)
}

/// Add `dow` (Monday = 0) and `doy` (1-based) columns.
pub fn add_calendar_features(table: &mut DataTable) -> Result<()> {
    let dow = table
        .index()
        .iter()
        .map(|ts| ts.weekday().num_days_from_monday() as f64)
        .collect();
    let doy = table.index().iter().map(|ts| ts.ordinal() as f64).collect();
    table.add_column(DOW_COLUMN, dow)?;
    table.add_column(DOY_COLUMN, doy)
}

pub fn standard_normal_noise<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Vec<f64> {
    StandardNormal.sample_iter(rng).take(len).collect()
}

/// Add `name = source + noise * scale`, where the scale moves linearly from
/// `scale_start` on the first row to `scale_end` on the last.
pub fn add_noisy_signal(
    table: &mut DataTable,
    source: &str,
    name: &str,
    noise: &[f64],
    scale_start: f64,
    scale_end: f64,
) -> Result<()> {
    let base = table.column(source)?;
    if noise.len() != base.len() {
        return Err(SelectorError::config(format!(
            "noise has {} values, table has {} rows",
            noise.len(),
            base.len()
        )));
    }

    let scales = linspace(scale_start, scale_end, base.len());
    let values = base
        .iter()
        .zip(noise)
        .zip(scales)
        .map(|((b, n), s)| b + n * s)
        .collect();
    table.add_column(name, values)
}
