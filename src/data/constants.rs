//! Seasonal multipliers for synthetic series.

/// Amplitude of the yearly sine around 1.0.
pub const YEARLY_AMPLITUDE: f64 = 0.2;

/// Days per year used by the yearly sine; 366 keeps leap days below one full period.
pub const YEARLY_PERIOD_DAYS: f64 = 366.0;

/// Multiplier per hour of day, midnight first.
pub const HOUR_OFFSETS: [f64; 24] = [
    0.2, 0.1, 0.1, 0.05, 0.05, 0.1, 0.5, 0.7, 1.1, 1.2, 1.1, 1.0, //
    1.0, 0.9, 1.0, 1.1, 1.15, 1.1, 1.1, 0.9, 0.85, 0.75, 0.5, 0.3,
];

/// Multiplier per weekday, Monday first.
pub const WEEKDAY_OFFSETS: [f64; 7] = [1.2, 1.1, 1.05, 1.0, 1.0, 0.9, 0.9];

/// Column names written by `add_calendar_features`.
pub const DOW_COLUMN: &str = "dow";
pub const DOY_COLUMN: &str = "doy";
