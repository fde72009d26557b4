use std::path::PathBuf;

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;

use assumption_selector_rs::data::{
    add_calendar_features, add_noisy_signal, generate_synthetic_data, parse_timestamp, save_table,
    standard_normal_noise, Frequency, SyntheticConfig,
};
use assumption_selector_rs::error::Result;
use assumption_selector_rs::logging::setup_logging;

#[derive(Parser, Debug)]
#[command(name = "synth_data")]
#[command(about = "Write a synthetic time series with planted seasonality and noisy signals")]
struct Args {
    /// Output CSV file
    #[arg(long, default_value = "data.csv")]
    out: PathBuf,

    /// Row spacing: hourly or daily
    #[arg(long, default_value = "daily")]
    freq: Frequency,

    /// First timestamp
    #[arg(long, default_value = "2019-08-01 00:00:00")]
    start: String,

    /// Last timestamp (inclusive)
    #[arg(long, default_value = "2022-01-07 23:00:00")]
    stop: String,

    #[arg(long, default_value = "100")]
    start_value: f64,

    /// Value the linear trend reaches on the last row
    #[arg(long, default_value = "400")]
    trend_stop_value: f64,

    /// Keep the series flat at the start value
    #[arg(long, conflicts_with = "trend_stop_value")]
    no_trend: bool,

    #[arg(long)]
    hour_offset: bool,

    #[arg(long)]
    weekday_offset: bool,

    #[arg(long)]
    yearly_offset: bool,

    /// Add `dow` and `doy` columns
    #[arg(long)]
    calendar: bool,

    /// Noisy copies of the label as name:scale or name:scale_start:scale_end
    #[arg(long = "signal")]
    signals: Vec<String>,

    /// Random seed for the noise
    #[arg(long, default_value = "123")]
    seed: u64,
}

/// Parse `name:scale` or `name:start:end`.
fn parse_signal(spec: &str) -> Option<(String, f64, f64)> {
    let parts: Vec<&str> = spec.split(':').collect();
    match parts.as_slice() {
        [name, scale] => {
            let scale = scale.trim().parse().ok()?;
            Some((name.trim().to_string(), scale, scale))
        }
        [name, start, end] => Some((
            name.trim().to_string(),
            start.trim().parse().ok()?,
            end.trim().parse().ok()?,
        )),
        _ => None,
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    setup_logging(0);

    let config = SyntheticConfig {
        hour_offset: args.hour_offset,
        weekday_offset: args.weekday_offset,
        yearly_offset: args.yearly_offset,
        frequency: args.freq,
        start: parse_timestamp(&args.start)?,
        stop: parse_timestamp(&args.stop)?,
        start_value: args.start_value,
        trend_stop_value: (!args.no_trend).then_some(args.trend_stop_value),
        ..SyntheticConfig::default()
    };

    let mut table = generate_synthetic_data(&config)?;
    println!("Generated {} rows ({})", table.len(), config.frequency);

    if args.calendar {
        add_calendar_features(&mut table)?;
    }

    let mut rng = StdRng::seed_from_u64(args.seed);
    for spec in &args.signals {
        let Some((name, scale_start, scale_end)) = parse_signal(spec) else {
            eprintln!("Skipping malformed signal '{}'", spec);
            continue;
        };
        let noise = standard_normal_noise(table.len(), &mut rng);
        add_noisy_signal(&mut table, &config.label, &name, &noise, scale_start, scale_end)?;
        println!("Added signal '{}' (noise scale {} -> {})", name, scale_start, scale_end);
    }

    save_table(&args.out, &table)?;
    println!("Wrote {:?}", args.out);
    Ok(())
}
