use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::info;

use assumption_selector_rs::cli::{Cli, Command};
use assumption_selector_rs::config::{load_config, save_config, PipelineConfig};
use assumption_selector_rs::data::load_table;
use assumption_selector_rs::error::{Result, SelectorError};
use assumption_selector_rs::interface::{
    print_assumptions, print_table_summary, print_top_trials, print_trace, write_assumptions_json,
    write_trace_csv, write_trials_csv,
};
use assumption_selector_rs::logging::setup_logging;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);
    let command = cli.command.unwrap_or_default();

    match command {
        Command::Run {
            trace_csv,
            trials_csv,
            output,
            top_k,
        } => cmd_run(
            &cli.data,
            cli.config.as_deref(),
            trace_csv.as_deref(),
            trials_csv.as_deref(),
            output.as_deref(),
            top_k,
        ),
        Command::Inspect => cmd_inspect(&cli.data),
        Command::InitConfig { path } => cmd_init_config(&path),
    }
}

fn read_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "Loading pipeline config");
            load_config(path)
        }
        None => Ok(PipelineConfig::default()),
    }
}

fn require_file(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(SelectorError::config(format!(
            "data file not found: {}",
            path.display()
        )))
    }
}

/// `<dir>/<stem>_<suffix>.csv` for a base path.
fn suffixed(base: &Path, suffix: &str) -> PathBuf {
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "trials".to_string());
    base.with_file_name(format!("{}_{}.csv", stem, suffix))
}

/// Run the pipeline and report its results.
fn cmd_run(
    data: &Path,
    config_path: Option<&Path>,
    trace_csv: Option<&Path>,
    trials_csv: Option<&Path>,
    output: Option<&Path>,
    top_k: usize,
) -> Result<()> {
    require_file(data)?;
    let config = read_config(config_path)?;
    let table = load_table(data)?;
    println!("Loaded {} rows with {} columns", table.len(), table.columns().len());

    let mut evaluator = config.evaluator(&table)?;
    let mut pipeline = config.pipeline(&table)?;
    let mut ctx = config.context(table)?;
    println!(
        "Cross-validating from {} every {} days on label '{}'",
        evaluator.cv_start, evaluator.step_days, evaluator.label
    );
    println!("Starting features: {}", ctx.feature_list.join(", "));

    let best = pipeline.run(&mut evaluator, &mut ctx)?;

    for selector in pipeline.selectors() {
        if let Some(trace) = selector.trace() {
            print_trace(trace);
            if let Some(path) = trace_csv {
                write_trace_csv(trace, path)?;
                println!("Wrote trace to {:?}", path);
            }
        }
        if let Some(study) = selector.study() {
            println!("{}:", selector.name());
            print_top_trials(study, top_k);
            if let Some(base) = trials_csv {
                let path = suffixed(base, selector.name());
                write_trials_csv(study, &path)?;
                println!("Wrote trials to {:?}", path);
            }
        }
    }

    print_assumptions(&best);

    if let Some(path) = output {
        write_assumptions_json(&best, path)?;
        println!("Wrote best assumptions to {:?}", path);
    }

    Ok(())
}

fn cmd_inspect(data: &Path) -> Result<()> {
    require_file(data)?;
    let table = load_table(data)?;
    print_table_summary(&table);
    Ok(())
}

fn cmd_init_config(path: &Path) -> Result<()> {
    save_config(path, &PipelineConfig::default())?;
    println!("Wrote default pipeline config to {:?}", path);
    Ok(())
}
