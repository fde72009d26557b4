use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

/// Sequential search over the modeling assumptions of a time-series model.
#[derive(Parser, Debug)]
#[command(name = "assumption_selector")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Time-indexed CSV table; the first column is the timestamp.
    #[arg(short, long, global = true, default_value = "data.csv")]
    pub data: PathBuf,

    /// Pipeline configuration JSON. Built-in defaults when omitted.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the configured selectors and report the best assumptions.
    Run {
        /// Write the feature selection trace to this CSV file.
        #[arg(long)]
        trace_csv: Option<PathBuf>,

        /// Write the optimizer trials of each trial-based selector to
        /// `<stem>_<selector>.csv` next to this path.
        #[arg(long)]
        trials_csv: Option<PathBuf>,

        /// Write the best assumptions to this JSON file.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Number of best trials shown per trial-based selector.
        #[arg(long, default_value = "5")]
        top_k: usize,
    },

    /// Summarize the data table.
    Inspect,

    /// Write the default pipeline configuration to a file.
    InitConfig {
        #[arg(default_value = "pipeline.json")]
        path: PathBuf,
    },
}

impl Default for Command {
    fn default() -> Self {
        Command::Run {
            trace_csv: None,
            trials_csv: None,
            output: None,
            top_k: 5,
        }
    }
}
