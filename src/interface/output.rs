use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::models::display_hypers;
use crate::optimizer::StudyResult;
use crate::selection::{BestAssumptions, ResultTrace};

/// Write the feature selection trace as `num_features,score` rows.
pub fn write_trace_csv(trace: &ResultTrace, path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(["num_features", "score"])?;
    for (count, score) in trace {
        wtr.write_record([count.to_string(), score.to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write every trial of a study, in the order it ran.
pub fn write_trials_csv(study: &StudyResult, path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(["trial", "score", "params"])?;
    for trial in &study.trials {
        wtr.write_record([
            trial.number.to_string(),
            trial.score.to_string(),
            display_hypers(&trial.params),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the best assumptions keyed by selector name.
pub fn write_assumptions_json(best: &BestAssumptions, path: &Path) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(serde_json::to_string_pretty(best)?.as_bytes())?;
    Ok(())
}
