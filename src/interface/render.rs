use crate::models::{display_hypers, DataTable};
use crate::optimizer::StudyResult;
use crate::selection::{Assumption, BestAssumptions, Direction, ResultTrace};

const BAR_WIDTH: usize = 40;

/// Bar length for `score` on a min..max scale; equal scores get a full bar.
fn bar_len(score: f64, min: f64, max: f64) -> usize {
    if max > min {
        (((score - min) / (max - min)) * BAR_WIDTH as f64).round() as usize
    } else {
        BAR_WIDTH
    }
}

/// Print the feature selection trace as a text chart, fewest features first.
pub fn print_trace(trace: &ResultTrace) {
    if trace.is_empty() {
        println!("No feature selection trace recorded.");
        return;
    }

    let min = trace.values().copied().fold(f64::INFINITY, f64::min);
    let max = trace.values().copied().fold(f64::NEG_INFINITY, f64::max);

    println!();
    println!("=== Score by Feature Count ===");
    println!();
    for (count, score) in trace {
        println!(
            "{:>4} | {:>12.5} | {}",
            count,
            score,
            "#".repeat(bar_len(*score, min, max))
        );
    }
    println!();
}

/// Print the winning assumption of every selector, in pipeline order.
pub fn print_assumptions(best: &BestAssumptions) {
    println!();
    println!("=== Best Assumptions ===");
    println!();

    if best.is_empty() {
        println!("(no selectors ran)");
    }

    for (name, assumption) in best.iter() {
        let shown = match assumption {
            Assumption::TrainStart(start) => format!("train start {}", start),
            Assumption::FeatureList(features) if features.is_empty() => {
                "no features".to_string()
            }
            Assumption::FeatureList(features) => features.join(", "),
            Assumption::Hypers(hypers) => display_hypers(hypers),
            Assumption::Custom(values) => display_hypers(values),
        };
        println!("{:<20} {}", name, shown);
    }
    println!();
}

/// Print the best `k` trials of a study.
pub fn print_top_trials(study: &StudyResult, k: usize) {
    let mut trials: Vec<_> = study.trials.iter().collect();
    trials.sort_by(|a, b| {
        let ord = a.score.total_cmp(&b.score);
        match study.direction {
            Direction::Minimize => ord,
            Direction::Maximize => ord.reverse(),
        }
    });

    println!("\n=== Top {} Trials ===\n", k.min(trials.len()));
    for trial in trials.iter().take(k) {
        println!(
            "#{:<4} score={:.5} {}",
            trial.number,
            trial.score,
            display_hypers(&trial.params)
        );
    }
}

/// Print row count, time range and per-column statistics.
pub fn print_table_summary(table: &DataTable) {
    let index = table.index();
    match (index.first(), index.last()) {
        (Some(first), Some(last)) => {
            println!("{} rows from {} to {}", table.len(), first, last);
        }
        _ => {
            println!("Table is empty.");
            return;
        }
    }
    if !table.is_time_ordered() {
        println!("Warning: index is not sorted oldest first.");
    }

    let max_name_len = table
        .columns()
        .iter()
        .map(|c| c.name.len())
        .max()
        .unwrap_or(10);

    println!();
    for column in table.columns() {
        let n = column.values.len() as f64;
        let mean = column.values.iter().sum::<f64>() / n;
        let min = column.values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = column.values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        println!(
            "{:<width$}  mean={:>10.3}  min={:>10.3}  max={:>10.3}",
            column.name,
            mean,
            min,
            max,
            width = max_name_len
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_len_scales() {
        assert_eq!(bar_len(1.0, 1.0, 3.0), 0);
        assert_eq!(bar_len(2.0, 1.0, 3.0), BAR_WIDTH / 2);
        assert_eq!(bar_len(3.0, 1.0, 3.0), BAR_WIDTH);
        assert_eq!(bar_len(5.0, 5.0, 5.0), BAR_WIDTH);
    }
}
