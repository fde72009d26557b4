//! Greedy sequential feature selection.
//!
//! If the feature list is ranked so that features assumed to carry more
//! signal come first, the search repeatedly adds features from the front of
//! the list (or removes them from the back), probing up to `search_depth`
//! candidates per round to allow for interactions. The best combination seen
//! so far is tracked globally and the search stops once `patience` rounds in
//! a row fail to improve it. With an unranked list, a large patience still
//! lets the search visit every feature.

use tracing::{debug, info};

use crate::error::{Result, SelectorError};
use crate::evaluation::{evaluate_checked, Evaluator};
use crate::models::EvaluationContext;
use crate::selection::direction::{Direction, Strategy};
use crate::selection::selector::{Assumption, ContextUpdate, ResultTrace, Selector};

#[derive(Debug, Clone)]
pub struct FeatureSelector {
    pub direction: Direction,
    pub strategy: Strategy,
    /// Features probed per round.
    pub search_depth: usize,
    /// Rounds without a global improvement tolerated before stopping.
    pub patience: usize,
    /// Slack on the global acceptance check when adding. Ignored when removing.
    pub add_feature_threshold: f64,
    result_trace: Option<ResultTrace>,
}

impl Default for FeatureSelector {
    fn default() -> Self {
        Self {
            direction: Direction::Minimize,
            strategy: Strategy::Adding,
            search_depth: 4,
            patience: 2,
            add_feature_threshold: 0.0001,
            result_trace: None,
        }
    }
}

/// Mutable bookkeeping for one run.
#[derive(Debug, Clone)]
struct SearchState {
    remaining: Vec<String>,
    selected: Vec<String>,
    /// Features dropped by the removing strategy.
    discarded: Vec<String>,
    global_best_score: f64,
    global_best_features: Vec<String>,
    patience_counter: usize,
}

impl SearchState {
    fn new(strategy: Strategy, features: &[String], baseline: f64) -> Self {
        let selected = match strategy {
            Strategy::Adding => Vec::new(),
            Strategy::Removing => features.to_vec(),
        };
        Self {
            remaining: features.to_vec(),
            selected,
            discarded: Vec::new(),
            global_best_score: baseline,
            global_best_features: features.to_vec(),
            patience_counter: 0,
        }
    }

    /// Front of the list when adding; back of the list, nearest the end
    /// first, when removing.
    fn candidates(&self, strategy: Strategy, depth: usize) -> Vec<String> {
        let n = depth.min(self.remaining.len());
        match strategy {
            Strategy::Adding => self.remaining[..n].to_vec(),
            Strategy::Removing => self.remaining[self.remaining.len() - n..]
                .iter()
                .rev()
                .cloned()
                .collect(),
        }
    }

    fn combination(&self, strategy: Strategy, feature: &str) -> Vec<String> {
        match strategy {
            Strategy::Adding => {
                let mut combo = self.selected.clone();
                combo.push(feature.to_string());
                combo
            }
            Strategy::Removing => self
                .selected
                .iter()
                .filter(|f| f.as_str() != feature)
                .cloned()
                .collect(),
        }
    }

    fn commit(&mut self, strategy: Strategy, feature: &str) {
        self.remaining.retain(|f| f != feature);
        match strategy {
            Strategy::Adding => self.selected.push(feature.to_string()),
            Strategy::Removing => {
                self.selected.retain(|f| f != feature);
                self.discarded.push(feature.to_string());
            }
        }
    }

    /// Adding: `remaining` and `selected` partition the original list.
    /// Removing: `selected` and `discarded` do, and `remaining ⊆ selected`.
    fn is_consistent(&self, strategy: Strategy, original: &[String]) -> bool {
        let (left, right) = match strategy {
            Strategy::Adding => (&self.remaining, &self.selected),
            Strategy::Removing => (&self.selected, &self.discarded),
        };
        if left.len() + right.len() != original.len() {
            return false;
        }
        let mut union: Vec<&String> = left.iter().chain(right.iter()).collect();
        let mut expected: Vec<&String> = original.iter().collect();
        union.sort();
        expected.sort();
        if union != expected {
            return false;
        }
        match strategy {
            Strategy::Adding => true,
            Strategy::Removing => self.remaining.iter().all(|f| self.selected.contains(f)),
        }
    }
}

impl FeatureSelector {
    pub fn new(direction: Direction, strategy: Strategy) -> Self {
        Self {
            direction,
            strategy,
            ..Self::default()
        }
    }

    /// Best score per candidate-set size from the last completed run,
    /// including the all-features baseline.
    pub fn result_trace(&self) -> Option<&ResultTrace> {
        self.result_trace.as_ref()
    }

    fn validate(&self, ctx: &EvaluationContext) -> Result<()> {
        if self.search_depth == 0 {
            return Err(SelectorError::config("search_depth must be at least 1"));
        }
        if !self.add_feature_threshold.is_finite() {
            return Err(SelectorError::config("add_feature_threshold must be finite"));
        }
        let mut seen = std::collections::HashSet::new();
        if let Some(dup) = ctx.feature_list.iter().find(|f| !seen.insert(f.as_str())) {
            return Err(SelectorError::config(format!(
                "feature '{}' appears twice in feature_list",
                dup
            )));
        }
        Ok(())
    }

    fn accepts_global(&self, score: f64, global_best: f64) -> bool {
        let threshold = match self.strategy {
            Strategy::Adding => self.add_feature_threshold,
            Strategy::Removing => 0.0,
        };
        match self.direction {
            Direction::Minimize => score <= global_best + threshold,
            Direction::Maximize => score > global_best + threshold,
        }
    }

    /// Run the search and return the best feature list found. The context's
    /// `feature_list` is left as it was passed in.
    pub fn run(
        &mut self,
        eval_func: &mut dyn Evaluator,
        ctx: &mut EvaluationContext,
    ) -> Result<Vec<String>> {
        self.validate(ctx)?;
        let original = ctx.feature_list.clone();
        let outcome = self.search(eval_func, ctx, &original);
        ctx.feature_list = original;
        outcome
    }

    fn search(
        &mut self,
        eval_func: &mut dyn Evaluator,
        ctx: &mut EvaluationContext,
        original: &[String],
    ) -> Result<Vec<String>> {
        let mut trace = ResultTrace::new();

        let baseline = evaluate_checked(eval_func, ctx)?;
        info!(
            score = baseline,
            features = original.len(),
            "Baseline score with all features"
        );
        trace.insert(original.len(), baseline);

        let mut state = SearchState::new(self.strategy, original, baseline);

        // Stop at one remaining feature: the last move would re-evaluate the full set
        while state.remaining.len() > 1 {
            debug_assert!(state.is_consistent(self.strategy, original));

            let mut local_best: Option<(String, f64)> = None;
            let mut global_improvement = false;
            let mut combination_size = 0;

            for feature in state.candidates(self.strategy, self.search_depth) {
                debug!(strategy = %self.strategy, feature = %feature, "Probing feature");

                let combination = state.combination(self.strategy, &feature);
                combination_size = combination.len();
                ctx.feature_list = combination;
                let score = evaluate_checked(eval_func, ctx)?;

                if local_best
                    .as_ref()
                    .is_none_or(|(_, best)| self.direction.is_better(score, *best))
                {
                    local_best = Some((feature.clone(), score));
                }

                if self.accepts_global(score, state.global_best_score) {
                    state.global_best_score = score;
                    state.global_best_features = ctx.feature_list.clone();
                    global_improvement = true;
                    info!(
                        score,
                        features = ?state.global_best_features,
                        "Global best improved ({} feature {})",
                        self.strategy,
                        feature
                    );
                }
            }

            if global_improvement {
                state.patience_counter = 0;
            } else {
                state.patience_counter += 1;
                if state.patience_counter > self.patience {
                    info!(
                        rounds = state.patience_counter,
                        "No improvement within patience, stopping"
                    );
                    break;
                }
            }

            // Non-empty: remaining > 1 and depth >= 1
            let Some((best_feature, best_score)) = local_best else {
                break;
            };
            state.commit(self.strategy, &best_feature);
            debug!(
                score = best_score,
                selected = ?state.selected,
                "Finished round"
            );
            trace.insert(combination_size, best_score);
        }
        debug_assert!(state.is_consistent(self.strategy, original));

        info!(
            score = state.global_best_score,
            features = ?state.global_best_features,
            "FeatureSelector final best"
        );
        self.result_trace = Some(trace);
        Ok(state.global_best_features)
    }
}

impl Selector for FeatureSelector {
    fn name(&self) -> &str {
        "FeatureSelector"
    }

    fn context_update(&self) -> ContextUpdate {
        ContextUpdate::FeatureList
    }

    fn run(
        &mut self,
        eval_func: &mut dyn Evaluator,
        ctx: &mut EvaluationContext,
    ) -> Result<Assumption> {
        FeatureSelector::run(self, eval_func, ctx).map(Assumption::FeatureList)
    }

    fn trace(&self) -> Option<&ResultTrace> {
        self.result_trace()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::ModelKind;
    use crate::models::DataTable;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn context(features: &[&str]) -> EvaluationContext {
        EvaluationContext::new(DataTable::default(), ModelKind::Mean, names(features))
    }

    #[test]
    fn test_candidates_adding_take_front() {
        let state = SearchState::new(Strategy::Adding, &names(&["a", "b", "c", "d"]), 0.0);
        assert_eq!(state.candidates(Strategy::Adding, 2), names(&["a", "b"]));
        assert_eq!(state.candidates(Strategy::Adding, 10).len(), 4);
    }

    #[test]
    fn test_candidates_removing_take_back_reversed() {
        let state = SearchState::new(Strategy::Removing, &names(&["a", "b", "c", "d"]), 0.0);
        assert_eq!(state.candidates(Strategy::Removing, 2), names(&["d", "c"]));
        assert_eq!(
            state.candidates(Strategy::Removing, 9),
            names(&["d", "c", "b", "a"])
        );
    }

    #[test]
    fn test_commit_keeps_partition() {
        let original = names(&["a", "b", "c"]);

        let mut adding = SearchState::new(Strategy::Adding, &original, 0.0);
        assert!(adding.is_consistent(Strategy::Adding, &original));
        assert_eq!(adding.combination(Strategy::Adding, "b"), names(&["b"]));
        adding.commit(Strategy::Adding, "b");
        assert_eq!(adding.remaining, names(&["a", "c"]));
        assert_eq!(adding.selected, names(&["b"]));
        assert!(adding.is_consistent(Strategy::Adding, &original));

        let mut removing = SearchState::new(Strategy::Removing, &original, 0.0);
        assert_eq!(
            removing.combination(Strategy::Removing, "b"),
            names(&["a", "c"])
        );
        removing.commit(Strategy::Removing, "c");
        assert_eq!(removing.remaining, names(&["a", "b"]));
        assert_eq!(removing.selected, names(&["a", "b"]));
        assert!(removing.is_consistent(Strategy::Removing, &original));

        removing.selected.push("a".to_string());
        assert!(!removing.is_consistent(Strategy::Removing, &original));
    }

    #[test]
    fn test_zero_search_depth_is_rejected() {
        let mut fs = FeatureSelector {
            search_depth: 0,
            ..FeatureSelector::default()
        };
        let mut ctx = context(&["a", "b"]);
        let mut eval = |_: &EvaluationContext| -> Result<f64> { Ok(1.0) };
        assert!(matches!(
            fs.run(&mut eval, &mut ctx),
            Err(SelectorError::Configuration(_))
        ));
    }

    #[test]
    fn test_duplicate_features_are_rejected() {
        let mut fs = FeatureSelector::default();
        let mut ctx = context(&["a", "b", "a"]);
        let mut calls = 0;
        let mut eval = |_: &EvaluationContext| -> Result<f64> {
            calls += 1;
            Ok(1.0)
        };
        assert!(fs.run(&mut eval, &mut ctx).is_err());
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_single_feature_only_runs_baseline() {
        let mut fs = FeatureSelector::default();
        let mut ctx = context(&["only"]);
        let mut calls = 0;
        let mut eval = |_: &EvaluationContext| -> Result<f64> {
            calls += 1;
            Ok(3.0)
        };
        let best = fs.run(&mut eval, &mut ctx).unwrap();
        assert_eq!(best, names(&["only"]));
        assert_eq!(calls, 1);
        assert_eq!(fs.result_trace().unwrap().get(&1), Some(&3.0));
    }

    #[test]
    fn test_context_feature_list_is_restored() {
        let mut fs = FeatureSelector::default();
        let mut ctx = context(&["a", "b", "c"]);
        let mut eval = |c: &EvaluationContext| -> Result<f64> { Ok(c.feature_list.len() as f64) };
        fs.run(&mut eval, &mut ctx).unwrap();
        assert_eq!(ctx.feature_list, names(&["a", "b", "c"]));
    }

    #[test]
    fn test_evaluation_error_aborts_without_trace() {
        let mut fs = FeatureSelector::default();
        let mut ctx = context(&["a", "b", "c"]);
        let mut eval = |c: &EvaluationContext| -> Result<f64> {
            if c.feature_list.len() == 3 {
                Ok(1.0)
            } else {
                Ok(f64::NAN)
            }
        };
        assert!(matches!(
            fs.run(&mut eval, &mut ctx),
            Err(SelectorError::Evaluation(_))
        ));
        assert!(fs.result_trace().is_none());
        assert_eq!(ctx.feature_list, names(&["a", "b", "c"]));
    }

    #[test]
    fn test_maximize_with_negative_scores() {
        let mut fs = FeatureSelector::new(Direction::Maximize, Strategy::Adding);
        fs.add_feature_threshold = 0.0;
        let mut ctx = context(&["a", "b", "c"]);
        // Scores are all negative; "b" alone is best
        let mut eval = |c: &EvaluationContext| -> Result<f64> {
            Ok(match c.feature_list.as_slice() {
                [only] if only == "b" => -1.0,
                _ => -5.0 - c.feature_list.len() as f64,
            })
        };
        let best = fs.run(&mut eval, &mut ctx).unwrap();
        assert_eq!(best, names(&["b"]));
    }
}
