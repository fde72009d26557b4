use std::collections::HashSet;

use chrono::NaiveDate;

use assumption_selector_rs::error::Result;
use assumption_selector_rs::{
    DataTable, Direction, EvaluationContext, FeatureSelector, ModelKind, Strategy,
};

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn context(features: &[&str]) -> EvaluationContext {
    let day = NaiveDate::from_ymd_opt(2022, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    EvaluationContext::new(DataTable::new(vec![day]), ModelKind::Mean, names(features))
}

fn contains(list: &[String], name: &str) -> bool {
    list.iter().any(|f| f == name)
}

#[test]
fn test_adding_keeps_pair_and_rejects_useless_feature() {
    let mut fs = FeatureSelector::default();
    let mut ctx = context(&["a", "b", "c"]);
    let mut eval = |c: &EvaluationContext| -> Result<f64> {
        let list = &c.feature_list;
        Ok(if contains(list, "a") && contains(list, "b") {
            2.0
        } else if contains(list, "a") {
            5.0
        } else {
            10.0
        })
    };

    let best = fs.run(&mut eval, &mut ctx).unwrap();
    assert_eq!(best, names(&["a", "b"]));
    assert_eq!(ctx.feature_list, names(&["a", "b", "c"]));
}

#[test]
fn test_removing_with_equal_scores_shrinks_to_one_feature() {
    let mut fs = FeatureSelector::new(Direction::Minimize, Strategy::Removing);
    let mut ctx = context(&["x", "y", "z"]);
    let mut eval = |_: &EvaluationContext| -> Result<f64> { Ok(1.0) };

    let best = fs.run(&mut eval, &mut ctx).unwrap();
    assert_eq!(best.len(), 1);
    assert!(["x", "y", "z"].contains(&best[0].as_str()));
}

#[test]
fn test_exhaustive_call_count_with_large_patience() {
    let mut fs = FeatureSelector::default();
    fs.search_depth = 3;
    fs.patience = 100;
    let mut ctx = context(&["a", "b", "c"]);

    let mut calls = 0;
    let mut eval = |c: &EvaluationContext| -> Result<f64> {
        calls += 1;
        Ok(c.feature_list.len() as f64)
    };
    fs.run(&mut eval, &mut ctx).unwrap();

    // Baseline, then 3 then 2 candidates
    assert_eq!(calls, 6);
    let sizes: Vec<usize> = fs.result_trace().unwrap().keys().copied().collect();
    assert_eq!(sizes, vec![1, 2, 3]);
}

#[test]
fn test_zero_patience_stops_after_first_flat_round() {
    let mut fs = FeatureSelector::default();
    fs.patience = 0;
    let mut ctx = context(&["a", "b", "c", "d"]);

    let mut calls = 0;
    // Full list is best, every smaller set is worse
    let mut eval = |c: &EvaluationContext| -> Result<f64> {
        calls += 1;
        Ok(if c.feature_list.len() == 4 { 0.0 } else { 1.0 })
    };
    let best = fs.run(&mut eval, &mut ctx).unwrap();

    assert_eq!(calls, 1 + 4);
    assert_eq!(best, names(&["a", "b", "c", "d"]));
    // Non-improving round is not committed
    assert_eq!(fs.result_trace().unwrap().len(), 1);
}

/// Additive score: some features help, some hurt.
fn additive_score(list: &[String]) -> f64 {
    list.iter()
        .map(|f| match f.as_str() {
            "f1" => -3.0,
            "f2" => 1.5,
            "f3" => -0.5,
            "f4" => 2.0,
            _ => 0.25,
        })
        .sum::<f64>()
        + 10.0
}

#[test]
fn test_result_never_worse_than_baseline() {
    let features = ["f1", "f2", "f3", "f4", "f5"];
    for strategy in [Strategy::Adding, Strategy::Removing] {
        let mut fs = FeatureSelector::new(Direction::Minimize, strategy);
        fs.add_feature_threshold = 0.0;
        fs.patience = 10;
        let mut ctx = context(&features);
        let baseline = additive_score(&ctx.feature_list);

        let mut eval = |c: &EvaluationContext| -> Result<f64> { Ok(additive_score(&c.feature_list)) };
        let best = fs.run(&mut eval, &mut ctx).unwrap();
        assert!(additive_score(&best) <= baseline, "{:?} got {:?}", strategy, best);
    }
}

#[test]
fn test_candidate_sets_shrink_and_stay_within_original() {
    let original = ["a", "b", "c", "d", "e"];
    let mut fs = FeatureSelector::default();
    fs.search_depth = 2;
    fs.patience = 10;
    let mut ctx = context(&original);

    let mut seen: Vec<Vec<String>> = Vec::new();
    let mut eval = |c: &EvaluationContext| -> Result<f64> {
        seen.push(c.feature_list.clone());
        Ok(c.feature_list.len() as f64)
    };
    fs.run(&mut eval, &mut ctx).unwrap();

    let allowed: HashSet<&str> = original.iter().copied().collect();
    for combo in &seen {
        let unique: HashSet<&str> = combo.iter().map(String::as_str).collect();
        assert_eq!(unique.len(), combo.len(), "duplicate in {:?}", combo);
        assert!(unique.is_subset(&allowed));
    }

    // After the baseline, probed sets grow by one feature per round
    let sizes: Vec<usize> = seen[1..].iter().map(Vec::len).collect();
    assert!(sizes.windows(2).all(|w| w[1] == w[0] || w[1] == w[0] + 1));
    assert_eq!(sizes.first(), Some(&1));
    assert_eq!(sizes.last(), Some(&4));
}

#[test]
fn test_maximize_adding_picks_best_feature() {
    let mut fs = FeatureSelector::new(Direction::Maximize, Strategy::Adding);
    let mut ctx = context(&["weak", "strong", "noise"]);
    let mut eval = |c: &EvaluationContext| -> Result<f64> {
        let list = &c.feature_list;
        let mut score = 0.0;
        if contains(list, "strong") {
            score += 0.8;
        }
        if contains(list, "weak") {
            score += 0.1;
        }
        if contains(list, "noise") {
            score -= 0.3;
        }
        Ok(score)
    };

    let best = fs.run(&mut eval, &mut ctx).unwrap();
    let best: HashSet<&str> = best.iter().map(String::as_str).collect();
    assert_eq!(best, HashSet::from(["weak", "strong"]));
}

#[test]
fn test_adding_accepts_slightly_worse_set_within_threshold() {
    let mut fs = FeatureSelector::default();
    fs.add_feature_threshold = 0.5;
    let mut ctx = context(&["a", "b", "c"]);
    // [a] is 0.3 worse than the full set, inside the threshold
    let mut eval = |c: &EvaluationContext| -> Result<f64> {
        let list = &c.feature_list;
        Ok(if list.len() == 3 {
            1.0
        } else if list == &names(&["a"]) {
            1.3
        } else {
            5.0
        })
    };

    let best = fs.run(&mut eval, &mut ctx).unwrap();
    assert_eq!(best, names(&["a"]));
}

#[test]
fn test_maximize_rejects_gain_below_threshold() {
    let mut fs = FeatureSelector::new(Direction::Maximize, Strategy::Adding);
    fs.add_feature_threshold = 0.5;
    fs.patience = 0;
    let mut ctx = context(&["a", "b", "c", "d"]);

    let mut calls = 0;
    let mut eval = |c: &EvaluationContext| -> Result<f64> {
        calls += 1;
        let list = &c.feature_list;
        Ok(if list.len() == 4 {
            1.0
        } else if list == &names(&["a"]) {
            1.2
        } else {
            0.0
        })
    };

    let best = fs.run(&mut eval, &mut ctx).unwrap();
    assert_eq!(best, names(&["a", "b", "c", "d"]));
    // The small gain counts as a flat round, so patience stops the search
    assert_eq!(calls, 1 + 4);
    assert_eq!(fs.result_trace().unwrap().len(), 1);
}

#[test]
fn test_removing_ties_keep_last_global_and_commit_first_local() {
    let mut fs = FeatureSelector::new(Direction::Minimize, Strategy::Removing);
    let mut ctx = context(&["x", "y", "z"]);
    let mut probed: Vec<Vec<String>> = Vec::new();
    let mut eval = |c: &EvaluationContext| -> Result<f64> {
        probed.push(c.feature_list.clone());
        Ok(1.0)
    };

    let best = fs.run(&mut eval, &mut ctx).unwrap();
    assert_eq!(best, names(&["y"]));
    // Round one drops z (first probed), round two probes from [x, y]
    assert_eq!(probed[4], names(&["x"]));
    assert_eq!(probed[5], names(&["y"]));
}
