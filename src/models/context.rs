use std::collections::BTreeMap;

use crate::evaluation::ModelKind;
use crate::models::params::{Hypers, ParamValue};
use crate::models::table::DataTable;

/// Everything an evaluation needs, threaded through every selector.
///
/// Selectors receive it mutably and substitute the field they search over
/// before each evaluation. They restore it before returning; the pipeline then
/// applies the winning choice.
#[derive(Debug, Clone)]
pub struct EvaluationContext {
    pub df: DataTable,
    pub model: ModelKind,
    pub feature_list: Vec<String>,
    pub hypers: Hypers,
    /// Callback-specific extras.
    pub extras: BTreeMap<String, ParamValue>,
}

impl EvaluationContext {
    pub fn new(df: DataTable, model: ModelKind, feature_list: Vec<String>) -> Self {
        Self {
            df,
            model,
            feature_list,
            hypers: Hypers::new(),
            extras: BTreeMap::new(),
        }
    }

    /// Context using every column except `label` as a feature, in column order.
    pub fn with_all_features(df: DataTable, model: ModelKind, label: &str) -> Self {
        let feature_list = df
            .column_names()
            .into_iter()
            .filter(|name| name != label)
            .collect();
        Self::new(df, model, feature_list)
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: ParamValue) -> Self {
        self.extras.insert(key.into(), value);
        self
    }

    pub fn extra(&self, key: &str) -> Option<&ParamValue> {
        self.extras.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_with_all_features_excludes_label() {
        let day = NaiveDate::from_ymd_opt(2022, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let df = DataTable::new(vec![day])
            .with_column("a", vec![1.0])
            .unwrap()
            .with_column("label", vec![2.0])
            .unwrap()
            .with_column("b", vec![3.0])
            .unwrap();

        let ctx = EvaluationContext::with_all_features(df, ModelKind::Mean, "label")
            .with_extra("label", ParamValue::Text("label".to_string()));
        assert_eq!(ctx.feature_list, vec!["a".to_string(), "b".to_string()]);
        assert!(ctx.hypers.is_empty());
        assert_eq!(ctx.extra("label").and_then(|v| v.as_str()), Some("label"));
    }
}
