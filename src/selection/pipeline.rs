//! Sequential selection of modeling assumptions.
//!
//! Rather than searching every assumption jointly, each concept (train start,
//! features, hyperparameters) is searched on its own, in order, with each
//! winner written back into the shared context before the next search. This
//! keeps every individual search space small.

use chrono::NaiveDateTime;
use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::info;

use crate::error::{Result, SelectorError};
use crate::evaluation::Evaluator;
use crate::models::{display_hypers, EvaluationContext, Hypers};
use crate::selection::selector::{Assumption, ContextUpdate, Selector};

/// Winning choice per selector, in pipeline order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BestAssumptions {
    entries: Vec<(String, Assumption)>,
}

impl BestAssumptions {
    /// Record a result; a repeated name replaces the earlier entry.
    pub fn insert(&mut self, name: impl Into<String>, assumption: Assumption) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = assumption,
            None => self.entries.push((name, assumption)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Assumption> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, a)| a)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Assumption)> {
        self.entries.iter().map(|(n, a)| (n.as_str(), a))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn train_start(&self) -> Option<NaiveDateTime> {
        self.entries.iter().find_map(|(_, a)| match a {
            Assumption::TrainStart(start) => Some(*start),
            _ => None,
        })
    }

    pub fn feature_list(&self) -> Option<&[String]> {
        self.entries.iter().find_map(|(_, a)| match a {
            Assumption::FeatureList(features) => Some(features.as_slice()),
            _ => None,
        })
    }

    pub fn hypers(&self) -> Option<&Hypers> {
        self.entries.iter().find_map(|(_, a)| match a {
            Assumption::Hypers(hypers) => Some(hypers),
            _ => None,
        })
    }
}

impl Serialize for BestAssumptions {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, assumption) in &self.entries {
            map.serialize_entry(name, assumption)?;
        }
        map.end()
    }
}

/// Write a selector's result into the context, as chosen by its declared
/// update kind.
pub fn apply_update(
    update: ContextUpdate,
    assumption: &Assumption,
    ctx: &mut EvaluationContext,
) -> Result<()> {
    match (update, assumption) {
        (ContextUpdate::TrainingWindow, Assumption::TrainStart(start)) => {
            ctx.df = ctx.df.filter_from(*start);
            info!(start = %start, rows = ctx.df.len(), "Updated df to selected train start");
        }
        (ContextUpdate::FeatureList, Assumption::FeatureList(features)) => {
            ctx.feature_list = features.clone();
            info!(features = ?features, "Updated feature_list to selected");
        }
        (ContextUpdate::Hyperparameters, Assumption::Hypers(hypers)) => {
            ctx.hypers = hypers.clone();
            info!("Updated hyperparameters to selected: {}", display_hypers(hypers));
        }
        (ContextUpdate::None, _) => {}
        (update, other) => {
            return Err(SelectorError::config(format!(
                "selector declared a {:?} update but returned {:?}",
                update, other
            )));
        }
    }
    Ok(())
}

/// Runs selectors in a fixed order against one shared context.
#[derive(Default)]
pub struct AssumptionSelector {
    selectors: Vec<Box<dyn Selector>>,
}

impl AssumptionSelector {
    pub fn new(selectors: Vec<Box<dyn Selector>>) -> Self {
        Self { selectors }
    }

    pub fn push(mut self, selector: impl Selector + 'static) -> Self {
        self.selectors.push(Box::new(selector));
        self
    }

    pub fn selectors(&self) -> &[Box<dyn Selector>] {
        &self.selectors
    }

    /// Run every selector in order. After each one, its result is applied to
    /// `ctx`, so on success `ctx` holds the final assumptions.
    pub fn run(
        &mut self,
        eval_func: &mut dyn Evaluator,
        ctx: &mut EvaluationContext,
    ) -> Result<BestAssumptions> {
        let mut best = BestAssumptions::default();

        for selector in self.selectors.iter_mut() {
            info!(selector = selector.name(), "Running selector");
            let assumption = selector.run(eval_func, ctx)?;
            apply_update(selector.context_update(), &assumption, ctx)?;
            best.insert(selector.name(), assumption);
        }

        Ok(best)
    }
}
