//! Production/test classification of listener rules.

use std::collections::BTreeMap;

use tracing::debug;

use cutover_core::config::ClassificationConfig;
use cutover_core::{CutoverResult, Rule, TargetId, Traffic};

use crate::resolve::TargetResolver;

/// Decides which audience a rule serves.
///
/// A rule is `Test` if any of its conditions uses the marker field,
/// otherwise `Production`. The conditionless default rule is therefore
/// always `Production`.
#[derive(Debug, Clone)]
pub struct RuleClassifier {
    marker_field: String,
}

impl Default for RuleClassifier {
    fn default() -> Self {
        Self::new(&ClassificationConfig::default())
    }
}

impl RuleClassifier {
    pub fn new(config: &ClassificationConfig) -> Self {
        Self {
            marker_field: config.test_marker_field.clone(),
        }
    }

    pub fn classify(&self, rule: &Rule) -> Traffic {
        if rule.conditions.iter().any(|c| c.field == self.marker_field) {
            Traffic::Test
        } else {
            Traffic::Production
        }
    }

    /// Split a rule set into its production and test halves, preserving order.
    pub fn partition<'a>(&self, rules: &'a [Rule]) -> Partition<'a> {
        let mut partition = Partition::default();
        for rule in rules {
            match self.classify(rule) {
                Traffic::Production => partition.production.push(rule),
                Traffic::Test => partition.test.push(rule),
            }
        }
        debug!(
            production = partition.production.len(),
            test = partition.test.len(),
            "rules classified"
        );
        partition
    }
}

/// A rule set split by audience.
#[derive(Debug, Default)]
pub struct Partition<'a> {
    pub production: Vec<&'a Rule>,
    pub test: Vec<&'a Rule>,
}

impl<'a> Partition<'a> {
    pub fn side(&self, traffic: Traffic) -> &[&'a Rule] {
        match traffic {
            Traffic::Production => &self.production,
            Traffic::Test => &self.test,
        }
    }

    /// Target name → target identifier for every rule on one side.
    pub fn targets(
        &self,
        traffic: Traffic,
        resolver: &TargetResolver,
    ) -> CutoverResult<BTreeMap<String, TargetId>> {
        let mut targets = BTreeMap::new();
        for rule in self.side(traffic) {
            let name = resolver.name_of(rule.target_id())?;
            targets.insert(name.to_string(), rule.target_id().to_string());
        }
        Ok(targets)
    }
}
