//! Per-target availability.
//!
//! A target is available when at least one of its members reports
//! `healthy`. A target without members is unavailable.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use cutover_core::{CutoverError, CutoverResult, LoadBalancerControl, Rule, TargetId, Traffic};

use crate::classify::RuleClassifier;
use crate::resolve::TargetResolver;

/// Availability of both sides of a listener, keyed by target name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub production: BTreeMap<String, bool>,
    pub test: BTreeMap<String, bool>,
}

impl HealthReport {
    /// Whether every target on both sides is available.
    pub fn all_available(&self) -> bool {
        self.production.values().chain(self.test.values()).all(|up| *up)
    }
}

pub struct HealthProbe<'a, L> {
    lb: &'a L,
    classifier: &'a RuleClassifier,
    resolver: &'a TargetResolver,
}

impl<'a, L: LoadBalancerControl> HealthProbe<'a, L> {
    pub fn new(lb: &'a L, classifier: &'a RuleClassifier, resolver: &'a TargetResolver) -> Self {
        Self {
            lb,
            classifier,
            resolver,
        }
    }

    /// Reduce each target's member health to a single flag.
    pub fn status(
        &self,
        targets: &BTreeMap<String, TargetId>,
    ) -> CutoverResult<BTreeMap<String, bool>> {
        let mut status = BTreeMap::new();
        for (name, target_id) in targets {
            let members = self.lb.target_health(target_id).map_err(|source| {
                CutoverError::HealthRead {
                    target: target_id.clone(),
                    source,
                }
            })?;
            let available = members.iter().any(|m| m.state.is_healthy());
            debug!(target = %name, members = members.len(), available, "target health");
            status.insert(name.clone(), available);
        }
        Ok(status)
    }

    /// Availability of the targets on one side of the rule set.
    pub fn side_status(
        &self,
        rules: &[Rule],
        traffic: Traffic,
    ) -> CutoverResult<BTreeMap<String, bool>> {
        let partition = self.classifier.partition(rules);
        let targets = partition.targets(traffic, self.resolver)?;
        self.status(&targets)
    }

    pub fn production_status(&self, rules: &[Rule]) -> CutoverResult<BTreeMap<String, bool>> {
        self.side_status(rules, Traffic::Production)
    }

    pub fn test_status(&self, rules: &[Rule]) -> CutoverResult<BTreeMap<String, bool>> {
        self.side_status(rules, Traffic::Test)
    }

    pub fn report(&self, rules: &[Rule]) -> CutoverResult<HealthReport> {
        Ok(HealthReport {
            production: self.production_status(rules)?,
            test: self.test_status(rules)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::*;
    use cutover_core::{HealthState, TargetHealth};

    fn member(endpoint: &str, state: HealthState) -> TargetHealth {
        TargetHealth {
            endpoint: endpoint.to_string(),
            port: Some(8080),
            state,
        }
    }

    #[test]
    fn one_healthy_member_is_enough() {
        let rules = vec![default_rule("app-blue")];
        let store = store_with(&rules);
        store
            .put_target_health(
                &tg("app-blue"),
                &[
                    member("i-1", HealthState::Unhealthy),
                    member("i-2", HealthState::Healthy),
                ],
            )
            .unwrap();
        let (classifier, resolver) = (RuleClassifier::default(), TargetResolver::default());

        let status = HealthProbe::new(&store, &classifier, &resolver)
            .production_status(&rules)
            .unwrap();
        assert_eq!(status, BTreeMap::from([("app-blue".to_string(), true)]));
    }

    #[test]
    fn no_members_is_unavailable() {
        let rules = vec![default_rule("app-blue")];
        let store = store_with(&rules);
        store.put_target_health(&tg("app-blue"), &[]).unwrap();
        let (classifier, resolver) = (RuleClassifier::default(), TargetResolver::default());

        let status = HealthProbe::new(&store, &classifier, &resolver)
            .production_status(&rules)
            .unwrap();
        assert_eq!(status, BTreeMap::from([("app-blue".to_string(), false)]));
    }

    #[test]
    fn draining_and_initial_are_not_healthy() {
        let rules = vec![default_rule("app-blue"), header_rule("t", 1, "app-green")];
        let store = store_with(&rules);
        store
            .put_target_health(
                &tg("app-green"),
                &[
                    member("i-3", HealthState::Initial),
                    member("i-4", HealthState::Draining),
                ],
            )
            .unwrap();
        store
            .put_target_health(&tg("app-blue"), &[member("i-1", HealthState::Healthy)])
            .unwrap();
        let (classifier, resolver) = (RuleClassifier::default(), TargetResolver::default());

        let report = HealthProbe::new(&store, &classifier, &resolver)
            .report(&rules)
            .unwrap();
        assert!(report.production["app-blue"]);
        assert!(!report.test["app-green"]);
        assert!(!report.all_available());
    }

    #[test]
    fn health_lookup_failure_names_target() {
        let rules = vec![default_rule("app-blue")];
        let lb = FlakyLoadBalancer::new(store_with(&rules), usize::MAX).with_failing_health();
        let (classifier, resolver) = (RuleClassifier::default(), TargetResolver::default());

        let err = HealthProbe::new(&lb, &classifier, &resolver)
            .production_status(&rules)
            .unwrap_err();
        match err {
            CutoverError::HealthRead { target, source } => {
                assert_eq!(target, tg("app-blue"));
                assert_eq!(source, cutover_core::ControlError::Backend("timeout".to_string()));
            }
            other => panic!("expected HealthRead, got {other:?}"),
        }
    }
}
