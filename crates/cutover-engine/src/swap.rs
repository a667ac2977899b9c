//! Swap engine — re-points every rule at its counterpart target.
//!
//! A swap is planned in full before anything is written: every rule is
//! classified, every target name is resolved and every counterpart is
//! looked up. Only a complete plan is applied. Application is one control
//! plane call per rule, production side first, and stops at the first
//! failed call.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use cutover_core::{
    CutoverError, CutoverResult, LoadBalancerControl, Rewrite, Rule, Traffic,
};

use crate::classify::RuleClassifier;
use crate::resolve::TargetResolver;

/// Computes swap plans for a listener's rule set.
#[derive(Debug, Clone, Copy)]
pub struct SwapEngine<'a> {
    classifier: &'a RuleClassifier,
    resolver: &'a TargetResolver,
}

impl<'a> SwapEngine<'a> {
    pub fn new(classifier: &'a RuleClassifier, resolver: &'a TargetResolver) -> Self {
        Self {
            classifier,
            resolver,
        }
    }

    /// Build the rewrite of every rule to its counterpart target.
    ///
    /// Fails without side effects if any target name is malformed, follows
    /// no pairing convention, or has no counterpart on the opposite side.
    pub fn plan(&self, listener_id: &str, rules: &[Rule]) -> CutoverResult<SwapPlan> {
        let partition = self.classifier.partition(rules);
        let production = partition.targets(Traffic::Production, self.resolver)?;
        let test = partition.targets(Traffic::Test, self.resolver)?;

        let mut rewrites = Vec::with_capacity(rules.len());
        for side in [Traffic::Production, Traffic::Test] {
            let opposite = match side {
                Traffic::Production => &test,
                Traffic::Test => &production,
            };
            for rule in partition.side(side) {
                let name = self.resolver.name_of(rule.target_id())?;
                let counterpart = self.resolver.paired_name(name)?;
                let to = opposite.get(&counterpart).ok_or_else(|| {
                    CutoverError::MissingCounterpart {
                        rule: rule.id.clone(),
                        target: name.to_string(),
                        counterpart: counterpart.clone(),
                    }
                })?;
                debug!(
                    rule = %rule.id,
                    %side,
                    from = %name,
                    to = %counterpart,
                    "planned rewrite"
                );
                rewrites.push(Rewrite {
                    rule_id: rule.id.clone(),
                    is_default: rule.is_default,
                    side,
                    from: rule.target_id().to_string(),
                    to: to.clone(),
                });
            }
        }

        Ok(SwapPlan {
            listener_id: listener_id.to_string(),
            rewrites,
        })
    }

    /// Plan and apply in one step.
    pub fn swap<L: LoadBalancerControl>(
        &self,
        lb: &L,
        listener_id: &str,
        rules: &[Rule],
    ) -> CutoverResult<SwapReport> {
        self.plan(listener_id, rules)?.apply(lb)
    }
}

/// Ordered rewrites for one listener: production-side rules first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapPlan {
    pub listener_id: String,
    pub rewrites: Vec<Rewrite>,
}

impl SwapPlan {
    pub fn is_empty(&self) -> bool {
        self.rewrites.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rewrites.len()
    }

    /// The plan that undoes this one, last rewrite first.
    pub fn inverse(&self) -> SwapPlan {
        SwapPlan {
            listener_id: self.listener_id.clone(),
            rewrites: self.rewrites.iter().rev().map(Rewrite::inverse).collect(),
        }
    }

    /// Issue every rewrite in order.
    ///
    /// On the first failed call, returns `SwapInterrupted` carrying the
    /// rewrites already in effect and those not applied. Nothing is rolled
    /// back; `SwapPlan { rewrites: applied, .. }.inverse()` undoes the
    /// partial swap.
    pub fn apply<L: LoadBalancerControl>(&self, lb: &L) -> CutoverResult<SwapReport> {
        info!(
            listener = %self.listener_id,
            rewrites = self.rewrites.len(),
            "applying swap"
        );

        for (index, rewrite) in self.rewrites.iter().enumerate() {
            let result = if rewrite.is_default {
                lb.set_default_target(&self.listener_id, &rewrite.to)
            } else {
                lb.set_rule_target(&rewrite.rule_id, &rewrite.to)
            };

            if let Err(source) = result {
                warn!(
                    listener = %self.listener_id,
                    rule = %rewrite.rule_id,
                    target = %rewrite.to,
                    applied = index,
                    remaining = self.rewrites.len() - index,
                    error = %source,
                    "swap interrupted; listener is partially swapped"
                );
                return Err(CutoverError::SwapInterrupted {
                    applied: self.rewrites[..index].to_vec(),
                    remaining: self.rewrites[index..].to_vec(),
                    source,
                });
            }

            info!(
                rule = %rewrite.rule_id,
                default = rewrite.is_default,
                side = %rewrite.side,
                from = %rewrite.from,
                to = %rewrite.to,
                "rule re-pointed"
            );
        }

        Ok(SwapReport {
            listener_id: self.listener_id.clone(),
            applied: self.rewrites.clone(),
        })
    }
}

/// Outcome of a fully applied swap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapReport {
    pub listener_id: String,
    pub applied: Vec<Rewrite>,
}
