//! Capacity lifecycle — boot and destroy the idle environment.
//!
//! Scaling groups are named after their target. `boot` copies each
//! production group's capacity onto its counterpart so the idle side can
//! take production load after a swap; `destroy` zeroes every group behind
//! a test-classified target.
//!
//! All groups are read and validated before the first write. Writes are
//! issued one group at a time; a failed write stops the operation and
//! reports which groups were already written.

use tracing::{debug, info, warn};

use cutover_core::{
    CapacityChange, CutoverError, CutoverResult, Rule, ScalingConfig, ScalingControl, Traffic,
};

use crate::classify::RuleClassifier;
use crate::resolve::TargetResolver;

pub struct CapacityLifecycleManager<'a, S> {
    scaling: &'a S,
    classifier: &'a RuleClassifier,
    resolver: &'a TargetResolver,
    require_counterpart_group: bool,
}

impl<'a, S: ScalingControl> CapacityLifecycleManager<'a, S> {
    pub fn new(
        scaling: &'a S,
        classifier: &'a RuleClassifier,
        resolver: &'a TargetResolver,
    ) -> Self {
        Self {
            scaling,
            classifier,
            resolver,
            require_counterpart_group: true,
        }
    }

    /// Write to counterpart groups even if they cannot be read first.
    pub fn with_require_counterpart_group(mut self, require: bool) -> Self {
        self.require_counterpart_group = require;
        self
    }

    /// Mirror every production group's capacity onto its counterpart.
    pub fn boot(&self, rules: &[Rule]) -> CutoverResult<Vec<CapacityChange>> {
        let partition = self.classifier.partition(rules);
        let production = partition.targets(Traffic::Production, self.resolver)?;

        let mut planned = Vec::with_capacity(production.len());
        for name in production.keys() {
            let capacity = self
                .read(name)?
                .ok_or_else(|| CutoverError::MissingScalingGroup(name.clone()))?;
            let counterpart = self.resolver.paired_name(name)?;
            let previous = self.counterpart_capacity(&counterpart)?;
            debug!(source = %name, group = %counterpart, %capacity, "planned boot");
            planned.push(CapacityChange {
                group: counterpart,
                previous,
                applied: capacity,
            });
        }

        self.write_all(&planned, "booted scaling group")?;
        Ok(planned)
    }

    /// Zero the capacity of every group behind a test-classified target.
    pub fn destroy(&self, rules: &[Rule]) -> CutoverResult<Vec<CapacityChange>> {
        let partition = self.classifier.partition(rules);
        let test = partition.targets(Traffic::Test, self.resolver)?;

        let mut planned = Vec::with_capacity(test.len());
        for name in test.keys() {
            let previous = self.counterpart_capacity(name)?;
            planned.push(CapacityChange {
                group: name.clone(),
                previous,
                applied: ScalingConfig::ZERO,
            });
        }

        self.write_all(&planned, "retired scaling group")?;
        Ok(planned)
    }

    fn counterpart_capacity(&self, group: &str) -> CutoverResult<Option<ScalingConfig>> {
        let capacity = self.read(group)?;
        if capacity.is_none() && self.require_counterpart_group {
            return Err(CutoverError::MissingScalingGroup(group.to_string()));
        }
        Ok(capacity)
    }

    fn read(&self, group: &str) -> CutoverResult<Option<ScalingConfig>> {
        self.scaling
            .capacity(group)
            .map_err(|source| CutoverError::ScalingRead {
                group: group.to_string(),
                source,
            })
    }

    /// Issue every write in order, stopping at the first failure.
    fn write_all(&self, changes: &[CapacityChange], message: &str) -> CutoverResult<()> {
        for (index, change) in changes.iter().enumerate() {
            if let Err(source) = self.scaling.set_capacity(&change.group, change.applied) {
                warn!(
                    group = %change.group,
                    written = index,
                    error = %source,
                    "capacity update interrupted"
                );
                return Err(CutoverError::CapacityInterrupted {
                    group: change.group.clone(),
                    applied: changes[..index].to_vec(),
                    remaining: changes[index..].to_vec(),
                    source,
                });
            }
            info!(
                group = %change.group,
                capacity = %change.applied,
                "{message}"
            );
        }
        Ok(())
    }
}
