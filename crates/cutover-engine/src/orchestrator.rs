//! BlueGreen — boot, healthcheck, swap and destroy over one load balancer.
//!
//! Every operation resolves the configured listener and reads its rule
//! set afresh; nothing is carried between calls. The control plane
//! handles are injected by the caller.

use std::collections::BTreeMap;

use tracing::{debug, info};

use cutover_core::{
    CapacityChange, CutoverConfig, CutoverError, CutoverResult, Listener, LoadBalancerControl,
    Rule, ScalingControl,
};

use crate::capacity::CapacityLifecycleManager;
use crate::classify::RuleClassifier;
use crate::health::{HealthProbe, HealthReport};
use crate::resolve::TargetResolver;
use crate::swap::{SwapEngine, SwapPlan, SwapReport};

pub struct BlueGreen<L, S> {
    load_balancer: String,
    lb: L,
    scaling: S,
    config: CutoverConfig,
    classifier: RuleClassifier,
    resolver: TargetResolver,
}

impl<L: LoadBalancerControl, S: ScalingControl> BlueGreen<L, S> {
    /// Operate on the named load balancer with default settings.
    pub fn new(load_balancer: &str, lb: L, scaling: S) -> Self {
        Self::with_config(load_balancer, lb, scaling, CutoverConfig::default())
    }

    pub fn with_config(load_balancer: &str, lb: L, scaling: S, config: CutoverConfig) -> Self {
        let classifier = RuleClassifier::new(&config.classification);
        let resolver = TargetResolver::new(&config.pairing);
        Self {
            load_balancer: load_balancer.to_string(),
            lb,
            scaling,
            config,
            classifier,
            resolver,
        }
    }

    pub fn load_balancer(&self) -> &str {
        &self.load_balancer
    }

    /// Find the listener bound to the configured protocol and port.
    pub fn resolve_listener(&self) -> CutoverResult<Listener> {
        let lb = self
            .lb
            .find_load_balancer(&self.load_balancer)?
            .ok_or_else(|| CutoverError::LoadBalancerNotFound(self.load_balancer.clone()))?;

        let wanted = &self.config.listener;
        self.lb
            .list_listeners(&lb.id)?
            .into_iter()
            .find(|l| l.binds(&wanted.protocol, wanted.port))
            .ok_or_else(|| CutoverError::ListenerNotFound {
                load_balancer: self.load_balancer.clone(),
                protocol: wanted.protocol.clone(),
                port: wanted.port,
            })
    }

    /// The listener and its current rules.
    pub fn snapshot(&self) -> CutoverResult<(Listener, Vec<Rule>)> {
        let listener = self.resolve_listener()?;
        let rules = self.lb.list_rules(&listener.id)?;
        debug!(
            load_balancer = %self.load_balancer,
            listener = %listener.id,
            rules = rules.len(),
            "rule snapshot"
        );
        Ok((listener, rules))
    }

    fn capacity(&self) -> CapacityLifecycleManager<'_, S> {
        CapacityLifecycleManager::new(&self.scaling, &self.classifier, &self.resolver)
            .with_require_counterpart_group(self.config.scaling.require_counterpart_group)
    }

    fn probe(&self) -> HealthProbe<'_, L> {
        HealthProbe::new(&self.lb, &self.classifier, &self.resolver)
    }

    fn engine(&self) -> SwapEngine<'_> {
        SwapEngine::new(&self.classifier, &self.resolver)
    }

    /// Give the test side the production side's capacity.
    pub fn boot(&self) -> CutoverResult<Vec<CapacityChange>> {
        let (_, rules) = self.snapshot()?;
        let changes = self.capacity().boot(&rules)?;
        info!(load_balancer = %self.load_balancer, groups = changes.len(), "boot complete");
        Ok(changes)
    }

    pub fn production_health_status(&self) -> CutoverResult<BTreeMap<String, bool>> {
        let (_, rules) = self.snapshot()?;
        self.probe().production_status(&rules)
    }

    pub fn testing_health_status(&self) -> CutoverResult<BTreeMap<String, bool>> {
        let (_, rules) = self.snapshot()?;
        self.probe().test_status(&rules)
    }

    /// Availability of both sides from a single rule snapshot.
    pub fn healthcheck(&self) -> CutoverResult<HealthReport> {
        let (_, rules) = self.snapshot()?;
        self.probe().report(&rules)
    }

    /// Compute the swap without applying it.
    pub fn plan_swap(&self) -> CutoverResult<SwapPlan> {
        let (listener, rules) = self.snapshot()?;
        self.engine().plan(&listener.id, &rules)
    }

    /// Exchange production and test roles across the listener.
    pub fn swap(&self) -> CutoverResult<SwapReport> {
        let plan = self.plan_swap()?;
        let report = plan.apply(&self.lb)?;
        info!(
            load_balancer = %self.load_balancer,
            rewrites = report.applied.len(),
            "swap complete"
        );
        Ok(report)
    }

    /// Retire the test side by zeroing its capacity.
    pub fn destroy(&self) -> CutoverResult<Vec<CapacityChange>> {
        let (_, rules) = self.snapshot()?;
        let changes = self.capacity().destroy(&rules)?;
        info!(load_balancer = %self.load_balancer, groups = changes.len(), "destroy complete");
        Ok(changes)
    }
}
