//! `LoadBalancerControl` and `ScalingControl` over the local store.

use cutover_core::{
    ControlResult, LoadBalancer, LoadBalancerControl, Listener, Rule, ScalingConfig,
    ScalingControl, TargetHealth,
};

use crate::store::StateStore;

impl LoadBalancerControl for StateStore {
    fn find_load_balancer(&self, name: &str) -> ControlResult<Option<LoadBalancer>> {
        Ok(self.get_load_balancer(name)?)
    }

    fn list_listeners(&self, load_balancer_id: &str) -> ControlResult<Vec<Listener>> {
        Ok(self.list_listeners_for(load_balancer_id)?)
    }

    fn list_rules(&self, listener_id: &str) -> ControlResult<Vec<Rule>> {
        Ok(self.list_rules_for(listener_id)?)
    }

    fn set_rule_target(&self, rule_id: &str, target_id: &str) -> ControlResult<()> {
        Ok(self.update_rule_target(rule_id, target_id)?)
    }

    fn set_default_target(&self, listener_id: &str, target_id: &str) -> ControlResult<()> {
        Ok(self.update_default_target(listener_id, target_id)?)
    }

    fn target_health(&self, target_id: &str) -> ControlResult<Vec<TargetHealth>> {
        Ok(self.get_target_health(target_id)?)
    }
}

impl ScalingControl for StateStore {
    fn capacity(&self, group: &str) -> ControlResult<Option<ScalingConfig>> {
        Ok(self.get_scaling_group(group)?)
    }

    fn set_capacity(&self, group: &str, capacity: ScalingConfig) -> ControlResult<()> {
        Ok(self.put_scaling_group(group, capacity)?)
    }
}
