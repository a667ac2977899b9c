//! Collaborator traits for the two remote control planes.
//!
//! The engine only ever talks to a load balancer and to a set of scaling
//! groups through these traits. Implementations are constructed and
//! credentialed by the caller and handed to the orchestrator; every call
//! is blocking and is expected to apply its own timeout/retry policy.

use thiserror::Error;

use crate::types::{LoadBalancer, Listener, Rule, ScalingConfig, TargetHealth};

/// Result type alias for control plane calls.
pub type ControlResult<T> = Result<T, ControlError>;

/// A control plane call that did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControlError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("rejected: {0}")]
    Rejected(String),

    #[error("backend error: {0}")]
    Backend(String),
}

/// Load balancer operations used by cutover.
pub trait LoadBalancerControl {
    /// Look a load balancer up by name.
    fn find_load_balancer(&self, name: &str) -> ControlResult<Option<LoadBalancer>>;

    fn list_listeners(&self, load_balancer_id: &str) -> ControlResult<Vec<Listener>>;

    /// All rules of a listener, default rule included.
    fn list_rules(&self, listener_id: &str) -> ControlResult<Vec<Rule>>;

    /// Replace the forward target of a non-default rule.
    fn set_rule_target(&self, rule_id: &str, target_id: &str) -> ControlResult<()>;

    /// Replace the forward target of a listener's default action.
    fn set_default_target(&self, listener_id: &str, target_id: &str) -> ControlResult<()>;

    /// Member health descriptions for one target.
    fn target_health(&self, target_id: &str) -> ControlResult<Vec<TargetHealth>>;
}

/// Scaling group operations used by cutover.
pub trait ScalingControl {
    /// Current capacity of a named group, `None` if no such group exists.
    fn capacity(&self, group: &str) -> ControlResult<Option<ScalingConfig>>;

    fn set_capacity(&self, group: &str, capacity: ScalingConfig) -> ControlResult<()>;
}

impl<T: LoadBalancerControl + ?Sized> LoadBalancerControl for &T {
    fn find_load_balancer(&self, name: &str) -> ControlResult<Option<LoadBalancer>> {
        (**self).find_load_balancer(name)
    }

    fn list_listeners(&self, load_balancer_id: &str) -> ControlResult<Vec<Listener>> {
        (**self).list_listeners(load_balancer_id)
    }

    fn list_rules(&self, listener_id: &str) -> ControlResult<Vec<Rule>> {
        (**self).list_rules(listener_id)
    }

    fn set_rule_target(&self, rule_id: &str, target_id: &str) -> ControlResult<()> {
        (**self).set_rule_target(rule_id, target_id)
    }

    fn set_default_target(&self, listener_id: &str, target_id: &str) -> ControlResult<()> {
        (**self).set_default_target(listener_id, target_id)
    }

    fn target_health(&self, target_id: &str) -> ControlResult<Vec<TargetHealth>> {
        (**self).target_health(target_id)
    }
}

impl<T: ScalingControl + ?Sized> ScalingControl for &T {
    fn capacity(&self, group: &str) -> ControlResult<Option<ScalingConfig>> {
        (**self).capacity(group)
    }

    fn set_capacity(&self, group: &str, capacity: ScalingConfig) -> ControlResult<()> {
        (**self).set_capacity(group, capacity)
    }
}
