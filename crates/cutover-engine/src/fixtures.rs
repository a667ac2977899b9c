//! Shared test fixtures: rule builders, a seeded in-memory control plane,
//! and control plane wrappers that fail on a chosen call.

use std::cell::Cell;

use cutover_core::{
    Condition, ControlError, ControlResult, ForwardAction, LoadBalancer, LoadBalancerControl,
    Listener, Rule, ScalingConfig, ScalingControl, TargetHealth,
};
use cutover_state::StateStore;

pub const LISTENER: &str = "l-80";

pub fn tg(name: &str) -> String {
    format!("arn:aws:elasticloadbalancing:us-west-2:123:targetgroup/{name}/{:08x}", name.len())
}

pub fn default_rule(target: &str) -> Rule {
    Rule {
        id: "r-default".to_string(),
        priority: None,
        conditions: vec![],
        action: ForwardAction { target_id: tg(target) },
        is_default: true,
    }
}

pub fn path_rule(id: &str, priority: u32, target: &str) -> Rule {
    Rule {
        id: id.to_string(),
        priority: Some(priority),
        conditions: vec![Condition {
            field: "path-pattern".to_string(),
            values: vec![format!("/{id}/*")],
        }],
        action: ForwardAction { target_id: tg(target) },
        is_default: false,
    }
}

pub fn header_rule(id: &str, priority: u32, target: &str) -> Rule {
    Rule {
        id: id.to_string(),
        priority: Some(priority),
        conditions: vec![Condition {
            field: "http-header".to_string(),
            values: vec!["X-Test-Traffic".to_string()],
        }],
        action: ForwardAction { target_id: tg(target) },
        is_default: false,
    }
}

/// In-memory store with load balancer `web` and an HTTP:80 listener
/// holding `rules`.
pub fn store_with(rules: &[Rule]) -> StateStore {
    let store = StateStore::open_in_memory().unwrap();
    store
        .put_load_balancer(&LoadBalancer {
            id: "lb-1".to_string(),
            name: "web".to_string(),
        })
        .unwrap();
    store
        .put_listener(&Listener {
            id: LISTENER.to_string(),
            load_balancer_id: "lb-1".to_string(),
            protocol: "HTTP".to_string(),
            port: 80,
        })
        .unwrap();
    for rule in rules {
        store.put_rule(LISTENER, rule).unwrap();
    }
    store
}

/// Current target name of every rule, in listing order.
pub fn targets_by_rule(store: &StateStore) -> Vec<(String, String)> {
    store
        .list_rules_for(LISTENER)
        .unwrap()
        .into_iter()
        .map(|r| {
            let name = crate::resolve::name_of(r.target_id()).unwrap().to_string();
            (r.id, name)
        })
        .collect()
}

/// Delegates to a store but fails the `fail_on`-th write (0-based).
pub struct FlakyLoadBalancer {
    pub inner: StateStore,
    writes: Countdown,
    fail_health: bool,
}

impl FlakyLoadBalancer {
    pub fn new(inner: StateStore, fail_on: usize) -> Self {
        Self {
            inner,
            writes: Countdown::new(fail_on),
            fail_health: false,
        }
    }

    /// Also fail every target health lookup.
    pub fn with_failing_health(mut self) -> Self {
        self.fail_health = true;
        self
    }
}

/// Counts calls and fails the `fail_on`-th one (0-based).
struct Countdown {
    fail_on: usize,
    calls: Cell<usize>,
}

impl Countdown {
    fn new(fail_on: usize) -> Self {
        Self {
            fail_on,
            calls: Cell::new(0),
        }
    }

    fn tick(&self) -> ControlResult<()> {
        let n = self.calls.get();
        self.calls.set(n + 1);
        if n == self.fail_on {
            Err(ControlError::Backend("throttled".to_string()))
        } else {
            Ok(())
        }
    }
}

impl LoadBalancerControl for FlakyLoadBalancer {
    fn find_load_balancer(&self, name: &str) -> ControlResult<Option<LoadBalancer>> {
        self.inner.find_load_balancer(name)
    }

    fn list_listeners(&self, load_balancer_id: &str) -> ControlResult<Vec<Listener>> {
        self.inner.list_listeners(load_balancer_id)
    }

    fn list_rules(&self, listener_id: &str) -> ControlResult<Vec<Rule>> {
        self.inner.list_rules(listener_id)
    }

    fn set_rule_target(&self, rule_id: &str, target_id: &str) -> ControlResult<()> {
        self.writes.tick()?;
        self.inner.set_rule_target(rule_id, target_id)
    }

    fn set_default_target(&self, listener_id: &str, target_id: &str) -> ControlResult<()> {
        self.writes.tick()?;
        self.inner.set_default_target(listener_id, target_id)
    }

    fn target_health(&self, target_id: &str) -> ControlResult<Vec<TargetHealth>> {
        if self.fail_health {
            return Err(ControlError::Backend("timeout".to_string()));
        }
        self.inner.target_health(target_id)
    }
}

/// Delegates to a store but fails the `fail_on`-th capacity write (0-based).
pub struct FlakyScaling {
    pub inner: StateStore,
    writes: Countdown,
}

impl FlakyScaling {
    pub fn new(inner: StateStore, fail_on: usize) -> Self {
        Self {
            inner,
            writes: Countdown::new(fail_on),
        }
    }
}

impl ScalingControl for FlakyScaling {
    fn capacity(&self, group: &str) -> ControlResult<Option<ScalingConfig>> {
        self.inner.capacity(group)
    }

    fn set_capacity(&self, group: &str, capacity: ScalingConfig) -> ControlResult<()> {
        self.writes.tick()?;
        self.inner.set_capacity(group, capacity)
    }
}
