//! Load balancer data model shared across cutover crates.
//!
//! These mirror what the control plane reports: load balancers own
//! listeners, listeners own an ordered rule set, and every rule forwards
//! to exactly one target. Scaling groups are matched to targets by name.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of a forwarding target (e.g. a target group ARN).
pub type TargetId = String;

/// Opaque identifier of a routing rule.
pub type RuleId = String;

// ── Load balancer ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadBalancer {
    pub id: String,
    pub name: String,
}

/// One protocol/port binding on a load balancer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listener {
    pub id: String,
    pub load_balancer_id: String,
    pub protocol: String,
    pub port: u16,
}

impl Listener {
    /// Whether this listener is bound to `protocol:port` (protocol is
    /// compared case-insensitively).
    pub fn binds(&self, protocol: &str, port: u16) -> bool {
        self.port == port && self.protocol.eq_ignore_ascii_case(protocol)
    }
}

// ── Rules ──────────────────────────────────────────────────────────

/// A routing rule attached to a listener.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub id: RuleId,
    /// Evaluation order. `None` for the listener's default rule.
    #[serde(default)]
    pub priority: Option<u32>,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    pub action: ForwardAction,
    /// The listener's catch-all rule. Its action is the listener's
    /// default action and can only be changed through the listener.
    #[serde(default)]
    pub is_default: bool,
}

impl Rule {
    /// Identifier of the target this rule currently forwards to.
    pub fn target_id(&self) -> &str {
        &self.action.target_id
    }
}

/// A field/value match predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    #[serde(default)]
    pub values: Vec<String>,
}

/// Forward all matched requests to a single target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardAction {
    pub target_id: TargetId,
}

/// Which audience a rule serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Traffic {
    Production,
    Test,
}

impl Traffic {
    /// The other side of the pair.
    pub fn opposite(self) -> Self {
        match self {
            Traffic::Production => Traffic::Test,
            Traffic::Test => Traffic::Production,
        }
    }
}

impl fmt::Display for Traffic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Traffic::Production => f.write_str("production"),
            Traffic::Test => f.write_str("test"),
        }
    }
}

// ── Rewrites ───────────────────────────────────────────────────────

/// Re-point one rule from its current target to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rewrite {
    pub rule_id: RuleId,
    /// Applies to the listener's default action rather than the rule.
    pub is_default: bool,
    /// Classification of the rule before the rewrite.
    pub side: Traffic,
    pub from: TargetId,
    pub to: TargetId,
}

impl Rewrite {
    /// The rewrite that puts the rule back where it was.
    pub fn inverse(&self) -> Rewrite {
        Rewrite {
            rule_id: self.rule_id.clone(),
            is_default: self.is_default,
            side: self.side,
            from: self.to.clone(),
            to: self.from.clone(),
        }
    }
}

// ── Target health ──────────────────────────────────────────────────

/// Health of one registered endpoint in a target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetHealth {
    pub endpoint: String,
    #[serde(default)]
    pub port: Option<u16>,
    pub state: HealthState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Initial,
    Healthy,
    Unhealthy,
    Unused,
    Draining,
    Unavailable,
}

impl HealthState {
    pub fn is_healthy(self) -> bool {
        self == HealthState::Healthy
    }
}

// ── Scaling ────────────────────────────────────────────────────────

/// Capacity triple of a scaling group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalingConfig {
    pub min: u32,
    pub max: u32,
    pub desired: u32,
}

impl ScalingConfig {
    /// Retired capacity.
    pub const ZERO: ScalingConfig = ScalingConfig {
        min: 0,
        max: 0,
        desired: 0,
    };

    pub fn new(min: u32, max: u32, desired: u32) -> Self {
        Self { min, max, desired }
    }
}

impl fmt::Display for ScalingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "min={} max={} desired={}",
            self.min, self.max, self.desired
        )
    }
}

/// A capacity write performed on one scaling group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityChange {
    pub group: String,
    /// Capacity before the write, if the group existed.
    pub previous: Option<ScalingConfig>,
    pub applied: ScalingConfig,
}
