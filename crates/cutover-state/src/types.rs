//! Persisted record shapes and the seed `Topology` document.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use cutover_core::{Rule, ScalingConfig, TargetHealth};

/// A rule as stored: the rule plus the listener that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRule {
    pub listener_id: String,
    pub rule: Rule,
}

// ── Topology ───────────────────────────────────────────────────────

/// Full description of one or more load balancers, used to seed a store.
///
/// ```json
/// {
///   "load_balancers": [{
///     "id": "lb-1", "name": "web",
///     "listeners": [{ "id": "l-80", "protocol": "HTTP", "port": 80, "rules": [] }]
///   }],
///   "target_health": { "tg/app-blue/1": [{ "endpoint": "i-1", "state": "healthy" }] },
///   "scaling_groups": { "app-blue": { "min": 2, "max": 6, "desired": 4 } }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Topology {
    pub load_balancers: Vec<LoadBalancerSpec>,
    pub target_health: BTreeMap<String, Vec<TargetHealth>>,
    pub scaling_groups: BTreeMap<String, ScalingConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadBalancerSpec {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub listeners: Vec<ListenerSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListenerSpec {
    pub id: String,
    pub protocol: String,
    pub port: u16,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

impl Topology {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
