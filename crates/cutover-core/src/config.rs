//! cutover.toml configuration parser.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::error::CutoverError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CutoverConfig {
    pub listener: ListenerConfig,
    pub classification: ClassificationConfig,
    pub pairing: PairingConfig,
    pub scaling: ScalingPolicy,
}

/// Which listener on the load balancer carries the rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    pub protocol: String,
    pub port: u16,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            protocol: "HTTP".to_string(),
            port: 80,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationConfig {
    /// Condition field whose presence marks a rule as test traffic.
    pub test_marker_field: String,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            test_marker_field: "http-header".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PairingConfig {
    pub blue: String,
    pub green: String,
    /// Explicit name pairs for targets that cannot follow the token
    /// convention. Each entry pairs in both directions.
    pub overrides: BTreeMap<String, String>,
}

impl PairingConfig {
    /// Counterpart of `name` under the token convention alone: the first
    /// blue token becomes green, failing that the first green token
    /// becomes blue.
    pub fn conventional_pair(&self, name: &str) -> Option<String> {
        if name.contains(self.blue.as_str()) {
            Some(name.replacen(self.blue.as_str(), &self.green, 1))
        } else if name.contains(self.green.as_str()) {
            Some(name.replacen(self.green.as_str(), &self.blue, 1))
        } else {
            None
        }
    }
}

impl Default for PairingConfig {
    fn default() -> Self {
        Self {
            blue: "blue".to_string(),
            green: "green".to_string(),
            overrides: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScalingPolicy {
    /// Check that the counterpart scaling group exists before writing to it.
    pub require_counterpart_group: bool,
}

impl Default for ScalingPolicy {
    fn default() -> Self {
        Self {
            require_counterpart_group: true,
        }
    }
}

impl CutoverConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: CutoverConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject settings the engine cannot operate with.
    pub fn validate(&self) -> Result<(), CutoverError> {
        let pairing = &self.pairing;
        if pairing.blue.is_empty() || pairing.green.is_empty() {
            return Err(CutoverError::Config(
                "pairing tokens must not be empty".to_string(),
            ));
        }
        if pairing.blue == pairing.green {
            return Err(CutoverError::Config(format!(
                "pairing tokens must differ, both are {:?}",
                pairing.blue
            )));
        }
        if self.classification.test_marker_field.is_empty() {
            return Err(CutoverError::Config(
                "test_marker_field must not be empty".to_string(),
            ));
        }
        let mut seen = BTreeSet::new();
        for (name, counterpart) in &pairing.overrides {
            if name == counterpart {
                return Err(CutoverError::Config(format!(
                    "override pairs {name:?} with itself"
                )));
            }
            for n in [name, counterpart] {
                if !seen.insert(n.as_str()) {
                    return Err(CutoverError::Config(format!(
                        "{n:?} appears in more than one pairing override"
                    )));
                }
            }
            for (n, other) in [(name, counterpart), (counterpart, name)] {
                if let Some(conventional) = pairing.conventional_pair(n) {
                    if conventional != *other {
                        return Err(CutoverError::Config(format!(
                            "override pairs {n:?} with {other:?}, \
                             but its name pairs it with {conventional:?}"
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}
