//! Target names and blue/green pairing.
//!
//! A target identifier carries its human-readable name as the
//! second-to-last `/` segment (`arn:...:targetgroup/app-blue/abcd1234`).
//! Two names are paired when they differ only by the blue/green token.

use std::collections::BTreeMap;

use cutover_core::config::PairingConfig;
use cutover_core::{CutoverError, CutoverResult};

/// Extract a target's name from its identifier.
pub fn name_of(target_id: &str) -> CutoverResult<&str> {
    let mut segments = target_id.rsplit('/');
    let _last = segments.next();
    match segments.next() {
        Some(name) if !name.is_empty() => Ok(name),
        _ => Err(CutoverError::MalformedIdentifier(target_id.to_string())),
    }
}

/// Maps a target name to the name of its counterpart environment.
#[derive(Debug, Clone)]
pub struct TargetResolver {
    pairing: PairingConfig,
    /// Explicit pairs, stored in both directions.
    overrides: BTreeMap<String, String>,
}

impl Default for TargetResolver {
    fn default() -> Self {
        Self::new(&PairingConfig::default())
    }
}

impl TargetResolver {
    pub fn new(pairing: &PairingConfig) -> Self {
        let mut overrides = BTreeMap::new();
        for (a, b) in &pairing.overrides {
            overrides.insert(a.clone(), b.clone());
            overrides.insert(b.clone(), a.clone());
        }
        Self {
            pairing: pairing.clone(),
            overrides,
        }
    }

    pub fn name_of<'a>(&self, target_id: &'a str) -> CutoverResult<&'a str> {
        name_of(target_id)
    }

    /// Name of the counterpart of `name`.
    ///
    /// An explicit override wins. Otherwise the first blue token becomes
    /// green; failing that, the first green token becomes blue.
    pub fn paired_name(&self, name: &str) -> CutoverResult<String> {
        if let Some(paired) = self.overrides.get(name) {
            return Ok(paired.clone());
        }
        self.pairing
            .conventional_pair(name)
            .ok_or_else(|| CutoverError::UnpairedName(name.to_string()))
    }
}
