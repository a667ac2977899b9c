//! StateStore — redb-backed persistence for the local control plane.
//!
//! Provides typed access to load balancers, listeners, rules, target
//! health and scaling groups. All values are JSON-serialized into redb's
//! `&[u8]` value columns. The store supports both on-disk and in-memory
//! backends (the latter for testing).

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use cutover_core::{LoadBalancer, Listener, Rule, ScalingConfig, TargetHealth};

use crate::error::{StateError, StateResult};
use crate::tables::*;
use crate::types::*;

/// Convert any `Display` error into a `StateError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| StateError::$variant(e.to_string())
    };
}

/// Thread-safe state store backed by redb.
#[derive(Clone)]
pub struct StateStore {
    db: Arc<Database>,
}

impl StateStore {
    /// Open (or create) a persistent state store at the given path.
    pub fn open(path: &Path) -> StateResult<Self> {
        let db = Database::create(path).map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!(?path, "state store opened");
        Ok(store)
    }

    /// Create an ephemeral in-memory state store (for testing).
    pub fn open_in_memory() -> StateResult<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        let db = Database::builder()
            .create_with_backend(backend)
            .map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!("in-memory state store opened");
        Ok(store)
    }

    /// Create all tables if they don't exist yet.
    fn ensure_tables(&self) -> StateResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        for table in [LOAD_BALANCERS, LISTENERS, RULES, TARGET_HEALTH, SCALING_GROUPS] {
            txn.open_table(table).map_err(map_err!(Table))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    // ── Generic JSON rows ──────────────────────────────────────────

    fn put_json<T: Serialize>(&self, table: JsonTable, key: &str, value: &T) -> StateResult<()> {
        let value = serde_json::to_vec(value).map_err(map_err!(Serialize))?;
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut table = txn.open_table(table).map_err(map_err!(Table))?;
            table
                .insert(key, value.as_slice())
                .map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    fn get_json<T: DeserializeOwned>(&self, table: JsonTable, key: &str) -> StateResult<Option<T>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(table).map_err(map_err!(Table))?;
        match table.get(key).map_err(map_err!(Read))? {
            Some(guard) => {
                let value = serde_json::from_slice(guard.value()).map_err(map_err!(Deserialize))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn scan_json<T: DeserializeOwned>(&self, table: JsonTable) -> StateResult<Vec<T>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(table).map_err(map_err!(Table))?;
        let mut results = Vec::new();
        for entry in table.iter().map_err(map_err!(Read))? {
            let (_, value) = entry.map_err(map_err!(Read))?;
            results.push(serde_json::from_slice(value.value()).map_err(map_err!(Deserialize))?);
        }
        Ok(results)
    }

    // ── Topology ───────────────────────────────────────────────────

    /// Write every record of a topology in a single transaction.
    ///
    /// Existing records with the same keys are replaced; nothing is removed.
    pub fn import(&self, topology: &Topology) -> StateResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut lbs = txn.open_table(LOAD_BALANCERS).map_err(map_err!(Table))?;
            let mut listeners = txn.open_table(LISTENERS).map_err(map_err!(Table))?;
            let mut rules = txn.open_table(RULES).map_err(map_err!(Table))?;

            for spec in &topology.load_balancers {
                let lb = LoadBalancer {
                    id: spec.id.clone(),
                    name: spec.name.clone(),
                };
                let value = serde_json::to_vec(&lb).map_err(map_err!(Serialize))?;
                lbs.insert(lb.name.as_str(), value.as_slice())
                    .map_err(map_err!(Write))?;

                for ls in &spec.listeners {
                    let listener = Listener {
                        id: ls.id.clone(),
                        load_balancer_id: spec.id.clone(),
                        protocol: ls.protocol.clone(),
                        port: ls.port,
                    };
                    let value = serde_json::to_vec(&listener).map_err(map_err!(Serialize))?;
                    listeners
                        .insert(listener.id.as_str(), value.as_slice())
                        .map_err(map_err!(Write))?;

                    for rule in &ls.rules {
                        let stored = StoredRule {
                            listener_id: ls.id.clone(),
                            rule: rule.clone(),
                        };
                        let value = serde_json::to_vec(&stored).map_err(map_err!(Serialize))?;
                        rules
                            .insert(rule.id.as_str(), value.as_slice())
                            .map_err(map_err!(Write))?;
                    }
                }
            }

            let mut health = txn.open_table(TARGET_HEALTH).map_err(map_err!(Table))?;
            for (target_id, members) in &topology.target_health {
                let value = serde_json::to_vec(members).map_err(map_err!(Serialize))?;
                health
                    .insert(target_id.as_str(), value.as_slice())
                    .map_err(map_err!(Write))?;
            }

            let mut groups = txn.open_table(SCALING_GROUPS).map_err(map_err!(Table))?;
            for (name, capacity) in &topology.scaling_groups {
                let value = serde_json::to_vec(capacity).map_err(map_err!(Serialize))?;
                groups
                    .insert(name.as_str(), value.as_slice())
                    .map_err(map_err!(Write))?;
            }
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(
            load_balancers = topology.load_balancers.len(),
            scaling_groups = topology.scaling_groups.len(),
            "topology imported"
        );
        Ok(())
    }

    // ── Load balancers & listeners ─────────────────────────────────

    pub fn put_load_balancer(&self, lb: &LoadBalancer) -> StateResult<()> {
        self.put_json(LOAD_BALANCERS, &lb.name, lb)
    }

    /// Get a load balancer by name.
    pub fn get_load_balancer(&self, name: &str) -> StateResult<Option<LoadBalancer>> {
        self.get_json(LOAD_BALANCERS, name)
    }

    pub fn put_listener(&self, listener: &Listener) -> StateResult<()> {
        self.put_json(LISTENERS, &listener.id, listener)
    }

    /// List all listeners of one load balancer.
    pub fn list_listeners_for(&self, load_balancer_id: &str) -> StateResult<Vec<Listener>> {
        let all: Vec<Listener> = self.scan_json(LISTENERS)?;
        Ok(all
            .into_iter()
            .filter(|l| l.load_balancer_id == load_balancer_id)
            .collect())
    }

    // ── Rules ──────────────────────────────────────────────────────

    /// Insert or update a rule under a listener.
    pub fn put_rule(&self, listener_id: &str, rule: &Rule) -> StateResult<()> {
        let stored = StoredRule {
            listener_id: listener_id.to_string(),
            rule: rule.clone(),
        };
        self.put_json(RULES, &rule.id, &stored)
    }

    pub fn get_rule(&self, rule_id: &str) -> StateResult<Option<StoredRule>> {
        self.get_json(RULES, rule_id)
    }

    /// Rules of one listener in evaluation order, default rule last.
    pub fn list_rules_for(&self, listener_id: &str) -> StateResult<Vec<Rule>> {
        let all: Vec<StoredRule> = self.scan_json(RULES)?;
        let mut rules: Vec<Rule> = all
            .into_iter()
            .filter(|s| s.listener_id == listener_id)
            .map(|s| s.rule)
            .collect();
        rules.sort_by_key(|r| (r.is_default, r.priority.unwrap_or(u32::MAX)));
        Ok(rules)
    }

    /// Point a non-default rule at a new target.
    pub fn update_rule_target(&self, rule_id: &str, target_id: &str) -> StateResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut table = txn.open_table(RULES).map_err(map_err!(Table))?;
            let bytes = table
                .get(rule_id)
                .map_err(map_err!(Read))?
                .map(|guard| guard.value().to_vec())
                .ok_or_else(|| StateError::NotFound(format!("rule {rule_id}")))?;
            let mut stored: StoredRule =
                serde_json::from_slice(&bytes).map_err(map_err!(Deserialize))?;
            if stored.rule.is_default {
                return Err(StateError::Rejected(format!(
                    "rule {rule_id} is a default rule; modify the listener instead"
                )));
            }
            stored.rule.action.target_id = target_id.to_string();
            let value = serde_json::to_vec(&stored).map_err(map_err!(Serialize))?;
            table
                .insert(rule_id, value.as_slice())
                .map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(rule = %rule_id, target = %target_id, "rule target updated");
        Ok(())
    }

    /// Point a listener's default action at a new target.
    pub fn update_default_target(&self, listener_id: &str, target_id: &str) -> StateResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut table = txn.open_table(RULES).map_err(map_err!(Table))?;
            let mut defaults = Vec::new();
            for entry in table.iter().map_err(map_err!(Read))? {
                let (key, value) = entry.map_err(map_err!(Read))?;
                let stored: StoredRule =
                    serde_json::from_slice(value.value()).map_err(map_err!(Deserialize))?;
                if stored.listener_id == listener_id && stored.rule.is_default {
                    defaults.push((key.value().to_string(), stored));
                }
            }
            if defaults.is_empty() {
                return Err(StateError::NotFound(format!(
                    "default action of listener {listener_id}"
                )));
            }
            for (key, mut stored) in defaults {
                stored.rule.action.target_id = target_id.to_string();
                let value = serde_json::to_vec(&stored).map_err(map_err!(Serialize))?;
                table
                    .insert(key.as_str(), value.as_slice())
                    .map_err(map_err!(Write))?;
            }
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(listener = %listener_id, target = %target_id, "default target updated");
        Ok(())
    }

    // ── Target health ──────────────────────────────────────────────

    pub fn put_target_health(&self, target_id: &str, members: &[TargetHealth]) -> StateResult<()> {
        self.put_json(TARGET_HEALTH, target_id, &members)
    }

    /// Member health of a target; a target with no recorded members has none.
    pub fn get_target_health(&self, target_id: &str) -> StateResult<Vec<TargetHealth>> {
        Ok(self.get_json(TARGET_HEALTH, target_id)?.unwrap_or_default())
    }

    // ── Scaling groups ─────────────────────────────────────────────

    pub fn put_scaling_group(&self, name: &str, capacity: ScalingConfig) -> StateResult<()> {
        self.put_json(SCALING_GROUPS, name, &capacity)?;
        debug!(group = %name, %capacity, "scaling group stored");
        Ok(())
    }

    pub fn get_scaling_group(&self, name: &str) -> StateResult<Option<ScalingConfig>> {
        self.get_json(SCALING_GROUPS, name)
    }
}
