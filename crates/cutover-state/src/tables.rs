//! redb table definitions for the cutover state store.
//!
//! Each table uses `&str` keys and `&[u8]` values (JSON-serialized domain types).

use redb::TableDefinition;

/// Load balancers keyed by `{name}`.
pub const LOAD_BALANCERS: TableDefinition<&str, &[u8]> = TableDefinition::new("load_balancers");

/// Listeners keyed by `{listener_id}`.
pub const LISTENERS: TableDefinition<&str, &[u8]> = TableDefinition::new("listeners");

/// Rules keyed by `{rule_id}`; values carry the owning listener id.
pub const RULES: TableDefinition<&str, &[u8]> = TableDefinition::new("rules");

/// Member health lists keyed by `{target_id}`.
pub const TARGET_HEALTH: TableDefinition<&str, &[u8]> = TableDefinition::new("target_health");

/// Scaling group capacity keyed by `{group_name}`.
pub const SCALING_GROUPS: TableDefinition<&str, &[u8]> = TableDefinition::new("scaling_groups");

/// Shape shared by every table above.
pub type JsonTable = TableDefinition<'static, &'static str, &'static [u8]>;
