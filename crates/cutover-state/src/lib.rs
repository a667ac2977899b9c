//! cutover-state — a local, redb-backed control plane for cutover.
//!
//! Stores load balancers, listeners, rules, target member health and
//! scaling groups, and implements both `LoadBalancerControl` and
//! `ScalingControl` over them. It backs the `cutover` binary when no
//! remote API client is wired in, and serves as the fake control plane
//! in tests.
//!
//! # Architecture
//!
//! All records are JSON-serialized into redb's `&[u8]` value columns.
//! Rules are keyed by rule id and carry their listener id, so a listener's
//! rule set is a table scan filtered on that id. A `Topology` document
//! seeds the store in one write transaction.
//!
//! The `StateStore` is `Clone` + `Send` + `Sync` (backed by `Arc<Database>`).

pub mod control;
pub mod error;
pub mod store;
pub mod tables;
pub mod types;

pub use error::{StateError, StateResult};
pub use store::StateStore;
pub use types::*;
