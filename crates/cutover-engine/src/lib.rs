//! Cutover engine — blue/green traffic swaps on a load balancer listener.
//!
//! Two environments sit behind one listener. Rules without a test marker
//! condition carry production traffic; rules with one carry test traffic.
//! Each target has a counterpart whose name differs only by the blue/green
//! token. A swap re-points every rule at its counterpart so the two
//! environments trade roles.
//!
//! # Components
//!
//! - **`classify`** — production/test classification and target maps
//! - **`resolve`** — target names from identifiers, blue/green pairing
//! - **`swap`** — swap planning and sequential application
//! - **`capacity`** — boot/destroy of the idle environment's scaling groups
//! - **`health`** — per-target availability
//! - **`orchestrator`** — `BlueGreen`, the facade over one load balancer
//!
//! # Swap Semantics
//!
//! ```text
//! plan:  classify rules → name maps per side → rewrite per rule (pure, fails fast)
//! apply: production-side rewrites, then test-side rewrites (one call each)
//! ```
//!
//! The control plane has no multi-rule transaction. A failed call stops
//! the swap and reports which rewrites are already in effect.

pub mod capacity;
pub mod classify;
pub mod health;
pub mod orchestrator;
pub mod resolve;
pub mod swap;

#[cfg(test)]
mod fixtures;

pub use capacity::CapacityLifecycleManager;
pub use classify::{Partition, RuleClassifier};
pub use health::{HealthProbe, HealthReport};
pub use orchestrator::BlueGreen;
pub use resolve::{TargetResolver, name_of};
pub use swap::{SwapEngine, SwapPlan, SwapReport};
