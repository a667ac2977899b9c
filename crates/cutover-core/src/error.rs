//! Errors reported by cutover operations.

use thiserror::Error;

use crate::control::ControlError;
use crate::types::{CapacityChange, Rewrite};

/// Result type alias for cutover operations.
pub type CutoverResult<T> = Result<T, CutoverError>;

/// Every way a `boot`, `healthcheck`, `swap` or `destroy` can abort.
#[derive(Debug, Error)]
pub enum CutoverError {
    #[error("load balancer not found: {0}")]
    LoadBalancerNotFound(String),

    #[error("no {protocol}:{port} listener on load balancer {load_balancer}")]
    ListenerNotFound {
        load_balancer: String,
        protocol: String,
        port: u16,
    },

    #[error("malformed target identifier {0:?}: expected at least two '/'-separated segments")]
    MalformedIdentifier(String),

    #[error("target name {0:?} follows no blue/green naming convention")]
    UnpairedName(String),

    #[error(
        "rule {rule} forwards to {target}, but no rule on the opposite side forwards to {counterpart}"
    )]
    MissingCounterpart {
        rule: String,
        target: String,
        counterpart: String,
    },

    #[error("scaling group {0:?} does not exist (groups must be named after their target)")]
    MissingScalingGroup(String),

    #[error(
        "swap interrupted with {} rewrite(s) applied and {} remaining; listener is partially swapped",
        .applied.len(),
        .remaining.len()
    )]
    SwapInterrupted {
        /// Rewrites already in effect.
        applied: Vec<Rewrite>,
        /// Rewrites not in effect; the first entry is the one that failed.
        remaining: Vec<Rewrite>,
        #[source]
        source: ControlError,
    },

    #[error(
        "capacity update interrupted at scaling group {group:?} with {} group(s) written and {} remaining",
        .applied.len(),
        .remaining.len()
    )]
    CapacityInterrupted {
        /// The group whose write failed.
        group: String,
        /// Writes already in effect.
        applied: Vec<CapacityChange>,
        /// Writes not in effect; the first entry is the one that failed.
        remaining: Vec<CapacityChange>,
        #[source]
        source: ControlError,
    },

    #[error("failed to read scaling group {group:?}")]
    ScalingRead {
        group: String,
        source: ControlError,
    },

    #[error("failed to read health of target {target}")]
    HealthRead {
        target: String,
        source: ControlError,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("control plane: {0}")]
    Control(#[from] ControlError),
}
