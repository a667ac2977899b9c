//! cutover-core — shared vocabulary for blue-green listener cutover.
//!
//! Holds the load balancer data model, the `cutover.toml` parser, the
//! error enum every operation reports through, and the two collaborator
//! traits (`LoadBalancerControl`, `ScalingControl`) the engine drives.

pub mod config;
pub mod control;
pub mod error;
pub mod types;

pub use config::CutoverConfig;
pub use control::{ControlError, ControlResult, LoadBalancerControl, ScalingControl};
pub use error::{CutoverError, CutoverResult};
pub use types::*;
