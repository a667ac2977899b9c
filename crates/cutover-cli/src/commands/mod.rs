use std::io::Write;

use clap::ValueEnum;
use serde::Serialize;
use tracing::debug;

use cutover_core::{LoadBalancerControl, ScalingControl};
use cutover_engine::BlueGreen;

pub mod capacity;
pub mod health;
pub mod swap;

/// The four operations the binary accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Boot,
    Healthcheck,
    Swap,
    Destroy,
}

impl Mode {
    /// Unrecognized modes are a no-op, not an error.
    pub fn parse(mode: &str) -> Option<Self> {
        match mode {
            "boot" => Some(Mode::Boot),
            "healthcheck" => Some(Mode::Healthcheck),
            "swap" => Some(Mode::Swap),
            "destroy" => Some(Mode::Destroy),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Mode::Boot => "BOOT",
            Mode::Healthcheck => "HEALTHCHECK",
            Mode::Swap => "SWAP",
            Mode::Destroy => "DESTROY",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Json,
}

pub fn run<L, S>(
    blue_green: &BlueGreen<L, S>,
    mode: Mode,
    format: Format,
    dry_run: bool,
    out: &mut impl Write,
) -> anyhow::Result<()>
where
    L: LoadBalancerControl,
    S: ScalingControl,
{
    debug!(
        load_balancer = %blue_green.load_balancer(),
        mode = mode.label(),
        dry_run,
        "dispatching"
    );
    match mode {
        Mode::Boot => capacity::boot(blue_green, format, out),
        Mode::Healthcheck => health::healthcheck(blue_green, format, out),
        Mode::Swap if dry_run => swap::plan(blue_green, format, out),
        Mode::Swap => swap::swap(blue_green, format, out),
        Mode::Destroy => capacity::destroy(blue_green, format, out),
    }
}

pub(crate) fn write_json(out: &mut impl Write, value: &impl Serialize) -> anyhow::Result<()> {
    writeln!(out, "{}", serde_json::to_string_pretty(value)?)?;
    Ok(())
}

/// Target name for display; falls back to the raw identifier.
pub(crate) fn display_name(target_id: &str) -> &str {
    cutover_engine::name_of(target_id).unwrap_or(target_id)
}
