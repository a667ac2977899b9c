use std::io::Write;

use cutover_core::{CapacityChange, CutoverError, LoadBalancerControl, ScalingControl};
use cutover_engine::BlueGreen;

use super::{Format, write_json};

pub fn boot<L, S>(
    bg: &BlueGreen<L, S>,
    format: Format,
    out: &mut impl Write,
) -> anyhow::Result<()>
where
    L: LoadBalancerControl,
    S: ScalingControl,
{
    let changes = report_interrupted(bg.boot())?;
    print_changes(&changes, format, out)
}

pub fn destroy<L, S>(
    bg: &BlueGreen<L, S>,
    format: Format,
    out: &mut impl Write,
) -> anyhow::Result<()>
where
    L: LoadBalancerControl,
    S: ScalingControl,
{
    let changes = report_interrupted(bg.destroy())?;
    print_changes(&changes, format, out)
}

/// List written and pending groups on stderr before surfacing the error.
fn report_interrupted(
    result: Result<Vec<CapacityChange>, CutoverError>,
) -> anyhow::Result<Vec<CapacityChange>> {
    if let Err(CutoverError::CapacityInterrupted {
        applied, remaining, ..
    }) = &result
    {
        for change in applied {
            eprintln!("  written:     {}", describe(change));
        }
        for change in remaining {
            eprintln!("  not written: {}", describe(change));
        }
    }
    Ok(result?)
}

fn describe(change: &CapacityChange) -> String {
    let previous = change
        .previous
        .map(|p| p.to_string())
        .unwrap_or_else(|| "absent".to_string());
    format!("{}: {} → {}", change.group, previous, change.applied)
}

fn print_changes(
    changes: &[CapacityChange],
    format: Format,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match format {
        Format::Json => write_json(out, &changes),
        Format::Text => {
            for change in changes {
                writeln!(out, "✓ {}", describe(change))?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{render, seeded};
    use cutover_core::ScalingConfig;

    #[test]
    fn boot_prints_each_group() {
        let store = seeded();
        let bg = BlueGreen::new("web", store.clone(), store.clone());
        let output = render(|out| boot(&bg, Format::Text, out));
        assert_eq!(
            output,
            "✓ app-green: min=0 max=0 desired=0 → min=2 max=6 desired=4\n"
        );
        assert_eq!(
            store.get_scaling_group("app-green").unwrap(),
            Some(ScalingConfig::new(2, 6, 4))
        );
    }

    #[test]
    fn destroy_json_lists_changes() {
        let store = seeded();
        let bg = BlueGreen::new("web", store.clone(), store);
        let output = render(|out| destroy(&bg, Format::Json, out));
        let changes: Vec<CapacityChange> = serde_json::from_str(&output).unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].group, "app-green");
        assert_eq!(changes[0].applied, ScalingConfig::ZERO);
    }
}
