use std::collections::BTreeMap;
use std::io::Write;

use cutover_core::{LoadBalancerControl, ScalingControl};
use cutover_engine::BlueGreen;

use super::{Format, write_json};

pub fn healthcheck<L, S>(
    bg: &BlueGreen<L, S>,
    format: Format,
    out: &mut impl Write,
) -> anyhow::Result<()>
where
    L: LoadBalancerControl,
    S: ScalingControl,
{
    let report = bg.healthcheck()?;
    match format {
        Format::Json => write_json(out, &report),
        Format::Text => {
            print_side(out, "production", &report.production)?;
            print_side(out, "test", &report.test)
        }
    }
}

fn print_side(
    out: &mut impl Write,
    title: &str,
    status: &BTreeMap<String, bool>,
) -> anyhow::Result<()> {
    writeln!(out, "{title}")?;
    let width = status.keys().map(String::len).max().unwrap_or(0);
    for (name, available) in status {
        let label = if *available { "healthy" } else { "unavailable" };
        writeln!(out, "  {name:<width$}  {label}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{render, seeded};

    #[test]
    fn text_report_lists_both_sides() {
        let store = seeded();
        let bg = BlueGreen::new("web", store.clone(), store);
        let output = render(|out| healthcheck(&bg, Format::Text, out));
        assert_eq!(
            output,
            "production\n  app-blue  healthy\ntest\n  app-green  unavailable\n"
        );
    }

    #[test]
    fn json_report_round_trips() {
        let store = seeded();
        let bg = BlueGreen::new("web", store.clone(), store);
        let output = render(|out| healthcheck(&bg, Format::Json, out));
        let report: cutover_engine::HealthReport = serde_json::from_str(&output).unwrap();
        assert!(report.production["app-blue"]);
        assert!(!report.test["app-green"]);
    }
}
