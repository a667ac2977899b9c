use std::io::Write;

use cutover_core::{CutoverError, LoadBalancerControl, Rewrite, ScalingControl};
use cutover_engine::BlueGreen;

use super::{Format, display_name, write_json};

/// Print the rewrites a swap would issue.
pub fn plan<L, S>(bg: &BlueGreen<L, S>, format: Format, out: &mut impl Write) -> anyhow::Result<()>
where
    L: LoadBalancerControl,
    S: ScalingControl,
{
    let plan = bg.plan_swap()?;
    match format {
        Format::Json => write_json(out, &plan),
        Format::Text => {
            writeln!(out, "plan for listener {} (not applied):", plan.listener_id)?;
            for rewrite in &plan.rewrites {
                writeln!(out, "  {}", describe(rewrite))?;
            }
            Ok(())
        }
    }
}

pub fn swap<L, S>(bg: &BlueGreen<L, S>, format: Format, out: &mut impl Write) -> anyhow::Result<()>
where
    L: LoadBalancerControl,
    S: ScalingControl,
{
    let report = match bg.swap() {
        Ok(report) => report,
        Err(CutoverError::SwapInterrupted {
            applied,
            remaining,
            source,
        }) => {
            for rewrite in &applied {
                eprintln!("  applied:     {}", describe(rewrite));
            }
            for rewrite in &remaining {
                eprintln!("  not applied: {}", describe(rewrite));
            }
            return Err(CutoverError::SwapInterrupted {
                applied,
                remaining,
                source,
            }
            .into());
        }
        Err(e) => return Err(e.into()),
    };

    match format {
        Format::Json => write_json(out, &report),
        Format::Text => {
            for rewrite in &report.applied {
                writeln!(out, "✓ {}", describe(rewrite))?;
            }
            Ok(())
        }
    }
}

fn describe(rewrite: &Rewrite) -> String {
    let rule = if rewrite.is_default {
        format!("{} (default)", rewrite.rule_id)
    } else {
        rewrite.rule_id.clone()
    };
    format!(
        "{rule} [{}]: {} → {}",
        rewrite.side,
        display_name(&rewrite.from),
        display_name(&rewrite.to)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{render, seeded};

    #[test]
    fn swap_prints_each_rewrite() {
        let store = seeded();
        let bg = BlueGreen::new("web", store.clone(), store);
        let output = render(|out| swap(&bg, Format::Text, out));
        assert_eq!(
            output,
            "✓ r-default (default) [production]: app-blue → app-green\n\
             ✓ r-test [test]: app-green → app-blue\n"
        );
    }

    #[test]
    fn plan_json_is_a_swap_plan() {
        let store = seeded();
        let bg = BlueGreen::new("web", store.clone(), store);
        let output = render(|out| plan(&bg, Format::Json, out));
        let plan: cutover_engine::SwapPlan = serde_json::from_str(&output).unwrap();
        assert_eq!(plan.listener_id, "l-80");
        assert_eq!(plan.len(), 2);
    }
}
