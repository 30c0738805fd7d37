//! Console rendering of reports

use std::fmt::Write;

use crate::scenario::{RunReport, ScenarioReport, StepStatus};

fn marker(status: StepStatus) -> &'static str {
    match status {
        StepStatus::Passed => "✓",
        StepStatus::Skipped => "-",
        StepStatus::TimedOut => "⏱",
        StepStatus::AssertionFailed | StepStatus::ContractBroken | StepStatus::Errored => "✗",
    }
}

/// One block per scenario: header, steps, artifacts
pub fn render_scenario(report: &ScenarioReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {} ({}) {} ms",
        report.verdict, report.scenario, report.target, report.duration_ms
    );

    for step in &report.steps {
        let _ = write!(out, "  {} {}", marker(step.status), step.name);
        if step.status != StepStatus::Passed {
            let _ = write!(out, " [{}]", step.status);
        }
        if let Some(detail) = &step.detail {
            let _ = write!(out, ": {}", detail);
        }
        out.push('\n');
        for observation in &step.observations {
            let _ = writeln!(out, "      {}", observation);
        }
    }

    let artifacts: Vec<_> = report.artifacts().collect();
    if !artifacts.is_empty() {
        out.push_str("  screenshots:\n");
        for path in artifacts {
            let _ = writeln!(out, "    {}", path.display());
        }
    }
    if !report.failure_artifacts.is_empty() {
        out.push_str("  failure screenshots:\n");
        for path in &report.failure_artifacts {
            let _ = writeln!(out, "    {}", path.display());
        }
    }
    out
}

/// Totals line
pub fn render_summary(report: &RunReport) -> String {
    format!(
        "{} scenario(s): {} passed, {} failed ({} ms)",
        report.total, report.passed, report.failed, report.duration_ms
    )
}
