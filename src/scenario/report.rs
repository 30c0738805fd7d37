//! Structured per-step results aggregated into scenario and run reports

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::{Result, VerifyError};

/// Outcome of one step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Passed,
    TimedOut,
    AssertionFailed,
    ContractBroken,
    Errored,
    Skipped,
}

impl StepStatus {
    /// Whether the step ran and did not pass
    pub fn is_failure(&self) -> bool {
        !matches!(self, StepStatus::Passed | StepStatus::Skipped)
    }

    /// Classify an error raised while executing a step
    pub fn from_error(error: &VerifyError) -> Self {
        match error {
            VerifyError::Timeout { .. } => StepStatus::TimedOut,
            VerifyError::Contract(_) => StepStatus::ContractBroken,
            _ => StepStatus::Errored,
        }
    }
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepStatus::Passed => write!(f, "passed"),
            StepStatus::TimedOut => write!(f, "timed out"),
            StepStatus::AssertionFailed => write!(f, "assertion failed"),
            StepStatus::ContractBroken => write!(f, "contract broken"),
            StepStatus::Errored => write!(f, "error"),
            StepStatus::Skipped => write!(f, "skipped"),
        }
    }
}

/// Result of one step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepReport {
    pub name: String,
    pub status: StepStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Values read from the page (input values, match counts, seeded ids)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub observations: Vec<String>,
    pub duration_ms: u64,
    /// Screenshot written by this step
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact: Option<PathBuf>,
}

impl StepReport {
    pub fn new(name: impl Into<String>, status: StepStatus) -> Self {
        Self {
            name: name.into(),
            status,
            detail: None,
            observations: Vec::new(),
            duration_ms: 0,
            artifact: None,
        }
    }

    pub fn skipped(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(name, StepStatus::Skipped).with_detail(reason)
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn observe(mut self, observation: impl Into<String>) -> Self {
        self.observations.push(observation.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Pass,
    Fail,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Pass => write!(f, "PASS"),
            Verdict::Fail => write!(f, "FAIL"),
        }
    }
}

/// Result of one scenario run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub scenario: String,
    pub target: String,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub steps: Vec<StepReport>,
    /// Screenshots captured because a step aborted the scenario
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failure_artifacts: Vec<PathBuf>,
    /// Step that aborted the scenario
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aborted_at: Option<String>,
    pub verdict: Verdict,
}

impl ScenarioReport {
    /// Assemble a report; the verdict is derived from the steps
    pub fn new(
        scenario: impl Into<String>,
        target: impl Into<String>,
        started_at: DateTime<Utc>,
        duration_ms: u64,
        steps: Vec<StepReport>,
    ) -> Self {
        let verdict = if steps.iter().any(|s| s.status.is_failure()) {
            Verdict::Fail
        } else {
            Verdict::Pass
        };
        Self {
            scenario: scenario.into(),
            target: target.into(),
            started_at,
            duration_ms,
            steps,
            failure_artifacts: Vec::new(),
            aborted_at: None,
            verdict,
        }
    }

    pub fn passed(&self) -> bool {
        self.verdict == Verdict::Pass
    }

    pub fn failures(&self) -> impl Iterator<Item = &StepReport> {
        self.steps.iter().filter(|s| s.status.is_failure())
    }

    /// Screenshots written by passing steps
    pub fn artifacts(&self) -> impl Iterator<Item = &Path> {
        self.steps.iter().filter_map(|s| s.artifact.as_deref())
    }

    pub fn step(&self, name: &str) -> Option<&StepReport> {
        self.steps.iter().rev().find(|s| s.name == name)
    }
}

/// Result of running several scenarios
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub scenarios: Vec<ScenarioReport>,
}

impl RunReport {
    pub fn from_reports(scenarios: Vec<ScenarioReport>, duration_ms: u64) -> Self {
        let passed = scenarios.iter().filter(|r| r.passed()).count();
        Self {
            total: scenarios.len(),
            passed,
            failed: scenarios.len() - passed,
            duration_ms,
            scenarios,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Write the report as pretty JSON, creating parent directories
    pub fn write_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
