//! Scenario module - step model, runner and supporting pieces
//!
//! A scenario is a fixed, linear sequence of steps against one target URL,
//! backed by the selector contract it was built from.

pub mod contract;
pub mod fixtures;
pub mod report;
pub mod runner;
pub mod step;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use contract::{ContractEntry, ContractMiss, SelectorContract, CONTRACT_VERSION};
pub use fixtures::{bulk_payload, BulkEntry, Fixtures, SeedPlan};
pub use report::{RunReport, ScenarioReport, StepReport, StepStatus, Verdict};
pub use runner::{probe_target, RunSettings, ScenarioRunner};
pub use step::{Action, Step};

use crate::core::{Result, VerifyError};

/// One manual verification case
#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: String,
    pub description: String,
    pub target: String,
    pub steps: Vec<Step>,
    /// Screenshot taken when an aborting step has no capture of its own
    pub error_capture: Option<PathBuf>,
    pub contract: SelectorContract,
}

impl Scenario {
    pub fn new(name: impl Into<String>, target: impl Into<String>, contract: SelectorContract) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            target: target.into(),
            steps: Vec::new(),
            error_capture: None,
            contract,
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn steps(mut self, steps: impl IntoIterator<Item = Step>) -> Self {
        self.steps.extend(steps);
        self
    }

    pub fn capture_errors_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.error_capture = Some(path.into());
        self
    }

    /// Check the target URL and that every gate names an earlier step
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.target).map_err(|e| {
            VerifyError::scenario(format!(
                "'{}' has an invalid target '{}': {}",
                self.name, self.target, e
            ))
        })?;

        let mut seen = HashSet::new();
        for step in &self.steps {
            if let Some(dep) = &step.after {
                if !seen.contains(dep.as_str()) {
                    return Err(VerifyError::scenario(format!(
                        "'{}' step '{}' waits on '{}', which does not run before it",
                        self.name, step.name, dep
                    )));
                }
            }
            seen.insert(step.name.as_str());
        }
        Ok(())
    }

    /// Every screenshot path this scenario may write, relative to the output dir
    pub fn artifact_paths(&self) -> Vec<&Path> {
        let mut paths: Vec<&Path> = Vec::new();
        for step in &self.steps {
            if let Action::Screenshot { path, .. } = &step.action {
                paths.push(path);
            }
            if let Some(path) = &step.failure_capture {
                paths.push(path);
            }
        }
        if let Some(path) = &self.error_capture {
            paths.push(path);
        }
        paths
    }

    /// Upper bound on wall time for one run
    pub fn time_budget(&self, settings: &RunSettings) -> Duration {
        let steps: Duration = self.steps.iter().map(|s| settings.step_budget(s)).sum();
        // preflight, launch, one failure capture, close
        steps + settings.preflight.unwrap_or_default() + settings.command_timeout * 4
    }
}
