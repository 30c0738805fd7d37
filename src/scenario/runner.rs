//! Scenario runner
//!
//! Executes one scenario strictly in order on a single page: optional
//! reachability probe, launch, steps, then close on every path.

use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::browser::{wait_for, PageDriver};
use crate::core::{Capture, Config, OnFailure, Result, VerifyError};
use crate::scenario::report::{ScenarioReport, StepReport, StepStatus};
use crate::scenario::step::{Action, Step};
use crate::scenario::Scenario;

/// Knobs the runner needs, resolved from [`Config`]
#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Screenshots are written below this directory
    pub output_dir: PathBuf,
    /// Timeout for waits that do not carry one
    pub default_timeout: Duration,
    pub poll_interval: Duration,
    /// Bound of one driver operation
    pub command_timeout: Duration,
    /// HTTP probe timeout; `None` disables the probe
    pub preflight: Option<Duration>,
    /// Run `VerifyContract` steps at all
    pub check_contract: bool,
    /// Abort on contract misses instead of only reporting them
    pub enforce_contract: bool,
}

impl RunSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            output_dir: config.run.output_dir.clone(),
            default_timeout: Duration::from_millis(config.run.default_timeout_ms),
            poll_interval: Duration::from_millis(config.browser.poll_interval_ms),
            command_timeout: Duration::from_millis(config.browser.command_timeout_ms),
            preflight: config
                .run
                .preflight
                .then(|| Duration::from_millis(config.run.preflight_timeout_ms)),
            check_contract: true,
            enforce_contract: config.contract.enforce,
        }
    }

    /// Upper bound for one step, including the driver calls around its wait
    pub fn step_budget(&self, step: &Step) -> Duration {
        step.action
            .timeout(self.default_timeout)
            .unwrap_or_default()
            + self.command_timeout * 2
            + self.poll_interval
    }
}

impl Default for RunSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Probe `url` over HTTP; any response status counts as reachable
pub async fn probe_target(url: &str, timeout: Duration) -> Result<u16> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    let response = client.get(url).send().await?;
    Ok(response.status().as_u16())
}

/// Runs scenarios against one page driver
pub struct ScenarioRunner<D> {
    driver: D,
    settings: RunSettings,
}

impl<D: PageDriver> ScenarioRunner<D> {
    pub fn new(driver: D, settings: RunSettings) -> Self {
        Self { driver, settings }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn into_driver(self) -> D {
        self.driver
    }

    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    /// Run one scenario to completion. Never fails: every problem ends up
    /// as a step status in the returned report.
    pub async fn run(&mut self, scenario: &Scenario) -> ScenarioReport {
        let started_at = Utc::now();
        let start = Instant::now();
        let mut steps: Vec<StepReport> = Vec::new();
        let mut failure_artifacts = Vec::new();
        let mut aborted_at: Option<String> = None;

        info!(scenario = %scenario.name, target = %scenario.target, driver = self.driver.name(), "starting scenario");
        self.clear_stale_artifacts(scenario);

        if let Some(timeout) = self.settings.preflight {
            if let Err(e) = probe_target(&scenario.target, timeout).await {
                warn!(scenario = %scenario.name, error = %e, "target unreachable");
                steps.push(
                    StepReport::new("preflight", StepStatus::Errored)
                        .with_detail(format!("{} is unreachable: {}", scenario.target, e)),
                );
                steps.extend(skip_all(&scenario.steps, "target unreachable"));
                return finish(scenario, started_at, start, steps, failure_artifacts, Some("preflight".into()));
            }
        }

        let launch_timeout = self.settings.command_timeout;
        let launched = match tokio::time::timeout(launch_timeout, self.driver.launch()).await {
            Ok(result) => result,
            Err(_) => Err(VerifyError::timeout(
                "the browser to launch",
                launch_timeout.as_millis() as u64,
            )),
        };
        if let Err(e) = launched {
            warn!(scenario = %scenario.name, error = %e, "launch failed");
            steps.push(StepReport::new("launch", StepStatus::from_error(&e)).with_detail(e.to_string()));
            steps.extend(skip_all(&scenario.steps, "browser did not launch"));
            self.teardown(scenario).await;
            return finish(scenario, started_at, start, steps, failure_artifacts, Some("launch".into()));
        }

        for step in &scenario.steps {
            if let Some(at) = &aborted_at {
                steps.push(StepReport::skipped(&step.name, format!("aborted at '{}'", at)));
                continue;
            }

            if let Some(dep) = &step.after {
                let dep_passed = steps
                    .iter()
                    .rev()
                    .find(|s| &s.name == dep)
                    .map(|s| s.status == StepStatus::Passed)
                    .unwrap_or(false);
                if !dep_passed {
                    debug!(step = %step.name, requires = %dep, "gate closed");
                    steps.push(StepReport::skipped(&step.name, format!("requires '{}'", dep)));
                    continue;
                }
            }

            let report = self.execute(scenario, step).await;
            let on_failure = self.policy(step);

            if report.status.is_failure() {
                warn!(
                    scenario = %scenario.name,
                    step = %step.name,
                    status = %report.status,
                    detail = report.detail.as_deref().unwrap_or(""),
                    "step failed"
                );
                if on_failure == OnFailure::Abort {
                    let capture = step
                        .failure_capture
                        .as_ref()
                        .or(scenario.error_capture.as_ref());
                    if let Some(path) = capture {
                        if let Some(written) = self.capture_failure(path).await {
                            failure_artifacts.push(written);
                        }
                    }
                    aborted_at = Some(step.name.clone());
                }
            } else {
                info!(
                    scenario = %scenario.name,
                    step = %step.name,
                    status = %report.status,
                    ms = report.duration_ms,
                    "step"
                );
            }

            steps.push(report);
        }

        self.teardown(scenario).await;
        finish(scenario, started_at, start, steps, failure_artifacts, aborted_at)
    }

    /// Contract checks follow the run settings, not the step's own policy
    fn policy(&self, step: &Step) -> OnFailure {
        match step.action {
            Action::VerifyContract if !self.settings.enforce_contract => OnFailure::Continue,
            _ => step.on_failure,
        }
    }

    async fn execute(&self, scenario: &Scenario, step: &Step) -> StepReport {
        let start = Instant::now();
        let budget = self.settings.step_budget(step);

        let mut report = match tokio::time::timeout(budget, self.perform(scenario, step)).await {
            Ok(Ok(report)) => report,
            Ok(Err(e)) => StepReport::new(&step.name, StepStatus::from_error(&e)).with_detail(e.to_string()),
            Err(_) => StepReport::new(&step.name, StepStatus::TimedOut)
                .with_detail(format!("step exceeded its {} ms budget", budget.as_millis())),
        };
        report.duration_ms = start.elapsed().as_millis() as u64;
        report
    }

    async fn perform(&self, scenario: &Scenario, step: &Step) -> Result<StepReport> {
        let name = step.name.as_str();
        let passed = || StepReport::new(name, StepStatus::Passed);

        match &step.action {
            Action::Navigate { url } => {
                self.driver.navigate(url).await?;
                Ok(passed().with_detail(format!("loaded {}", url)))
            }

            Action::WaitFor {
                selector,
                state,
                timeout_ms,
            } => {
                let timeout = timeout_ms
                    .map(Duration::from_millis)
                    .unwrap_or(self.settings.default_timeout);
                let observed =
                    wait_for(&self.driver, selector, *state, timeout, self.settings.poll_interval)
                        .await?;
                Ok(passed()
                    .with_detail(format!("{} is {}", selector, state))
                    .observe(format!("{} match(es)", observed.count)))
            }

            Action::Click { selector } => {
                self.driver.click(selector).await?;
                Ok(passed())
            }

            Action::ClickIfPresent { selector } => {
                let state = self.driver.query(selector).await?;
                if state.count == 0 {
                    return Ok(StepReport::new(name, StepStatus::AssertionFailed)
                        .with_detail(format!("{} not found", selector)));
                }
                self.driver.click(selector).await?;
                Ok(passed()
                    .with_detail(format!("{} found", selector))
                    .observe(format!("{} match(es)", state.count)))
            }

            Action::Fill { selector, value } => {
                self.driver.fill(selector, value).await?;
                Ok(passed().observe(format!("filled {} line(s)", value.lines().count())))
            }

            Action::Pause { ms } => {
                tokio::time::sleep(Duration::from_millis(*ms)).await;
                Ok(passed())
            }

            Action::Evaluate { script } => {
                let value = self.driver.evaluate(script).await?;
                let report = passed();
                Ok(if value.is_null() {
                    report
                } else {
                    report.observe(format!("result: {}", value))
                })
            }

            Action::Seed(plan) => {
                let value = self.driver.evaluate(&plan.script()).await?;
                let site_id = value.get("siteId").cloned().unwrap_or_default();
                if site_id.is_null() {
                    return Err(VerifyError::browser(format!(
                        "seeding returned no site id (got {})",
                        value
                    )));
                }
                Ok(passed()
                    .with_detail(format!(
                        "seeded user {}, site {}, shift {}",
                        plan.user.username, plan.site_name, plan.shift.name
                    ))
                    .observe(format!("site id: {}", site_id)))
            }

            Action::InspectInput { selector, expected } => {
                let state = self.driver.query(selector).await?;
                if !state.visible {
                    return Ok(StepReport::new(name, StepStatus::AssertionFailed)
                        .with_detail(format!("{} not found", selector)));
                }
                let value = state.value.unwrap_or_default();
                let report = match expected {
                    Some(want) if *want != value => StepReport::new(name, StepStatus::AssertionFailed)
                        .with_detail(format!("unexpected value '{}', expected '{}'", value, want)),
                    Some(_) => passed().with_detail("default value verified"),
                    None => passed().with_detail(format!("{} found", selector)),
                };
                Ok(report.observe(format!("value: {}", value)))
            }

            Action::ExpectVisible { selector } => {
                let state = self.driver.query(selector).await?;
                let report = if state.visible {
                    passed().with_detail(format!("{} visible", selector))
                } else {
                    StepReport::new(name, StepStatus::AssertionFailed)
                        .with_detail(format!("{} not visible", selector))
                };
                Ok(report.observe(format!("visible: {}", state.visible)))
            }

            Action::VerifyContract => {
                if !self.settings.check_contract {
                    return Ok(StepReport::skipped(name, "contract check disabled"));
                }
                let misses = scenario.contract.verify(&self.driver).await?;
                let checked = scenario.contract.static_entries().count();
                if misses.is_empty() {
                    return Ok(passed().with_detail(format!(
                        "{} static selector(s) present (contract v{})",
                        checked, scenario.contract.version
                    )));
                }
                let listed = misses
                    .iter()
                    .map(|m| m.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                Ok(StepReport::new(name, StepStatus::ContractBroken).with_detail(format!(
                    "{} of {} selector(s) missing from the page: {}",
                    misses.len(),
                    checked,
                    listed
                )))
            }

            Action::Screenshot { path, capture } => {
                let written = self.screenshot(path, capture).await?;
                let mut report = passed().with_detail(format!("{} captured", capture));
                report.artifact = Some(written);
                Ok(report)
            }
        }
    }

    async fn screenshot(&self, relative: &Path, capture: &Capture) -> Result<PathBuf> {
        let path = self.settings.output_dir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| VerifyError::with_context(format!("Failed to create {}", parent.display()), e))?;
        }
        self.driver.screenshot(&path, capture).await?;
        Ok(path)
    }

    async fn capture_failure(&self, relative: &Path) -> Option<PathBuf> {
        let capture = Capture::Page { full_page: false };
        let bounded = tokio::time::timeout(
            self.settings.command_timeout * 2,
            self.screenshot(relative, &capture),
        )
        .await;
        match bounded {
            Ok(Ok(path)) => {
                info!(path = %path.display(), "failure screenshot");
                Some(path)
            }
            Ok(Err(e)) => {
                warn!(error = %e, "failure screenshot not captured");
                None
            }
            Err(_) => {
                warn!("failure screenshot timed out");
                None
            }
        }
    }

    /// Screenshots left by earlier runs must not pass for this run's evidence
    fn clear_stale_artifacts(&self, scenario: &Scenario) {
        for relative in scenario.artifact_paths() {
            let path = self.settings.output_dir.join(relative);
            if path.exists() {
                if let Err(e) = fs::remove_file(&path) {
                    warn!(path = %path.display(), error = %e, "could not remove stale screenshot");
                }
            }
        }
    }

    async fn teardown(&self, scenario: &Scenario) {
        let closed = tokio::time::timeout(self.settings.command_timeout, self.driver.close()).await;
        match closed {
            Ok(Ok(())) => debug!(scenario = %scenario.name, "browser closed"),
            Ok(Err(e)) => debug!(scenario = %scenario.name, error = %e, "close failed"),
            Err(_) => warn!(scenario = %scenario.name, "close timed out"),
        }
    }
}

fn skip_all(steps: &[Step], reason: &str) -> Vec<StepReport> {
    steps
        .iter()
        .map(|s| StepReport::skipped(&s.name, reason))
        .collect()
}

fn finish(
    scenario: &Scenario,
    started_at: chrono::DateTime<Utc>,
    start: Instant,
    steps: Vec<StepReport>,
    failure_artifacts: Vec<PathBuf>,
    aborted_at: Option<String>,
) -> ScenarioReport {
    let mut report = ScenarioReport::new(
        &scenario.name,
        &scenario.target,
        started_at,
        start.elapsed().as_millis() as u64,
        steps,
    );
    report.failure_artifacts = failure_artifacts;
    report.aborted_at = aborted_at;
    info!(scenario = %scenario.name, verdict = %report.verdict, ms = report.duration_ms, "scenario finished");
    report
}
