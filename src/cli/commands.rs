//! CLI commands
//!
//! Handlers behind the `uiverify` subcommands.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

use crate::browser::AgentBrowser;
use crate::cli::output::{render_scenario, render_summary};
use crate::core::{Config, Result};
use crate::scenario::{Fixtures, RunReport, RunSettings, ScenarioRunner};
use crate::scenarios::ScenarioKind;

/// Options of the `run` command that are not configuration
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub scenarios: Vec<ScenarioKind>,
    /// Write the JSON report here
    pub report: Option<PathBuf>,
    pub skip_contract: bool,
}

/// Run the selected scenarios one after another, each in a fresh browser
pub async fn run_scenarios(config: &Config, options: &RunOptions) -> Result<RunReport> {
    let start = Instant::now();
    let fixtures = Fixtures::from_config(&config.fixtures);
    if let Some(suffix) = fixtures.suffix() {
        info!(suffix, "fixture names are suffixed");
    }

    let mut settings = RunSettings::from_config(config);
    settings.check_contract = !options.skip_contract;

    // build everything first so a bad contract or target fails before any browser starts
    let scenarios = options
        .scenarios
        .iter()
        .map(|kind| kind.build(config, &fixtures))
        .collect::<Result<Vec<_>>>()?;

    let mut reports = Vec::with_capacity(scenarios.len());
    for scenario in &scenarios {
        let driver = AgentBrowser::from_config(&config.browser);
        let mut runner = ScenarioRunner::new(driver, settings.clone());
        let report = runner.run(scenario).await;
        println!("{}", render_scenario(&report));
        reports.push(report);
    }

    let run = RunReport::from_reports(reports, start.elapsed().as_millis() as u64);
    println!("{}", render_summary(&run));

    if let Some(path) = &options.report {
        run.write_json(path)?;
        info!(path = %path.display(), "report written");
    }

    Ok(run)
}

/// Scenario names, targets and descriptions
pub fn list(config: &Config) -> Result<String> {
    let fixtures = Fixtures::literal();
    let settings = RunSettings::from_config(config);
    let mut lines = Vec::new();
    for kind in ScenarioKind::ALL {
        let scenario = kind.build(config, &fixtures)?;
        lines.push(format!(
            "{:<16} {:<36} {} steps, <= {} s\n  {}",
            kind.name(),
            scenario.target,
            scenario.steps.len(),
            scenario.time_budget(&settings).as_secs(),
            scenario.description
        ));
    }
    Ok(lines.join("\n"))
}

/// Print a scenario's effective contract, or write it to `<dir>/<scenario>.toml`
pub fn contract(kind: ScenarioKind, config: &Config, write_to: Option<&Path>) -> Result<String> {
    let text = kind.contract(config)?.to_toml()?;
    match write_to {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            let path = dir.join(format!("{}.toml", kind.name()));
            fs::write(&path, &text)?;
            Ok(format!("Contract written to {}", path.display()))
        }
        None => Ok(text),
    }
}

/// Show the default configuration, or write it to the config file
pub fn config(init: bool) -> Result<String> {
    if !init {
        return Ok(Config::default_config_toml());
    }
    if Config::config_exists() {
        return Ok(format!(
            "Config already exists at {}",
            Config::config_file().display()
        ));
    }
    let path = Config::default().save()?;
    Ok(format!("Config written to {}", path.display()))
}
