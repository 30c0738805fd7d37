//! Built-in verification scenarios
//!
//! Each scenario is built from its selector contract (optionally overridden
//! from disk), its own target URL and the run's fixture names.

pub mod bulk_add;
pub mod export_menu;
pub mod global_settings;
pub mod role_modal;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::core::{Config, Result, WaitState};
use crate::scenario::{Fixtures, Scenario, SelectorContract, Step};

/// The scenarios this crate knows how to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScenarioKind {
    /// Bulk-add users and sites through the modal
    BulkAdd,
    /// Seed a site and open the dashboard export menu
    ExportMenu,
    /// Check the global settings defaults
    GlobalSettings,
    /// Open the Add Role modal of a site dashboard
    RoleModal,
}

impl ScenarioKind {
    pub const ALL: [ScenarioKind; 4] = [
        ScenarioKind::BulkAdd,
        ScenarioKind::ExportMenu,
        ScenarioKind::GlobalSettings,
        ScenarioKind::RoleModal,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ScenarioKind::BulkAdd => bulk_add::NAME,
            ScenarioKind::ExportMenu => export_menu::NAME,
            ScenarioKind::GlobalSettings => global_settings::NAME,
            ScenarioKind::RoleModal => role_modal::NAME,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    /// Target URL from configuration
    pub fn target<'a>(&self, config: &'a Config) -> &'a str {
        match self {
            ScenarioKind::BulkAdd => &config.targets.bulk_add,
            ScenarioKind::ExportMenu => &config.targets.export_menu,
            ScenarioKind::GlobalSettings => &config.targets.global_settings,
            ScenarioKind::RoleModal => &config.targets.role_modal,
        }
    }

    /// Built-in selector contract
    pub fn default_contract(&self) -> SelectorContract {
        match self {
            ScenarioKind::BulkAdd => bulk_add::contract(),
            ScenarioKind::ExportMenu => export_menu::contract(),
            ScenarioKind::GlobalSettings => global_settings::contract(),
            ScenarioKind::RoleModal => role_modal::contract(),
        }
    }

    /// Contract in effect under `config`
    pub fn contract(&self, config: &Config) -> Result<SelectorContract> {
        let contract = self.default_contract();
        match &config.contract.dir {
            Some(dir) => contract.with_overrides_from(dir),
            None => Ok(contract),
        }
    }

    /// Build the scenario for this run
    pub fn build(&self, config: &Config, fixtures: &Fixtures) -> Result<Scenario> {
        let contract = self.contract(config)?;
        let target = self.target(config).to_string();
        let scenario = match self {
            ScenarioKind::BulkAdd => bulk_add::build(target, contract, fixtures)?,
            ScenarioKind::ExportMenu => export_menu::build(target, contract, fixtures)?,
            ScenarioKind::GlobalSettings => global_settings::build(target, contract)?,
            ScenarioKind::RoleModal => role_modal::build(target, contract, fixtures)?,
        };
        scenario.validate()?;
        Ok(scenario)
    }
}

impl std::fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Name of the step waiting for the loading overlay
pub const LOADED: &str = "app loaded";

/// Wait for the `loading` overlay to disappear
fn loading_wait(contract: &SelectorContract, timeout_ms: Option<u64>) -> Result<Step> {
    let loading = contract.get("loading")?;
    let step = match timeout_ms {
        Some(ms) => Step::wait_within(loading, WaitState::Hidden, ms),
        None => Step::wait(loading, WaitState::Hidden),
    };
    Ok(step.named(LOADED))
}

/// Contract check placed right after load
fn contract_check() -> Step {
    Step::new(crate::scenario::Action::VerifyContract).named("selector contract")
}
